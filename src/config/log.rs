use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Log section of an Xray configuration
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Log {
    /// Log level. One of: `debug` `info` `warning` `error` `critical`.
    #[serde(default)]
    pub loglevel: LogLevel,

    /// Access log file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    /// Error log file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Log {
    /// Create a log section with only the level set
    pub fn new(loglevel: LogLevel) -> Self {
        Self {
            loglevel,
            ..Default::default()
        }
    }
}

/// Log severity written into the configuration
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            other => Err(Error::InvalidLogLevel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_default_is_warning() {
        let log = Log::default();
        let json = serde_json::to_string(&log).unwrap();
        assert_eq!(json, r#"{"loglevel":"warning"}"#);
    }

    #[test]
    fn test_log_level_serialization() {
        let json = serde_json::to_string(&LogLevel::Info).unwrap();
        assert_eq!(json, r#""info""#);
    }

    #[test]
    fn test_log_with_paths() {
        let log = Log {
            loglevel: LogLevel::Debug,
            access: Some("/var/log/xray/access.log".to_string()),
            error: None,
        };
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains(r#""loglevel":"debug""#));
        assert!(json.contains(r#""access":"/var/log/xray/access.log""#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("critical".parse::<LogLevel>().unwrap(), LogLevel::Critical);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        let err = "warn".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, Error::InvalidLogLevel(ref s) if s == "warn"));
    }

    #[test]
    fn test_log_deserialization_defaults_level() {
        let log: Log = serde_json::from_str("{}").unwrap();
        assert_eq!(log.loglevel, LogLevel::Warning);
    }
}
