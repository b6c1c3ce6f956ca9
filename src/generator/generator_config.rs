use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FLOW;
use crate::config::inbound::{DEFAULT_LISTEN, Inbound, InboundProtocol};
use crate::config::log::LogLevel;

use super::helpers::{expand_tilde, fetch_text, is_remote};

// ============================================================================
// Generator Config Types
// ============================================================================

/// Generator configuration parsed from TOML file
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Output file path, default "config.json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Xray log level, default "warning"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Local listeners (required - at least one)
    #[serde(default)]
    pub inbounds: Vec<InboundEntry>,

    /// Remote servers (required - at least one)
    #[serde(default)]
    pub outbounds: Vec<OutboundEntry>,
}

/// A `[[inbounds]]` table
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InboundEntry {
    pub protocol: InboundProtocol,

    pub port: u16,

    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A `[[outbounds]]` table: either a share link or explicit server fields
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum OutboundEntry {
    Link {
        link: String,
    },
    Server {
        address: String,
        port: u16,
        uuid: String,
        #[serde(default = "default_flow")]
        flow: String,
        #[serde(default = "default_security")]
        security: String,
    },
}

// ============================================================================
// Generator Config Implementation
// ============================================================================

impl GeneratorConfig {
    /// Parse generator config from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GeneratorConfig =
            toml::from_str(content).context("Failed to parse generator config TOML")?;

        if config.inbounds.is_empty() {
            anyhow::bail!("At least one inbound is required");
        }
        if config.outbounds.is_empty() {
            anyhow::bail!("At least one outbound is required");
        }

        config
            .get_log_level()
            .with_context(|| format!("Invalid log_level: {}", config.log_level))?;

        for entry in &config.inbounds {
            entry.to_inbound()?;
        }

        Ok(config)
    }

    /// Get the parsed log level
    pub fn get_log_level(&self) -> crate::Result<LogLevel> {
        self.log_level.parse()
    }

    /// Build the validated inbound descriptors
    pub fn get_inbounds(&self) -> Result<Vec<Inbound>> {
        self.inbounds.iter().map(InboundEntry::to_inbound).collect()
    }

    /// Load generator config from file path
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read generator config from {:?}", path))?;
        Self::from_toml(&content)
    }

    /// Load generator config from file path or URL
    pub async fn load(path_or_url: &str) -> Result<Self> {
        if is_remote(path_or_url) {
            Self::from_url(path_or_url).await
        } else {
            let expanded = expand_tilde(path_or_url);
            Self::from_file(Path::new(&expanded)).await
        }
    }

    /// Load generator config from URL
    pub async fn from_url(url: &str) -> Result<Self> {
        let content = fetch_text(url).await?;
        Self::from_toml(&content)
    }
}

impl InboundEntry {
    /// Convert to a validated inbound descriptor
    pub fn to_inbound(&self) -> Result<Inbound> {
        let inbound = Inbound::new(self.port, self.protocol, self.listen.as_str())
            .with_context(|| format!("Invalid {} inbound on port {}", self.protocol, self.port))?;
        Ok(match &self.tag {
            Some(tag) => inbound.with_tag(tag),
            None => inbound,
        })
    }
}

fn default_output() -> String {
    "config.json".to_string()
}

fn default_log_level() -> String {
    LogLevel::default().to_string()
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_flow() -> String {
    DEFAULT_FLOW.to_string()
}

fn default_security() -> String {
    "none".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_GENERATOR_TOML: &str = r#"
    output = "./out/config.json"
    log_level = "info"

    [[inbounds]]
    protocol = "socks"
    port = 10808

    [[inbounds]]
    protocol = "http"
    port = 10809
    listen = "0.0.0.0"
    tag = "http-in"

    [[outbounds]]
    link = "vless://uuid@example.com:443?security=tls#node"

    [[outbounds]]
    address = "backup.example.com"
    port = 8443
    uuid = "uuid-2"
    security = "tls"
    "#;

    const MINIMAL_GENERATOR_TOML: &str = r#"
[[inbounds]]
protocol = "socks"
port = 1080

[[outbounds]]
address = "example.com"
port = 443
uuid = "uuid"
"#;

    #[test]
    fn test_parse_full_generator_config() {
        let config = GeneratorConfig::from_toml(FULL_GENERATOR_TOML).unwrap();

        assert_eq!(config.output, "./out/config.json");
        assert_eq!(config.get_log_level().unwrap(), LogLevel::Info);
        assert_eq!(config.inbounds.len(), 2);
        assert_eq!(config.inbounds[0].listen, DEFAULT_LISTEN);
        assert_eq!(config.inbounds[1].protocol, InboundProtocol::Http);
        assert_eq!(config.inbounds[1].tag.as_deref(), Some("http-in"));
        assert!(matches!(config.outbounds[0], OutboundEntry::Link { .. }));
        assert_eq!(
            config.outbounds[1],
            OutboundEntry::Server {
                address: "backup.example.com".to_string(),
                port: 8443,
                uuid: "uuid-2".to_string(),
                flow: DEFAULT_FLOW.to_string(),
                security: "tls".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_minimal_generator_config() {
        let config = GeneratorConfig::from_toml(MINIMAL_GENERATOR_TOML).unwrap();

        assert_eq!(config.output, "config.json");
        assert_eq!(config.log_level, "warning");
        let inbounds = config.get_inbounds().unwrap();
        assert_eq!(inbounds[0].port(), 1080);
        assert_eq!(inbounds[0].listen(), "127.0.0.1");
        match &config.outbounds[0] {
            OutboundEntry::Server { flow, security, .. } => {
                assert_eq!(flow, DEFAULT_FLOW);
                assert_eq!(security, "none");
            }
            other => panic!("Expected explicit server entry, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_inbounds_fails() {
        let toml = r#"
[[outbounds]]
link = "vless://uuid@example.com:443"
"#;
        let err = GeneratorConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("inbound"));
    }

    #[test]
    fn test_missing_outbounds_fails() {
        let toml = r#"
[[inbounds]]
protocol = "socks"
port = 1080
"#;
        let err = GeneratorConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("outbound"));
    }

    #[test]
    fn test_invalid_log_level_fails() {
        let toml = format!("log_level = \"loud\"\n{MINIMAL_GENERATOR_TOML}");
        let err = GeneratorConfig::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("Invalid log_level"));
    }

    #[test]
    fn test_privileged_inbound_port_fails() {
        let toml = MINIMAL_GENERATOR_TOML.replace("port = 1080", "port = 80");
        let err = GeneratorConfig::from_toml(&toml).unwrap_err();
        assert!(format!("{err:#}").contains("invalid descriptor"));
    }

    #[test]
    fn test_unknown_inbound_protocol_fails() {
        let toml = MINIMAL_GENERATOR_TOML.replace("\"socks\"", "\"dokodemo\"");
        assert!(GeneratorConfig::from_toml(&toml).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        tokio::fs::write(file.path(), MINIMAL_GENERATOR_TOML)
            .await
            .unwrap();

        let config = GeneratorConfig::load(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(config.inbounds.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let err = GeneratorConfig::load("/nonexistent/raylink/generator.toml")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read generator config"));
    }
}
