use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{Error, Result};

/// Listener ports must be strictly above this value
pub const LISTEN_PORT_FLOOR: u16 = 1024;

/// Listener ports must be strictly below this value
pub const LISTEN_PORT_CEILING: u16 = 65535;

/// Default bind address for local listeners
pub const DEFAULT_LISTEN: &str = "127.0.0.1";

// ============================================================================
// Inbound
// ============================================================================

/// Local listener accepting client connections
///
/// Construct with [`Inbound::new`], which validates the port. Protocol
/// defaults are written into `settings` when the inbound is registered with
/// a [`ClientConfigBuilder`](crate::config::ClientConfigBuilder).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Inbound {
    port: u16,

    listen: String,

    protocol: InboundProtocol,

    /// Protocol settings
    #[serde(default)]
    pub settings: InboundSettings,

    /// Tag of the inbound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Traffic sniffing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<Sniffing>,
}

impl Inbound {
    /// Create a listener, rejecting ports outside `1025..=65534`
    pub fn new(port: u16, protocol: InboundProtocol, listen: impl Into<String>) -> Result<Self> {
        if port <= LISTEN_PORT_FLOOR || port >= LISTEN_PORT_CEILING {
            return Err(Error::InvalidDescriptor(format!(
                "listen port {port} must be between {} and {}",
                LISTEN_PORT_FLOOR + 1,
                LISTEN_PORT_CEILING - 1
            )));
        }

        Ok(Self {
            port,
            listen: listen.into(),
            protocol,
            settings: InboundSettings::default(),
            tag: None,
            sniffing: None,
        })
    }

    /// SOCKS listener on the loopback address
    pub fn socks(port: u16) -> Result<Self> {
        Self::new(port, InboundProtocol::Socks, DEFAULT_LISTEN)
    }

    /// HTTP listener on the loopback address
    pub fn http(port: u16) -> Result<Self> {
        Self::new(port, InboundProtocol::Http, DEFAULT_LISTEN)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn listen(&self) -> &str {
        &self.listen
    }

    pub fn protocol(&self) -> InboundProtocol {
        self.protocol
    }

    /// Set the inbound tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Enable sniffing
    pub fn with_sniffing(mut self, sniffing: Sniffing) -> Self {
        self.sniffing = Some(sniffing);
        self
    }

    /// Write the settings every listener of this protocol must carry.
    ///
    /// Only fixed keys are written, so applying this twice has no further effect.
    pub fn apply_protocol_defaults(&mut self) {
        trace!(protocol = %self.protocol, port = self.port, "applying inbound defaults");
        match self.protocol {
            InboundProtocol::Socks => {
                self.settings.auth = Some("noauth".to_string());
                self.settings.udp = Some(true);
                self.settings.ip = Some(self.listen.clone());
            }
            InboundProtocol::Http => {
                self.settings.timeout = Some(0);
                self.settings.allow_transparent = Some(false);
            }
        }
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Inbound protocol
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InboundProtocol {
    /// SOCKS4/4a/5
    Socks,
    /// HTTP proxy
    Http,
}

impl fmt::Display for InboundProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InboundProtocol::Socks => write!(f, "socks"),
            InboundProtocol::Http => write!(f, "http"),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Inbound settings
///
/// The keys the builder manages are typed; anything else supplied by the
/// caller is kept verbatim in `extra`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InboundSettings {
    /// SOCKS authentication method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// SOCKS UDP support
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,

    /// SOCKS UDP bound address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// HTTP idle timeout in seconds, 0 disables it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    /// HTTP transparent proxying
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_transparent: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sniffing configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sniffing {
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dest_override: Vec<String>,
}

impl Sniffing {
    /// Sniff HTTP and TLS destinations
    pub fn http_tls() -> Self {
        Self {
            enabled: true,
            dest_override: vec!["http".to_string(), "tls".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_bounds() {
        assert!(Inbound::socks(1025).is_ok());
        assert!(Inbound::socks(65534).is_ok());
        assert!(matches!(
            Inbound::socks(1024),
            Err(Error::InvalidDescriptor(_))
        ));
        assert!(matches!(
            Inbound::socks(65535),
            Err(Error::InvalidDescriptor(_))
        ));
        assert!(Inbound::http(80).is_err());
        assert!(Inbound::http(0).is_err());
    }

    #[test]
    fn test_socks_defaults() {
        let mut inbound = Inbound::new(1080, InboundProtocol::Socks, "127.0.0.1").unwrap();
        inbound.apply_protocol_defaults();
        let json = serde_json::to_value(&inbound).unwrap();
        assert_eq!(json["settings"]["auth"], "noauth");
        assert_eq!(json["settings"]["udp"], true);
        assert_eq!(json["settings"]["ip"], "127.0.0.1");
        assert!(json["settings"].get("timeout").is_none());
    }

    #[test]
    fn test_http_defaults() {
        let mut inbound = Inbound::http(8080).unwrap();
        inbound.apply_protocol_defaults();
        let json = serde_json::to_value(&inbound).unwrap();
        assert_eq!(json["settings"]["timeout"], 0);
        assert_eq!(json["settings"]["allowTransparent"], false);
        assert!(json["settings"].get("auth").is_none());
    }

    #[test]
    fn test_defaults_are_idempotent() {
        let mut once = Inbound::socks(1080).unwrap();
        once.apply_protocol_defaults();
        let mut twice = once.clone();
        twice.apply_protocol_defaults();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extra_settings_preserved() {
        let mut inbound = Inbound::socks(1080).unwrap();
        inbound
            .settings
            .extra
            .insert("userLevel".to_string(), Value::from(1));
        inbound.apply_protocol_defaults();

        let json = serde_json::to_string(&inbound).unwrap();
        let parsed: Inbound = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, inbound);
        assert_eq!(parsed.settings.extra.get("userLevel"), Some(&Value::from(1)));
    }

    #[test]
    fn test_inbound_shape() {
        let inbound = Inbound::socks(1080)
            .unwrap()
            .with_sniffing(Sniffing::http_tls());
        let json = serde_json::to_value(&inbound).unwrap();
        assert_eq!(json["port"], 1080);
        assert_eq!(json["listen"], "127.0.0.1");
        assert_eq!(json["protocol"], "socks");
        assert_eq!(json["sniffing"]["destOverride"][1], "tls");
        assert!(json.get("tag").is_none());
    }
}
