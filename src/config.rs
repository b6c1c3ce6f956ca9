use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::inbound::{DEFAULT_LISTEN, Inbound, InboundProtocol, Sniffing};
use crate::config::log::{Log, LogLevel};
use crate::config::outbound::{
    BLOCK_TAG, BlackholeOutbound, DIRECT_TAG, FreedomOutbound, Outbound, VlessOutbound,
};
use crate::config::route::{DomainStrategy, Routing};
use crate::config::stream::{StreamSettings, TlsSettings};
use crate::error::{Error, Result};
use crate::parser::ParsedEndpoint;

pub mod inbound;
pub mod log;
pub mod outbound;
pub mod route;
pub mod stream;
pub mod validation;

/// Flow used by [`ClientConfigBuilder::add_vless_outbound`] callers that have no preference
pub const DEFAULT_FLOW: &str = "xtls-rprx-vision";

/// Main Xray client configuration structure
///
/// This is the document handed to the proxy engine. It is a plain value:
/// every assembly produces a fresh one.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct XrayConfig {
    /// Log configuration
    #[serde(default)]
    pub log: Log,

    /// Inbound configurations
    #[serde(default)]
    pub inbounds: Vec<Inbound>,

    /// Outbound configurations
    #[serde(default)]
    pub outbounds: Vec<Outbound>,

    /// Routing configuration
    #[serde(default)]
    pub routing: Routing,
}

impl XrayConfig {
    /// Create a configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Serialize the configuration to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize the configuration to a pretty-printed JSON string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Endpoint Assembly
// ============================================================================

/// Assemble the client document for a decoded share link
///
/// The document has one SOCKS inbound on `127.0.0.1:<inbound_port>` with
/// HTTP/TLS sniffing, the endpoint's VLESS outbound followed by `direct` and
/// `block` helpers, log level `warning` and the private-IP routing rule.
pub fn assemble(endpoint: &ParsedEndpoint, inbound_port: u16) -> Result<XrayConfig> {
    let mut inbound = Inbound::new(inbound_port, InboundProtocol::Socks, DEFAULT_LISTEN)?
        .with_sniffing(Sniffing::http_tls());
    inbound.apply_protocol_defaults();

    debug!(
        name = %endpoint.name,
        network = endpoint.network(),
        security = endpoint.security.mode(),
        inbound_port,
        "assembling configuration from endpoint"
    );

    Ok(XrayConfig {
        log: Log::new(LogLevel::Warning),
        inbounds: vec![inbound],
        outbounds: vec![
            Outbound::Vless(endpoint.to_outbound()),
            Outbound::Freedom(FreedomOutbound::new(DIRECT_TAG)),
            Outbound::Blackhole(BlackholeOutbound::new(BLOCK_TAG)),
        ],
        routing: Routing::new(),
    })
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for hand-assembled client configurations
///
/// Inbounds receive their protocol defaults when they are added. `build`
/// refuses to produce a document without at least one inbound and one
/// outbound. The builder is an owned value; callers sharing one across
/// threads must synchronize access themselves.
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
    inbounds: Vec<Inbound>,
    outbounds: Vec<Outbound>,
    log_level: LogLevel,
}

impl ClientConfigBuilder {
    /// Create a new builder with log level `warning`
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set the log level by name
    pub fn set_log_level(self, level: &str) -> Result<Self> {
        let level = level.parse::<LogLevel>()?;
        Ok(self.log_level(level))
    }

    /// Add an inbound, filling in its protocol defaults
    pub fn add_inbound(mut self, mut inbound: Inbound) -> Self {
        inbound.apply_protocol_defaults();
        debug!(
            protocol = %inbound.protocol(),
            listen = inbound.listen(),
            port = inbound.port(),
            "registered inbound"
        );
        self.inbounds.push(inbound);
        self
    }

    /// Add several inbounds
    pub fn add_inbounds(self, inbounds: impl IntoIterator<Item = Inbound>) -> Self {
        inbounds
            .into_iter()
            .fold(self, |builder, inbound| builder.add_inbound(inbound))
    }

    /// Add an outbound as is
    pub fn add_outbound(mut self, outbound: Outbound) -> Self {
        debug!(protocol = outbound.protocol(), "registered outbound");
        self.outbounds.push(outbound);
        self
    }

    /// Add a VLESS outbound
    ///
    /// Stream settings are only attached for `security == "tls"`, with the
    /// server address doubling as the TLS server name. Any other mode leaves
    /// the outbound on plain TCP.
    pub fn add_vless_outbound(
        self,
        address: &str,
        port: u16,
        uuid: &str,
        flow: &str,
        security: &str,
    ) -> Self {
        let mut outbound = VlessOutbound::new(address, port, uuid).with_flow(flow);

        if security == "tls" {
            outbound = outbound.with_stream_settings(StreamSettings::tcp_tls(TlsSettings {
                server_name: address.to_string(),
                allow_insecure: Some(false),
                ..Default::default()
            }));
        } else if security != "none" {
            debug!(security, "security mode has no manual stream settings, using plain tcp");
        }

        self.add_outbound(Outbound::Vless(outbound))
    }

    /// Registered inbounds
    pub fn inbounds(&self) -> &[Inbound] {
        &self.inbounds
    }

    /// Registered outbounds
    pub fn outbounds(&self) -> &[Outbound] {
        &self.outbounds
    }

    /// Check that the builder holds enough to assemble a document
    pub fn validate(&self) -> Result<()> {
        if self.inbounds.is_empty() {
            return Err(Error::IncompleteConfiguration(
                "no inbound configured".to_string(),
            ));
        }
        if self.outbounds.is_empty() {
            return Err(Error::IncompleteConfiguration(
                "no outbound configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the configuration
    pub fn build(self) -> Result<XrayConfig> {
        self.validate()?;

        debug!(
            inbounds = self.inbounds.len(),
            outbounds = self.outbounds.len(),
            level = %self.log_level,
            "assembling configuration"
        );

        Ok(XrayConfig {
            log: Log::new(self.log_level),
            inbounds: self.inbounds,
            outbounds: self.outbounds,
            routing: Routing::new().with_domain_strategy(DomainStrategy::IPIfNonMatch),
        })
    }
}
