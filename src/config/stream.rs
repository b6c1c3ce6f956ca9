//! Stream settings for outbounds
//!
//! Xray keeps the transport and the security layer side by side in one
//! `streamSettings` object: a `network` key selects which `*Settings` block is
//! read and a `security` key selects the TLS or REALITY block. Both are
//! modelled as tagged enums flattened into [`StreamSettings`], so a block for
//! a transport or security mode that is not selected cannot be expressed.
//! Modes without a typed block are carried by name in an untagged `Other`
//! variant and written without any `*Settings` block.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Outbound `streamSettings`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StreamSettings {
    #[serde(flatten)]
    pub transport: Transport,

    #[serde(flatten)]
    pub security: Security,
}

impl StreamSettings {
    pub fn new(transport: Transport, security: Security) -> Self {
        Self {
            transport,
            security,
        }
    }

    /// Plain TCP without a `tcpSettings` block, wrapped in TLS
    pub fn tcp_tls(tls: TlsSettings) -> Self {
        Self::new(
            Transport::Tcp { tcp_settings: None },
            Security::Tls { tls_settings: tls },
        )
    }

    /// Name of the selected network, as written in the `network` key
    pub fn network(&self) -> &str {
        self.transport.network()
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Transport layer, keyed by `network`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "network", rename_all = "lowercase")]
pub enum Transport {
    /// Raw TCP
    Tcp {
        #[serde(
            rename = "tcpSettings",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        tcp_settings: Option<TcpSettings>,
    },
    /// WebSocket
    Ws {
        #[serde(rename = "wsSettings")]
        ws_settings: WsSettings,
    },
    /// gRPC
    Grpc {
        #[serde(rename = "grpcSettings")]
        grpc_settings: GrpcSettings,
    },
    /// Any other network, written by name only
    #[serde(untagged)]
    Other { network: String },
}

impl Transport {
    pub fn network(&self) -> &str {
        match self {
            Transport::Tcp { .. } => "tcp",
            Transport::Ws { .. } => "ws",
            Transport::Grpc { .. } => "grpc",
            Transport::Other { network } => network,
        }
    }
}

/// TCP transport settings
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TcpSettings {
    pub header: TcpHeader,
}

/// TCP header obfuscation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TcpHeader {
    /// Header type, `none` or `http`
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for TcpHeader {
    fn default() -> Self {
        Self {
            kind: "none".to_string(),
        }
    }
}

/// WebSocket transport settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WsSettings {
    pub path: String,

    /// Extra request headers, only written when a `Host` override exists
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

impl WsSettings {
    pub fn new(path: impl Into<String>, host: Option<&str>) -> Self {
        let mut headers = HashMap::new();
        if let Some(host) = host
            && !host.is_empty()
        {
            headers.insert("Host".to_string(), host.to_string());
        }
        Self {
            path: path.into(),
            headers,
        }
    }
}

/// gRPC transport settings
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrpcSettings {
    #[serde(default)]
    pub service_name: String,
}

// ============================================================================
// Security
// ============================================================================

/// Security layer, keyed by `security`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "security", rename_all = "lowercase")]
pub enum Security {
    /// No transport security
    None,
    /// TLS
    Tls {
        #[serde(rename = "tlsSettings")]
        tls_settings: TlsSettings,
    },
    /// REALITY
    Reality {
        #[serde(rename = "realitySettings")]
        reality_settings: RealitySettings,
    },
    /// Any other mode, written by name only
    #[serde(untagged)]
    Other { security: String },
}

impl Security {
    /// Name of the selected mode, as written in the `security` key
    pub fn mode(&self) -> &str {
        match self {
            Security::None => "none",
            Security::Tls { .. } => "tls",
            Security::Reality { .. } => "reality",
            Security::Other { security } => security,
        }
    }
}

/// TLS settings
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TlsSettings {
    pub server_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_insecure: Option<bool>,

    /// uTLS client fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
}

/// REALITY settings
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RealitySettings {
    pub server_name: String,

    pub fingerprint: String,

    #[serde(default)]
    pub public_key: String,

    #[serde(default)]
    pub short_id: String,

    #[serde(default)]
    pub spider_x: String,
}
