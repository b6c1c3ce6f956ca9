//! Decoded share link
//!
//! [`ParsedEndpoint`] is the scheme-independent result of decoding a link. The
//! transport and security parameters are tagged variants: a WebSocket path can
//! only exist on a WebSocket endpoint, REALITY keys only on a REALITY one.
//! Network kinds and security modes without typed parameters are kept by name
//! and passed through to the document.

use tracing::warn;

use crate::config::outbound::VlessOutbound;
use crate::config::stream::{
    GrpcSettings, RealitySettings, Security, StreamSettings, TcpHeader, TcpSettings, TlsSettings,
    Transport, WsSettings,
};

/// Display name used when a link carries no fragment
pub const DEFAULT_NAME: &str = "VLESS";

/// Tag given to the outbound built from an endpoint
pub const PROXY_TAG: &str = "proxy";

/// Default uTLS fingerprint
pub const DEFAULT_FINGERPRINT: &str = "chrome";

/// Proxy protocol of a decoded endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointProtocol {
    Vless,
}

/// Endpoint decoded from a share link
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedEndpoint {
    /// Display name, from the link fragment
    pub name: String,
    pub protocol: EndpointProtocol,
    pub server: String,
    pub port: u16,
    /// User identifier (UUID)
    pub uuid: String,
    pub encryption: String,
    /// Flow control, empty when unset
    pub flow: String,
    pub transport: TransportParams,
    pub security: SecurityParams,
}

/// Transport parameters, one variant per network kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportParams {
    Tcp { header_type: String },
    Ws { path: String, host: Option<String> },
    Grpc { service_name: String },
    /// A network this crate has no parameters for, kept verbatim
    Unrecognized(String),
}

/// Security parameters, one variant per security mode
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecurityParams {
    None,
    Tls(TlsParams),
    Reality(TlsParams, RealityParams),
    /// A mode this crate has no parameters for, kept verbatim
    Unrecognized(String),
}

/// Parameters shared by TLS and REALITY
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlsParams {
    pub server_name: String,
    pub fingerprint: String,
    pub alpn: Vec<String>,
}

/// REALITY-only parameters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RealityParams {
    pub public_key: String,
    pub short_id: String,
    pub spider_x: String,
}

impl TransportParams {
    pub fn network(&self) -> &str {
        match self {
            TransportParams::Tcp { .. } => "tcp",
            TransportParams::Ws { .. } => "ws",
            TransportParams::Grpc { .. } => "grpc",
            TransportParams::Unrecognized(network) => network,
        }
    }

    fn to_transport(&self) -> Transport {
        match self {
            TransportParams::Tcp { header_type } => Transport::Tcp {
                tcp_settings: Some(TcpSettings {
                    header: TcpHeader {
                        kind: header_type.clone(),
                    },
                }),
            },
            TransportParams::Ws { path, host } => Transport::Ws {
                ws_settings: WsSettings::new(path.clone(), host.as_deref()),
            },
            TransportParams::Grpc { service_name } => Transport::Grpc {
                grpc_settings: GrpcSettings {
                    service_name: service_name.clone(),
                },
            },
            TransportParams::Unrecognized(network) => {
                warn!(network = %network, "unrecognized network, writing no transport block");
                Transport::Other {
                    network: network.clone(),
                }
            }
        }
    }
}

impl SecurityParams {
    /// Mode name as it appeared in the link
    pub fn mode(&self) -> &str {
        match self {
            SecurityParams::None => "none",
            SecurityParams::Tls(_) => "tls",
            SecurityParams::Reality(..) => "reality",
            SecurityParams::Unrecognized(mode) => mode.as_str(),
        }
    }

    fn to_security(&self) -> Security {
        match self {
            SecurityParams::None => Security::None,
            SecurityParams::Tls(tls) => Security::Tls {
                tls_settings: TlsSettings {
                    server_name: tls.server_name.clone(),
                    allow_insecure: None,
                    fingerprint: Some(tls.fingerprint.clone()),
                    alpn: Some(tls.alpn.clone()),
                },
            },
            SecurityParams::Reality(tls, reality) => Security::Reality {
                reality_settings: RealitySettings {
                    server_name: tls.server_name.clone(),
                    fingerprint: tls.fingerprint.clone(),
                    public_key: reality.public_key.clone(),
                    short_id: reality.short_id.clone(),
                    spider_x: reality.spider_x.clone(),
                },
            },
            SecurityParams::Unrecognized(mode) => {
                warn!(security = %mode, "unrecognized security mode, writing no security block");
                Security::Other {
                    security: mode.clone(),
                }
            }
        }
    }
}

impl ParsedEndpoint {
    pub fn network(&self) -> &str {
        self.transport.network()
    }

    /// `streamSettings` for this endpoint: always present, carrying exactly
    /// the transport block of its network and at most one security block
    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings::new(self.transport.to_transport(), self.security.to_security())
    }

    /// Outbound connecting to this endpoint
    pub fn to_outbound(&self) -> VlessOutbound {
        VlessOutbound::new(self.server.clone(), self.port, self.uuid.clone())
            .with_tag(PROXY_TAG)
            .with_encryption(self.encryption.clone())
            .with_flow(self.flow.clone())
            .with_stream_settings(self.stream_settings())
    }
}
