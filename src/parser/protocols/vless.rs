//! VLESS protocol parser
//!
//! This module provides parsing for VLESS (vless://) URIs.
//! Format: vless://uuid@host:port?params#name

use std::collections::HashMap;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::parser::endpoint::{
    DEFAULT_FINGERPRINT, DEFAULT_NAME, EndpointProtocol, ParsedEndpoint, RealityParams,
    SecurityParams, TlsParams, TransportParams,
};

use super::{ProtocolParser, parse_host_port};

// ============================================================================
// VLESS Parser
// ============================================================================

/// Parser for VLESS (vless://) URIs
///
/// Format: vless://uuid@host:port?params#name
pub struct VlessParser;

impl ProtocolParser for VlessParser {
    fn scheme(&self) -> &str {
        "vless"
    }

    fn parse(&self, uri: &str) -> Result<ParsedEndpoint> {
        trace!("Parsing VLESS URI");
        let body = uri
            .trim()
            .strip_prefix("vless://")
            .ok_or_else(|| Error::MalformedEndpoint("not a vless:// link".to_string()))?;

        let (rest, name) = match body.split_once('#') {
            Some((rest, fragment)) => (rest, decode_fragment(fragment)),
            None => (body, DEFAULT_NAME.to_string()),
        };

        let (authority, params) = match rest.split_once('?') {
            Some((authority, query)) => (authority, parse_query(query)),
            None => (rest, HashMap::new()),
        };

        let (uuid, hostport) = authority.split_once('@').ok_or_else(|| {
            Error::MalformedEndpoint("VLESS link is missing '@' after the user id".to_string())
        })?;
        if uuid.is_empty() {
            return Err(Error::MalformedEndpoint(
                "VLESS link is missing the user id".to_string(),
            ));
        }

        // Some clients emit `host:port/?query`
        let (server, port) = parse_host_port(hostport.trim_end_matches('/'))?;
        if server.is_empty() {
            return Err(Error::MalformedEndpoint(
                "VLESS link is missing the server host".to_string(),
            ));
        }

        let transport = build_transport(&params);
        let security = build_security(&params, &server);

        Ok(ParsedEndpoint {
            name,
            protocol: EndpointProtocol::Vless,
            encryption: param_or(&params, "encryption", "none"),
            flow: param_or(&params, "flow", ""),
            server,
            port,
            uuid: uuid.to_string(),
            transport,
            security,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Percent-decodes the fragment, replacing invalid UTF-8 with U+FFFD
fn decode_fragment(fragment: &str) -> String {
    let bytes = urlencoding::decode_binary(fragment.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Query parameters as a flat map. The last occurrence of a key wins and
/// blank values count as absent.
fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

fn param_or(params: &HashMap<String, String>, key: &str, default: &str) -> String {
    params
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn build_transport(params: &HashMap<String, String>) -> TransportParams {
    let network = params
        .get("network")
        .or_else(|| params.get("type"))
        .map(String::as_str)
        .unwrap_or("tcp");

    match network {
        "tcp" => TransportParams::Tcp {
            header_type: param_or(params, "headerType", "none"),
        },
        "ws" | "websocket" => TransportParams::Ws {
            path: param_or(params, "path", "/"),
            host: params.get("host").cloned(),
        },
        "grpc" => TransportParams::Grpc {
            service_name: param_or(params, "serviceName", ""),
        },
        other => {
            warn!(network = other, "passing through unrecognized network");
            TransportParams::Unrecognized(other.to_string())
        }
    }
}

fn build_security(params: &HashMap<String, String>, server: &str) -> SecurityParams {
    let tls = || TlsParams {
        server_name: param_or(params, "sni", server),
        fingerprint: param_or(params, "fp", DEFAULT_FINGERPRINT),
        alpn: params
            .get("alpn")
            .map(|alpn| {
                alpn.split(',')
                    .map(str::trim)
                    .filter(|proto| !proto.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    };

    match params.get("security").map(String::as_str).unwrap_or("none") {
        "none" => SecurityParams::None,
        "tls" => SecurityParams::Tls(tls()),
        "reality" => SecurityParams::Reality(
            tls(),
            RealityParams {
                public_key: param_or(params, "pbk", ""),
                short_id: param_or(params, "sid", ""),
                spider_x: param_or(params, "spx", ""),
            },
        ),
        other => {
            warn!(security = other, "passing through unrecognized security mode");
            SecurityParams::Unrecognized(other.to_string())
        }
    }
}
