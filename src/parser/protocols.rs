//! Protocol parsers module
//!
//! Each share link scheme has a parser implementing [`ProtocolParser`]. The
//! [`ProtocolRegistry`] asks its parsers in registration order; a parser that
//! does not own the link's scheme answers `Ok(None)` and the next one is asked.

mod vless;

pub use vless::VlessParser;

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::parser::endpoint::ParsedEndpoint;

// ============================================================================
// Protocol Parser Trait
// ============================================================================

/// Trait for decoding individual protocol URIs
pub trait ProtocolParser: Send + Sync {
    /// Returns the protocol scheme this parser handles (e.g., "vless")
    fn scheme(&self) -> &str;

    /// Decodes a URI already known to carry this parser's scheme
    fn parse(&self, uri: &str) -> Result<ParsedEndpoint>;

    /// Checks if this parser can handle the given URI
    fn can_parse(&self, uri: &str) -> bool {
        uri.trim_start()
            .strip_prefix(self.scheme())
            .is_some_and(|rest| rest.starts_with("://"))
    }

    /// Decodes the URI if it carries this parser's scheme, `Ok(None)` otherwise
    fn try_decode(&self, uri: &str) -> Result<Option<ParsedEndpoint>> {
        if !self.can_parse(uri) {
            return Ok(None);
        }
        self.parse(uri).map(Some)
    }
}

// ============================================================================
// Protocol Registry
// ============================================================================

/// Ordered set of protocol parsers
#[derive(Default)]
pub struct ProtocolRegistry {
    parsers: Vec<Arc<dyn ProtocolParser>>,
}

impl ProtocolRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Creates a registry with all built-in parsers registered
    pub fn with_builtin_parsers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VlessParser));
        registry
    }

    /// Registers a protocol parser after the existing ones
    pub fn register(&mut self, parser: Arc<dyn ProtocolParser>) {
        self.parsers.push(parser);
    }

    /// Decodes a URI with the first parser that claims it
    pub fn decode(&self, uri: &str) -> Result<ParsedEndpoint> {
        for parser in &self.parsers {
            match parser.try_decode(uri) {
                Ok(Some(endpoint)) => {
                    debug!(
                        "Decoded {} link -> '{}' ({}:{})",
                        parser.scheme(),
                        endpoint.name,
                        endpoint.server,
                        endpoint.port
                    );
                    return Ok(endpoint);
                }
                Ok(None) => continue,
                Err(e) => {
                    debug!("Failed to decode {} link: {}", parser.scheme(), e);
                    return Err(e);
                }
            }
        }

        let scheme = extract_scheme(uri).unwrap_or("<none>");
        debug!("No parser claimed link with scheme '{}'", scheme);
        Err(Error::UnsupportedScheme {
            scheme: scheme.to_string(),
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses host:port string, handling IPv6 addresses in brackets
pub fn parse_host_port(hostport: &str) -> Result<(String, u16)> {
    // Handle IPv6 addresses: [::1]:8080
    if hostport.starts_with('[') {
        let bracket_end = hostport.find(']').ok_or_else(|| {
            Error::MalformedEndpoint("invalid IPv6 address: missing closing bracket".to_string())
        })?;

        let host = hostport[1..bracket_end].to_string();
        let port_str = hostport
            .get(bracket_end + 1..)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| {
                Error::MalformedEndpoint("missing port after IPv6 address".to_string())
            })?;

        return Ok((host, parse_port(port_str)?));
    }

    let (host, port_str) = hostport.rsplit_once(':').ok_or_else(|| {
        Error::MalformedEndpoint(format!("missing ':' between host and port in '{hostport}'"))
    })?;

    Ok((host.to_string(), parse_port(port_str)?))
}

fn parse_port(port: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| Error::MalformedEndpoint(format!("invalid port number '{port}'")))
}

/// Extracts the scheme from a URI
pub fn extract_scheme(uri: &str) -> Option<&str> {
    uri.trim_start()
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.is_empty())
}
