//! Share link parsing module
//!
//! This module provides functionality for:
//! - Decoding share link URIs into a [`ParsedEndpoint`] (currently `vless://`)
//! - Unwrapping links distributed as Base64 blobs
//! - Dispatching to the parser registered for a link's scheme

pub mod base64;
pub mod endpoint;
pub mod protocols;

pub use endpoint::{
    EndpointProtocol, ParsedEndpoint, RealityParams, SecurityParams, TlsParams, TransportParams,
};
pub use protocols::{ProtocolParser, ProtocolRegistry, VlessParser};

use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Decodes a single share link with the built-in parsers
pub fn decode(uri: &str) -> Result<ParsedEndpoint> {
    ProtocolRegistry::with_builtin_parsers().decode(uri)
}

/// Decodes a share link that may be wrapped in Base64
///
/// Plain links are decoded directly. Anything else is Base64-decoded and the
/// first line that looks like a link is used.
pub fn decode_share_link(input: &str) -> Result<ParsedEndpoint> {
    let trimmed = input.trim();
    if protocols::extract_scheme(trimmed).is_some() {
        return decode(trimmed);
    }

    trace!("Input is not a plain link, trying Base64");
    let decoded = self::base64::decode_base64(trimmed).map_err(|e| {
        Error::MalformedEndpoint(format!("input is neither a share link nor Base64: {e}"))
    })?;
    let text = String::from_utf8(decoded).map_err(|_| {
        Error::MalformedEndpoint("Base64 content is not valid UTF-8".to_string())
    })?;

    let link = text
        .lines()
        .map(str::trim)
        .find(|line| line.contains("://"))
        .ok_or_else(|| {
            Error::MalformedEndpoint("Base64 content contains no share link".to_string())
        })?;
    debug!("Unwrapped share link from Base64 content");
    decode(link)
}
