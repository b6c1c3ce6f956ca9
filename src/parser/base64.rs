//! Base64 decoding utilities
//!
//! Share links are sometimes handed around wrapped in Base64, the way
//! subscription endpoints serve them. Padding and alphabet vary between
//! providers, so decoding tries each variant in turn.

use base64::engine::GeneralPurpose;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::{DecodeError, Engine};
use tracing::trace;

/// Decodes Base64 content, trying multiple variants
///
/// Whitespace anywhere in the input is ignored. The standard alphabet is
/// tried before the URL-safe one, padded before unpadded. On failure the
/// error of the last attempt is returned.
pub fn decode_base64(content: &str) -> Result<Vec<u8>, DecodeError> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    trace!("Attempting Base64 decode of {} bytes", cleaned.len());

    let padded = add_base64_padding(cleaned.trim_end_matches('='));
    let attempts: [(&str, &GeneralPurpose, &str); 4] = [
        ("standard", &STANDARD, &padded),
        ("URL-safe", &URL_SAFE, &padded),
        ("standard unpadded", &STANDARD_NO_PAD, &cleaned),
        ("URL-safe unpadded", &URL_SAFE_NO_PAD, &cleaned),
    ];

    let mut last_error = DecodeError::InvalidPadding;
    for (variant, engine, input) in attempts {
        match engine.decode(input) {
            Ok(decoded) => {
                trace!("Decoded using {} Base64", variant);
                return Ok(decoded);
            }
            Err(e) => last_error = e,
        }
    }
    Err(last_error)
}

/// Pads a Base64 string with '=' up to a multiple of 4
pub fn add_base64_padding(s: &str) -> String {
    let missing = (4 - s.len() % 4) % 4;
    let mut result = String::with_capacity(s.len() + missing);
    result.push_str(s);
    result.extend(std::iter::repeat_n('=', missing));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "vless://uuid@example.com:443?security=tls#node";

    #[test]
    fn test_decode_base64_standard() {
        let encoded = STANDARD.encode(LINK);
        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), LINK);
    }

    #[test]
    fn test_decode_base64_url_safe_without_padding() {
        let encoded = URL_SAFE_NO_PAD.encode("vless://id@h:1?x=>>>?#~");
        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "vless://id@h:1?x=>>>?#~");
    }

    #[test]
    fn test_decode_base64_without_padding() {
        // "hello world" is normally padded with one '='
        let decoded = decode_base64("aGVsbG8gd29ybGQ").unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_with_whitespace() {
        let decoded = decode_base64("  aGVs\nbG8g\td29y\r\nbGQ=  ").unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_base64_empty() {
        assert!(decode_base64("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_base64_invalid() {
        assert!(decode_base64("not valid base64!!!").is_err());
        assert!(decode_base64(LINK).is_err());
    }

    #[test]
    fn test_add_base64_padding() {
        assert_eq!(add_base64_padding(""), "");
        assert_eq!(add_base64_padding("abcd"), "abcd");
        assert_eq!(add_base64_padding("abc"), "abc=");
        assert_eq!(add_base64_padding("ab"), "ab==");
        assert_eq!(add_base64_padding("a"), "a===");
    }
}
