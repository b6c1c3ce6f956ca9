//! Generator utility functions
//!
//! Path expansion and HTTP fetching for generator files that live in the
//! home directory or behind a URL.

use anyhow::{Context, Result};
use tracing::debug;

use crate::get_version;

// ============================================================================
// Path Utilities
// ============================================================================

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &str) -> String {
    if (path.starts_with("~/") || path == "~")
        && let Some(home) = dirs_home()
    {
        return path.replacen('~', &home, 1);
    }
    path.to_string()
}

/// Get home directory path
pub fn dirs_home() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok()
    }
}

/// Whether the location should be fetched over HTTP instead of read from disk
pub fn is_remote(path_or_url: &str) -> bool {
    path_or_url.starts_with("http://") || path_or_url.starts_with("https://")
}

// ============================================================================
// HTTP Utilities
// ============================================================================

/// Fetch text content from a URL
pub async fn fetch_text(url: &str) -> Result<String> {
    debug!("Fetching URL: {}", url);

    let client = reqwest::Client::builder()
        .user_agent(format!("raylink/{}", get_version()))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch URL: {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP request failed with status {}: {}", status, url);
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from: {}", url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/etc/raylink.toml"), "/etc/raylink.toml");
        assert_eq!(expand_tilde("./out/config.json"), "./out/config.json");
        assert_eq!(expand_tilde("~user/config.json"), "~user/config.json");
    }

    #[test]
    fn test_expand_tilde_home() {
        if let Some(home) = dirs_home() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(
                expand_tilde("~/raylink/config.json"),
                format!("{home}/raylink/config.json")
            );
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/raylink.toml"));
        assert!(is_remote("http://127.0.0.1:8080/gen.toml"));
        assert!(!is_remote("./raylink.toml"));
        assert!(!is_remote("~/https.toml"));
    }
}
