//! Configuration generator module
//!
//! This module orchestrates the generation of Xray client configuration
//! files, either from a single share link or from a TOML generator file
//! describing inbounds and outbounds.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::outbound::Outbound;
use crate::config::{ClientConfigBuilder, XrayConfig, assemble};
use crate::parser::decode_share_link;
use crate::storage;

// Sub-modules
pub mod generator_config;
pub mod helpers;

// Re-exports
pub use generator_config::{GeneratorConfig, InboundEntry, OutboundEntry};
pub use helpers::{expand_tilde, fetch_text};

// ============================================================================
// Generator
// ============================================================================

/// Generator that drives the manual builder from a [`GeneratorConfig`]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a new generator with the given config
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Load generator from path or URL
    pub async fn load(path_or_url: &str) -> Result<Self> {
        let config = GeneratorConfig::load(path_or_url).await?;
        Ok(Self::new(config))
    }

    /// Run the generation process
    pub fn generate(&self) -> Result<XrayConfig> {
        info!("Starting config generation");

        let mut builder = ClientConfigBuilder::new().log_level(self.config.get_log_level()?);
        builder = builder.add_inbounds(self.config.get_inbounds()?);

        for (index, entry) in self.config.outbounds.iter().enumerate() {
            builder = match entry {
                OutboundEntry::Link { link } => {
                    let endpoint = decode_share_link(link)
                        .with_context(|| format!("Failed to decode outbound #{}", index + 1))?;
                    info!(
                        "Outbound #{}: '{}' ({}:{})",
                        index + 1,
                        endpoint.name,
                        endpoint.server,
                        endpoint.port
                    );
                    builder.add_outbound(Outbound::Vless(endpoint.to_outbound()))
                }
                OutboundEntry::Server {
                    address,
                    port,
                    uuid,
                    flow,
                    security,
                } => {
                    info!("Outbound #{}: {}:{}", index + 1, address, port);
                    builder.add_vless_outbound(address, *port, uuid, flow, security)
                }
            };
        }

        let config = builder.build().context("Failed to assemble configuration")?;
        info!(
            "Final config has {} inbound(s) and {} outbound(s)",
            config.inbounds.len(),
            config.outbounds.len()
        );
        Ok(config)
    }

    /// Generate and write to output file
    pub async fn generate_to_file(&self, output_override: Option<&str>) -> Result<PathBuf> {
        let config = self.generate()?;
        let output = output_override.unwrap_or(&self.config.output);
        write_config(&config, output).await
    }
}

// ============================================================================
// Share Link Generation
// ============================================================================

/// Build the configuration for a single (optionally Base64-wrapped) share link
pub fn generate_from_link(link: &str, inbound_port: u16) -> Result<XrayConfig> {
    let endpoint = decode_share_link(link).context("Failed to decode share link")?;
    info!(
        "Decoded '{}' ({}:{}, {} over {})",
        endpoint.name,
        endpoint.server,
        endpoint.port,
        endpoint.security.mode(),
        endpoint.network()
    );
    assemble(&endpoint, inbound_port).context("Failed to assemble configuration")
}

/// Validate the configuration, log any findings, and write it to `output`
pub async fn write_config(config: &XrayConfig, output: &str) -> Result<PathBuf> {
    let validation_result = config.validate();
    if validation_result.has_errors() {
        warn!(
            "Configuration has {} validation error(s)",
            validation_result.error_count()
        );
        validation_result.log_errors();
    } else {
        debug!("Configuration passed validation");
    }

    let path = PathBuf::from(expand_tilde(output));
    storage::save(config, &path)
        .await
        .with_context(|| format!("Failed to write config to {:?}", path))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::log::LogLevel;
    use serde_json::json;
    use tempfile::TempDir;

    const GENERATOR_TOML: &str = r#"
log_level = "error"

[[inbounds]]
protocol = "socks"
port = 10808

[[inbounds]]
protocol = "http"
port = 10809

[[outbounds]]
link = "vless://uuid-1@example.com:443?security=reality&pbk=key&flow=xtls-rprx-vision#first"

[[outbounds]]
address = "backup.example.com"
port = 443
uuid = "uuid-2"
security = "tls"
"#;

    #[test]
    fn test_generate_manual_path() {
        let generator = Generator::new(GeneratorConfig::from_toml(GENERATOR_TOML).unwrap());
        let config = generator.generate().unwrap();

        assert_eq!(config.log.loglevel, LogLevel::Error);
        assert_eq!(config.inbounds.len(), 2);
        assert_eq!(config.inbounds[1].settings.allow_transparent, Some(false));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["outbounds"][0]["tag"], "proxy");
        assert_eq!(
            value["outbounds"][0]["streamSettings"]["security"],
            "reality"
        );
        assert_eq!(
            value["outbounds"][1]["streamSettings"],
            json!({
                "network": "tcp",
                "security": "tls",
                "tlsSettings": {"serverName": "backup.example.com", "allowInsecure": false}
            })
        );
        assert_eq!(value["routing"]["domainStrategy"], "IPIfNonMatch");
    }

    #[test]
    fn test_generate_bad_link_fails() {
        let toml = GENERATOR_TOML.replace("vless://uuid-1@", "vless://");
        let generator = Generator::new(GeneratorConfig::from_toml(&toml).unwrap());
        let err = generator.generate().unwrap_err();
        assert!(err.to_string().contains("outbound #1"));
    }

    #[test]
    fn test_generate_from_link() {
        let config = generate_from_link(
            "vless://uuid@example.com:443?security=tls&sni=cdn.example.com#MyServer",
            1080,
        )
        .unwrap();
        assert_eq!(config.inbounds[0].port(), 1080);
        assert_eq!(config.outbounds.len(), 3);
        assert!(config.routing.domain_strategy.is_none());
    }

    #[test]
    fn test_generate_from_link_bad_port() {
        let err = generate_from_link("vless://uuid@example.com:443", 80).unwrap_err();
        assert!(format!("{err:#}").contains("invalid descriptor"));
    }

    #[tokio::test]
    async fn test_generate_to_file_with_override() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out").join("config.json");
        let generator = Generator::new(GeneratorConfig::from_toml(GENERATOR_TOML).unwrap());

        let written = generator
            .generate_to_file(output.to_str())
            .await
            .unwrap();
        assert_eq!(written, output);

        let loaded = storage::load(&output).await.unwrap();
        assert_eq!(loaded, generator.generate().unwrap());
    }
}
