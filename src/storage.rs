//! Configuration file storage
//!
//! The document is stored as a single pretty-printed JSON file that is
//! overwritten on every save.

use std::path::Path;

use tracing::{debug, info};

use crate::config::XrayConfig;
use crate::error::{Error, Result};

/// Write the configuration to `path`, creating parent directories as needed
pub async fn save(config: &XrayConfig, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::Storage {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let content = config
        .to_json_pretty()
        .map_err(|source| Error::StorageFormat {
            path: path.to_path_buf(),
            source,
        })?;

    tokio::fs::write(path, content)
        .await
        .map_err(|source| Error::Storage {
            path: path.to_path_buf(),
            source,
        })?;

    info!("Configuration written to: {}", path.display());
    Ok(())
}

/// Read a configuration previously written by [`save`]
pub async fn load(path: impl AsRef<Path>) -> Result<XrayConfig> {
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Storage {
            path: path.to_path_buf(),
            source,
        })?;

    let config = XrayConfig::from_json(&content).map_err(|source| Error::StorageFormat {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        inbounds = config.inbounds.len(),
        outbounds = config.outbounds.len(),
        "Loaded configuration from {}",
        path.display()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::inbound::Inbound;
    use crate::config::{DEFAULT_FLOW, assemble};
    use crate::parser::decode;
    use tempfile::TempDir;

    fn sample_config() -> XrayConfig {
        let endpoint = decode(
            "vless://uuid@example.com:443?security=reality&pbk=key&sid=ab&network=grpc&serviceName=svc#r",
        )
        .unwrap();
        assemble(&endpoint, 10808).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = sample_config();

        save(&config, &path).await.unwrap();
        let loaded = load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_manual_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manual.json");
        let config = XrayConfig::builder()
            .add_inbound(Inbound::http(8080).unwrap())
            .add_vless_outbound("example.com", 443, "uuid", DEFAULT_FLOW, "tls")
            .build()
            .unwrap();

        save(&config, &path).await.unwrap();
        assert_eq!(load(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_save_overwrites_and_is_pretty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "stale").await.unwrap();

        save(&sample_config(), &path).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("{\n"));
        assert!(content.contains("\"protocol\": \"vless\""));
    }

    #[tokio::test]
    async fn test_hand_edited_log_paths_survive_resave() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edited.json");
        let mut value = serde_json::to_value(sample_config()).unwrap();
        value["log"]["access"] = "/var/log/xray/access.log".into();
        value["log"]["error"] = "/var/log/xray/error.log".into();
        value["routing"]["domainStrategy"] = "IPOnDemand".into();
        tokio::fs::write(&path, value.to_string()).await.unwrap();

        let loaded = load(&path).await.unwrap();
        assert_eq!(
            loaded.log.access.as_deref(),
            Some("/var/log/xray/access.log")
        );
        assert_eq!(
            loaded.routing.domain_strategy,
            Some(crate::config::route::DomainStrategy::IPOnDemand)
        );

        save(&loaded, &path).await.unwrap();
        let resaved: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(resaved, value);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let err = load(&path).await.unwrap_err();
        match err {
            Error::Storage { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("Expected storage error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, Error::StorageFormat { .. }));
        assert!(err.is_storage());
    }
}
