use casket_core::{CasketError, FingerprintAlgorithm, Result, StoreOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

/// Storage root configuration. A relative `root` is resolved against the
/// working directory of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_sync")]
    pub sync: bool,
    #[serde(default)]
    pub algorithm: FingerprintAlgorithm,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            sync: default_sync(),
            algorithm: FingerprintAlgorithm::default(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from("store")
}

fn default_sync() -> bool {
    true
}

impl StorageConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::new(self.root.clone())
            .algorithm(self.algorithm)
            .sync(self.sync)
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path))
            .add_source(::config::Environment::with_prefix("CASKET").separator("__"))
            .build()
            .map_err(|e| CasketError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| CasketError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(CasketError::Config(
                "server.bind_addr cannot be empty".to_string(),
            ));
        }

        if self.storage.root.as_os_str().is_empty() {
            return Err(CasketError::Config(
                "storage.root cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_yaml_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("casket.yaml");
        std::fs::write(
            &path,
            "server:\n  bind_addr: \"127.0.0.1:9000\"\nstorage:\n  root: /data/casket\n  sync: false\n  algorithm: sha256\n",
        )
        .unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.server.max_body_bytes, 64 * 1024 * 1024);
        assert_eq!(config.storage.root, PathBuf::from("/data/casket"));
        assert!(!config.storage.sync);
        assert_eq!(config.storage.algorithm, FingerprintAlgorithm::Sha256);
    }

    #[test]
    fn test_json_config_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.storage.root, PathBuf::from("store"));
        assert!(config.storage.sync);
        assert_eq!(config.storage.algorithm, FingerprintAlgorithm::Md5);
    }

    #[test]
    fn test_missing_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("absent.yaml");

        let err = Config::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CasketError::Config(_)));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, r#"{"storage": {"algorithm": "crc32"}}"#).unwrap();

        assert!(Config::from_file(path.to_str().unwrap()).is_err());
    }
}
