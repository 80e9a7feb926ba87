//! Configuration types for the mock server.

mod server;
mod storage;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use server::{ApiConfig, DispatchConfig, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.host.trim().is_empty() {
            anyhow::bail!("server.host must not be empty");
        }

        let header = &self.dispatch.correlation_header;
        if hyper::header::HeaderName::from_bytes(header.as_bytes()).is_err() {
            anyhow::bail!("dispatch.correlation_header '{header}' is not a valid header name");
        }

        let base = &self.api.base_path;
        if !base.starts_with('/') || base.len() < 2 || base.ends_with('/') {
            anyhow::bail!(
                "api.base_path '{base}' must start with '/', be non-empty and have no trailing '/'"
            );
        }

        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.path.as_os_str().is_empty()
        {
            anyhow::bail!("storage.path is required for the sqlite backend");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            dispatch: DispatchConfig::default(),
            api: ApiConfig::default(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.dispatch.correlation_header, "x-req-id");
        assert_eq!(config.api.base_path, "/mocks");
        assert_eq!(config.log_level, "info");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
server:
  port: 9100
storage:
  backend: sqlite
  path: /tmp/mocks-test.db
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/mocks-test.db"));
        assert_eq!(config.dispatch, DispatchConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.dispatch.correlation_header = "bad header".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_path = "mocks".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_path = "/mocks/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dispatch:\n  correlation_header: x-mock-id\nlog_level: debug").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.dispatch.correlation_header, "x-mock-id");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_from_file_missing() {
        assert!(Config::from_file("/nonexistent/mock-server.yaml").is_err());
    }
}
