//! # Service Configuration
//!
//! Settings for `mentionrank serve`, read from an optional TOML file.
//! Command-line flags override file values. Security knobs (API key, rate
//! limit, CORS) stay in environment variables, see [`crate::api`].
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! backend = "redb"
//! data_dir = "/var/lib/mentionrank"
//! recompute_interval_secs = 30
//! namespace = "mentionrank"
//! key = "current"
//! ```

use mentionrank_core::primitives::{DEFAULT_KEY, DEFAULT_NAMESPACE};
use mentionrank_core::{RankError, StorageSlot};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Persistence backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// One file per slot under the data directory.
    File,
    /// A redb database under the data directory.
    #[default]
    Redb,
}

impl Backend {
    /// Parse a backend name as given on the command line.
    pub fn parse(name: &str) -> Result<Self, RankError> {
        match name {
            "file" => Ok(Backend::File),
            "redb" => Ok(Backend::Redb),
            other => Err(RankError::DeserializationError(format!(
                "Unknown backend: {}. Use: file, redb",
                other
            ))),
        }
    }

    /// Backend name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Backend::File => "file",
            Backend::Redb => "redb",
        }
    }
}

/// Configuration for the long-running service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Host to bind the HTTP API to.
    pub host: String,
    /// Port to bind the HTTP API to.
    pub port: u16,
    /// Persistence backend.
    pub backend: Backend,
    /// Directory holding persisted state.
    pub data_dir: PathBuf,
    /// Seconds between recomputation passes. Zero disables the loop.
    pub recompute_interval_secs: u64,
    /// Gateway namespace of the persisted blob.
    pub namespace: String,
    /// Gateway key of the persisted blob.
    pub key: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backend: Backend::default(),
            data_dir: PathBuf::from("mentionrank-data"),
            recompute_interval_secs: 30,
            namespace: DEFAULT_NAMESPACE.to_string(),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml(source: &str) -> Result<Self, RankError> {
        toml::from_str(source)
            .map_err(|e| RankError::DeserializationError(format!("Invalid config: {}", e)))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RankError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            RankError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(RankError::IoError(format!(
                "Config file {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let source = std::fs::read_to_string(path).map_err(|e| {
            RankError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&source)
    }

    /// Where the persisted blob lives inside the gateway.
    #[must_use]
    pub fn slot(&self) -> StorageSlot {
        StorageSlot::new(&self.namespace, &self.key)
    }

    /// Interval of the periodic recomputation, if enabled.
    #[must_use]
    pub fn recompute_interval(&self) -> Option<Duration> {
        (self.recompute_interval_secs > 0).then(|| Duration::from_secs(self.recompute_interval_secs))
    }

    /// `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = ServiceConfig::from_toml("").expect("parse");
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.slot(), StorageSlot::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = ServiceConfig::from_toml(
            r#"
port = 9000
backend = "file"
recompute_interval_secs = 0
"#,
        )
        .expect("parse");

        assert_eq!(config.port, 9000);
        assert_eq!(config.backend, Backend::File);
        assert_eq!(config.recompute_interval(), None);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn unknown_backend_rejected() {
        assert!(ServiceConfig::from_toml(r#"backend = "sqlite""#).is_err());
        assert!(Backend::parse("sqlite").is_err());
        assert_eq!(Backend::parse("file").map(|b| b.name()).ok(), Some("file"));
    }

    #[test]
    fn from_file_reads_toml() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("mentionrank.toml");
        std::fs::write(&path, "namespace = \"feeds\"\nkey = \"main\"\n").expect("write");

        let config = ServiceConfig::from_file(&path).expect("load");
        assert_eq!(config.slot(), StorageSlot::new("feeds", "main"));
    }
}
