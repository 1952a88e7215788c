//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use verdict_store_lmdb::DEFAULT_MAP_SIZE;
use verdict_utils::LogFormat;

use crate::NodeError;

/// Where records live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// LMDB environment under `data_dir`.
    Lmdb,
    /// In-process maps; everything is lost on exit.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lmdb" => Ok(Self::Lmdb),
            "memory" => Ok(Self::Memory),
            other => Err(NodeError::Config(format!(
                "unknown storage backend '{other}', expected 'lmdb' or 'memory'"
            ))),
        }
    }
}

/// Configuration for a verdict node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_storage")]
    pub storage: StorageBackend,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub lmdb_map_size: usize,

    /// Whether to serve the HTTP API.
    #[serde(default = "default_true")]
    pub enable_rpc: bool,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Seconds between background reconciliation sweeps. 0 disables them.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,

    /// Commit every poll's tally when an event is finalized.
    #[serde(default = "default_true")]
    pub commit_results_on_finalize: bool,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to expose Prometheus metrics at `/metrics`.
    #[serde(default)]
    pub enable_metrics: bool,

    /// Entropy per voter token, in bytes.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./verdict_data")
}

fn default_storage() -> StorageBackend {
    StorageBackend::Lmdb
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_true() -> bool {
    true
}

fn default_rpc_port() -> u16 {
    7380
}

fn default_reconcile_interval() -> u64 {
    30
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_bytes() -> usize {
    verdict_crypto::DEFAULT_TOKEN_BYTES
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// A memory-backed configuration with background work disabled.
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            enable_rpc: false,
            reconcile_interval_secs: 0,
            ..Self::default()
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: default_storage(),
            lmdb_map_size: default_map_size(),
            enable_rpc: default_true(),
            rpc_port: default_rpc_port(),
            reconcile_interval_secs: default_reconcile_interval(),
            commit_results_on_finalize: default_true(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: false,
            token_bytes: default_token_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_parses_case_insensitively() {
        assert_eq!("LMDB".parse::<StorageBackend>().unwrap(), StorageBackend::Lmdb);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = NodeConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = NodeConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = NodeConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.rpc_port, 7380);
        assert_eq!(config.storage, StorageBackend::Lmdb);
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(config.commit_results_on_finalize);
        assert_eq!(config.token_bytes, 16);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_port = 9999
            storage = "memory"
            log_format = "json"
            reconcile_interval_secs = 5
        "#;
        let config = NodeConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.rpc_port, 9999);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.reconcile_interval_secs, 5);
        assert_eq!(config.log_level, "info"); // default
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(matches!(
            NodeConfig::from_toml_str(r#"storage = "postgres""#),
            Err(NodeError::Config(_))
        ));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = NodeConfig::from_toml_file("/nonexistent/verdict.toml");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }
}
