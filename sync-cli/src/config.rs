//! Configuration file loading for sitesync.
//!
//! The file is optional TOML. Every key has a default, and command-line
//! flags override whatever the file says.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use sync_client::{DEFAULT_BASE_URL, DEFAULT_SCAN_CONCURRENCY, DEFAULT_TIMEOUT};
use sync_core::ApplyMode;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hosting API settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Sync behaviour.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Hosting API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// API root (default: https://neocities.org/api).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 60).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Sync behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// How to apply the plan (default: safe).
    #[serde(default)]
    pub apply_mode: ApplyMode,
    /// Skip files the host refuses for free accounts (default: false).
    #[serde(default)]
    pub ignore_disallowed_file_types: bool,
    /// Replacement denylist; the built-in one is used when absent.
    #[serde(default)]
    pub disallowed_extensions: Option<Vec<String>>,
    /// Files read at once while scanning (default: 32).
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,
}

// Default value functions
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_scan_concurrency() -> usize {
    DEFAULT_SCAN_CONCURRENCY
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            apply_mode: ApplyMode::default(),
            ignore_disallowed_file_types: false,
            disallowed_extensions: None,
            scan_concurrency: default_scan_concurrency(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {}: {source}", path.display())]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {}: {source}", path.display())]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}
