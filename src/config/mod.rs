//! Configuration schema.
//!
//! Every section is `#[serde(default)]` so a partial file is valid; the
//! composition root owns the loaded `Config` and passes it down. There is
//! no cached global.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::NamingRules;

mod load;
mod merge;

pub use load::{load, load_from};
pub use merge::apply_env_overrides;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub naming: NamingRules,
    pub reserved: ReservedNames,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Where and how to reach the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub base_url: String,
    /// Path of the directory element that owns per-user account elements.
    pub root_path: String,
    pub timeout_ms: u64,
    /// Additional attempts after the first, for retryable failures only.
    pub retry_count: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/store/api/".to_string(),
            root_path: "\\\\Assets\\DataFrames".to_string(),
            timeout_ms: 30_000,
            retry_count: 2,
            retry_backoff_ms: 250,
        }
    }
}

/// Names of the bookkeeping slots, all matching the reserved key pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedNames {
    /// Child element under each DataFrame holding internal attributes.
    pub bookkeeping_element: String,
    pub metadata_attribute: String,
    pub permissions_attribute: String,
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self {
            bookkeeping_element: "_internal_".to_string(),
            metadata_attribute: "_metadata_".to_string(),
            permissions_attribute: "_permissions_".to_string(),
        }
    }
}

/// Tag search tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_chars: usize,
    pub debounce_ms: u64,
    pub limit: usize,
    pub cache_ttl_ms: u64,
    pub cache_enabled: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_chars: 2,
            debounce_ms: 120,
            limit: 50,
            cache_ttl_ms: 60_000,
            cache_enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub stdout: bool,
    pub stdout_format: LogFormat,
    /// Optional EnvFilter directive string; `FRAMESTORE_LOG` wins over it.
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stdout: true,
            stdout_format: LogFormat::Compact,
            filter: None,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {path}: {detail}")]
    Read { path: String, detail: String },
    #[error("failed to parse {path}: {detail}")]
    Parse { path: String, detail: String },
}
