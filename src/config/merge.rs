//! Layer merging and environment overrides.

use serde::Deserialize;

use super::{Config, LogFormat};

/// A partially-specified config file: every leaf optional, applied onto the
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub connection: ConnectionLayer,
    pub naming: NamingLayer,
    pub reserved: ReservedLayer,
    pub search: SearchLayer,
    pub logging: LoggingLayer,
}

impl ConfigLayer {
    pub fn apply_to(&self, target: &mut Config) {
        self.connection.apply_to(target);
        self.naming.apply_to(target);
        self.reserved.apply_to(target);
        self.search.apply_to(target);
        self.logging.apply_to(target);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionLayer {
    pub base_url: Option<String>,
    pub root_path: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retry_count: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
}

impl ConnectionLayer {
    fn apply_to(&self, target: &mut Config) {
        if let Some(value) = &self.base_url {
            target.connection.base_url = value.clone();
        }
        if let Some(value) = &self.root_path {
            target.connection.root_path = value.clone();
        }
        if let Some(value) = self.timeout_ms {
            target.connection.timeout_ms = value;
        }
        if let Some(value) = self.retry_count {
            target.connection.retry_count = value;
        }
        if let Some(value) = self.retry_backoff_ms {
            target.connection.retry_backoff_ms = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingLayer {
    pub uppercase: Option<bool>,
    pub backslash_replacement: Option<char>,
    pub max_name_len: Option<usize>,
    pub invalid_chars: Option<String>,
}

impl NamingLayer {
    fn apply_to(&self, target: &mut Config) {
        if let Some(value) = self.uppercase {
            target.naming.uppercase = value;
        }
        if let Some(value) = self.backslash_replacement {
            target.naming.backslash_replacement = value;
        }
        if let Some(value) = self.max_name_len {
            target.naming.max_name_len = value;
        }
        if let Some(value) = &self.invalid_chars {
            target.naming.invalid_chars = value.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReservedLayer {
    pub bookkeeping_element: Option<String>,
    pub metadata_attribute: Option<String>,
    pub permissions_attribute: Option<String>,
}

impl ReservedLayer {
    fn apply_to(&self, target: &mut Config) {
        if let Some(value) = &self.bookkeeping_element {
            target.reserved.bookkeeping_element = value.clone();
        }
        if let Some(value) = &self.metadata_attribute {
            target.reserved.metadata_attribute = value.clone();
        }
        if let Some(value) = &self.permissions_attribute {
            target.reserved.permissions_attribute = value.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchLayer {
    pub min_chars: Option<usize>,
    pub debounce_ms: Option<u64>,
    pub limit: Option<usize>,
    pub cache_ttl_ms: Option<u64>,
    pub cache_enabled: Option<bool>,
}

impl SearchLayer {
    fn apply_to(&self, target: &mut Config) {
        if let Some(value) = self.min_chars {
            target.search.min_chars = value;
        }
        if let Some(value) = self.debounce_ms {
            target.search.debounce_ms = value;
        }
        if let Some(value) = self.limit {
            target.search.limit = value;
        }
        if let Some(value) = self.cache_ttl_ms {
            target.search.cache_ttl_ms = value;
        }
        if let Some(value) = self.cache_enabled {
            target.search.cache_enabled = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingLayer {
    pub stdout: Option<bool>,
    pub stdout_format: Option<LogFormat>,
    pub filter: Option<String>,
}

impl LoggingLayer {
    fn apply_to(&self, target: &mut Config) {
        if let Some(value) = self.stdout {
            target.logging.stdout = value;
        }
        if let Some(value) = self.stdout_format {
            target.logging.stdout_format = value;
        }
        if let Some(value) = &self.filter {
            target.logging.filter = Some(value.clone());
        }
    }
}

/// Apply environment overrides, warning and ignoring invalid values.
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(raw) = std::env::var("FRAMESTORE_BASE_URL") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.connection.base_url = trimmed.to_string();
        }
    }

    if let Ok(raw) = std::env::var("FRAMESTORE_ROOT_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.connection.root_path = trimmed.to_string();
        }
    }

    if let Ok(raw) = std::env::var("FRAMESTORE_TIMEOUT_MS") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u64>() {
                Ok(value) => config.connection.timeout_ms = value,
                Err(err) => {
                    tracing::warn!("invalid FRAMESTORE_TIMEOUT_MS, ignoring: {err}");
                }
            }
        }
    }

    if let Ok(raw) = std::env::var("FRAMESTORE_SEARCH_DEBOUNCE_MS") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            match trimmed.parse::<u64>() {
                Ok(value) => config.search.debounce_ms = value,
                Err(err) => {
                    tracing::warn!("invalid FRAMESTORE_SEARCH_DEBOUNCE_MS, ignoring: {err}");
                }
            }
        }
    }

    if let Ok(raw) = std::env::var("FRAMESTORE_LOG") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.logging.filter = Some(trimmed.to_string());
        }
    }
}
