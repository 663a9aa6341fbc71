//! Config file loading.

use std::fs;
use std::path::{Path, PathBuf};

use super::merge::{apply_env_overrides, ConfigLayer};
use super::{Config, ConfigError};

pub fn config_path() -> PathBuf {
    match std::env::var_os("FRAMESTORE_CONFIG") {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from("framestore.toml"),
    }
}

/// Load the default config file (if present) and apply env overrides.
pub fn load() -> Result<Config, ConfigError> {
    load_from(Some(&config_path()))
}

/// Load from an explicit file, or from defaults when `path` is `None` or
/// the file does not exist. Env overrides always apply last.
pub fn load_from(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    if let Some(path) = path {
        if path.exists() {
            let contents = fs::read_to_string(path).map_err(|err| ConfigError::Read {
                path: path.display().to_string(),
                detail: err.to_string(),
            })?;
            let layer: ConfigLayer =
                toml::from_str(&contents).map_err(|err| ConfigError::Parse {
                    path: path.display().to_string(),
                    detail: err.to_string(),
                })?;
            layer.apply_to(&mut config);
        }
    }
    apply_env_overrides(&mut config);
    Ok(config)
}
