//! Configuration loading and resolution
//!
//! Each service reads an optional TOML file. Resolution order for the file:
//! 1. Command-line argument (highest priority)
//! 2. `MBOARD_CONFIG` environment variable
//! 3. `~/.config/musicboard/<module>.toml` if it exists
//! 4. Compiled defaults (no file)
//!
//! A missing or absent file is never fatal: the service logs a warning and
//! starts with defaults. A file that exists but does not parse is an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MBOARD_CONFIG";
/// Environment variable naming the data folder (SQLite database location)
pub const DATA_FOLDER_ENV_VAR: &str = "MBOARD_DATA_FOLDER";
/// Database file name inside the data folder
pub const DATABASE_FILE: &str = "musicboard.db";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Find the config file for a module, if any
pub fn resolve_config_path(cli_arg: Option<&Path>, module: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("musicboard").join(format!("{}.toml", module)))
        .filter(|p| p.exists())
}

/// Load a TOML config, falling back to defaults when the file is missing
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using compiled defaults", path.display());
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve a secret from the environment first, then the TOML value
///
/// Blank values count as missing, so an empty `SPOTIFY_CLIENT_ID=` does not
/// shadow a key in the config file.
pub fn resolve_secret(env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(str::to_string);

    if env_value.is_some() && toml_value.is_some() {
        warn!("{} set in both environment and config file, using environment", env_var);
    }

    env_value.or(toml_value)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the data folder holding the SQLite database
///
/// Priority: CLI → `MBOARD_DATA_FOLDER` → TOML → OS default.
pub fn resolve_data_folder(cli_arg: Option<&Path>, toml_value: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATA_FOLDER_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    default_data_folder()
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("musicboard"))
        .unwrap_or_else(|| PathBuf::from("./musicboard_data"))
}
