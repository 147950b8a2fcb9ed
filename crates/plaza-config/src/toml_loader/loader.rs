//! Core TOML config loading: read from path or platform default.

use crate::schema::PlazaConfig;
use crate::validation;
use plaza_common::ConfigError;
use std::path::Path;
use tracing::{info, warn};

use super::paths::{create_default_config, default_config_path};

/// Load config from a specific TOML file path.
///
/// Deserializes the file using serde defaults for any missing fields.
/// After loading, the config is validated; if validation fails, a warning
/// is logged and the parsed config is returned as-is so the caller can
/// decide whether to refuse it.
pub fn load_from_path(path: &Path) -> Result<PlazaConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: PlazaConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from `path`, writing the documented default file first if
/// nothing exists there yet.
pub fn load_or_create(path: &Path) -> Result<PlazaConfig, ConfigError> {
    match load_from_path(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!("no config found at {}, creating default", path.display());
            create_default_config(path)?;
            Ok(PlazaConfig::default())
        }
        Err(e) => Err(e),
    }
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/plaza/config.toml`
/// On macOS: `~/Library/Application Support/plaza/config.toml`
pub fn load_default() -> Result<PlazaConfig, ConfigError> {
    let path = default_config_path()?;
    load_or_create(&path)
}
