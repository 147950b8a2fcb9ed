//! Plaza configuration system.
//!
//! Provides TOML-based configuration with full validation. All config
//! sections use sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use plaza_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    LoggingConfig, PersistenceConfig, PlazaConfig, RetentionConfig, ServerConfig, WorldConfig,
    CONFIG_SCHEMA_VERSION,
};
pub use toml_loader::default_data_dir;

use plaza_common::ConfigError;
use std::path::Path;

/// Load and validate the effective config.
///
/// Reads `path` when given, otherwise the platform default location. A
/// missing file is replaced by the documented default template.
pub fn load_config(path: Option<&Path>) -> Result<PlazaConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_or_create(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &PlazaConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
