//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod timing;
mod world;

#[cfg(test)]
mod tests;

use crate::schema::PlazaConfig;
use plaza_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PlazaConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    world::validate_world(&mut errors, config);
    timing::validate_retention(&mut errors, config);
    timing::validate_persistence(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
