//! Validation for retention and persistence timing.

use crate::schema::PlazaConfig;

use super::helpers::validate_range_u64;

/// Minimum ratio between the offline TTL and the sweep period.
pub(crate) const MIN_TTL_TO_SWEEP_RATIO: u64 = 10;

/// Validate retention constraints.
pub(crate) fn validate_retention(errors: &mut Vec<String>, config: &PlazaConfig) {
    let retention = &config.retention;

    validate_range_u64(
        errors,
        "retention.sweep_interval_secs",
        retention.sweep_interval_secs,
        1,
        86_400,
    );
    validate_range_u64(
        errors,
        "retention.offline_ttl_secs",
        retention.offline_ttl_secs,
        1,
        30 * 86_400,
    );

    let min_ttl = retention
        .sweep_interval_secs
        .saturating_mul(MIN_TTL_TO_SWEEP_RATIO);
    if retention.offline_ttl_secs < min_ttl {
        errors.push(format!(
            "retention.offline_ttl_secs = {} must be at least {MIN_TTL_TO_SWEEP_RATIO}x retention.sweep_interval_secs ({min_ttl})",
            retention.offline_ttl_secs
        ));
    }
}

/// Validate persistence constraints.
pub(crate) fn validate_persistence(errors: &mut Vec<String>, config: &PlazaConfig) {
    let persistence = &config.persistence;

    validate_range_u64(
        errors,
        "persistence.snapshot_interval_secs",
        persistence.snapshot_interval_secs,
        1,
        86_400,
    );

    if let (Some(primary), Some(backup)) = (&persistence.path, &persistence.backup_path) {
        if primary == backup {
            errors.push("persistence.backup_path must differ from persistence.path".into());
        }
    }
}
