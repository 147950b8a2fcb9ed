//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;
use std::path::PathBuf;

#[test]
fn default_config_validates() {
    let config = PlazaConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_zero_max_participants() {
    let mut config = PlazaConfig::default();
    config.world.max_participants = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("world.max_participants"));
}

#[test]
fn catches_name_length_too_large() {
    let mut config = PlazaConfig::default();
    config.world.name_max_length = 500;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("world.name_max_length"));
}

#[test]
fn catches_participant_larger_than_world() {
    let mut config = PlazaConfig::default();
    config.world.width = 100.0;
    config.world.height = 100.0;
    config.world.participant_size = 150.0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("world.participant_size"));
}

#[test]
fn catches_spawn_margin_leaving_no_room() {
    let mut config = PlazaConfig::default();
    config.world.width = 100.0;
    config.world.spawn_margin = 60.0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("world.spawn_margin"));
}

#[test]
fn catches_nan_width() {
    let mut config = PlazaConfig::default();
    config.world.width = f64::NAN;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("world.width"));
}

#[test]
fn catches_empty_variants() {
    let mut config = PlazaConfig::default();
    config.world.variants.clear();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("world.variants"));
}

#[test]
fn ttl_must_be_ten_sweeps() {
    let mut config = PlazaConfig::default();
    config.retention.sweep_interval_secs = 60;
    config.retention.offline_ttl_secs = 599;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("at least 10x"));

    config.retention.offline_ttl_secs = 600;
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_zero_snapshot_interval() {
    let mut config = PlazaConfig::default();
    config.persistence.snapshot_interval_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("persistence.snapshot_interval_secs"));
}

#[test]
fn catches_backup_equal_to_primary() {
    let mut config = PlazaConfig::default();
    config.persistence.path = Some(PathBuf::from("/tmp/plaza.json"));
    config.persistence.backup_path = Some(PathBuf::from("/tmp/plaza.json"));
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("backup_path"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = PlazaConfig::default();
    config.world.max_participants = 0;
    config.world.variants.clear();
    config.retention.sweep_interval_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("world.max_participants"));
    assert!(err.contains("world.variants"));
    assert!(err.contains("retention.sweep_interval_secs"));
}
