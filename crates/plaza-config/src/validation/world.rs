//! Validation for world geometry and admission rules.

use crate::schema::PlazaConfig;

use super::helpers::{validate_range, validate_range_f64};

/// Validate world constraints.
pub(crate) fn validate_world(errors: &mut Vec<String>, config: &PlazaConfig) {
    let world = &config.world;

    validate_range_f64(errors, "world.width", world.width, 1.0, 1_000_000.0);
    validate_range_f64(errors, "world.height", world.height, 1.0, 1_000_000.0);
    validate_range(
        errors,
        "world.max_participants",
        world.max_participants,
        1,
        10_000,
    );
    validate_range(errors, "world.name_max_length", world.name_max_length, 1, 64);

    let smallest_side = world.width.min(world.height);
    validate_range_f64(
        errors,
        "world.participant_size",
        world.participant_size,
        0.0,
        smallest_side,
    );
    // Spawn area [margin, extent - margin] must not be empty.
    validate_range_f64(
        errors,
        "world.spawn_margin",
        world.spawn_margin,
        0.0,
        smallest_side / 2.0,
    );

    if world.variants.is_empty() {
        errors.push("world.variants must not be empty".into());
    }
}
