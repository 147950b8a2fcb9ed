//! World geometry and admission rules applied by the registry.

use plaza_common::JoinError;

use crate::participant::Position;

#[derive(Debug, Clone)]
pub struct WorldRules {
    pub width: f64,
    pub height: f64,
    pub participant_size: f64,
    pub spawn_margin: f64,
    pub max_participants: usize,
    pub name_max_length: usize,
    /// When true, retained offline participants occupy capacity slots.
    pub capacity_counts_offline: bool,
    pub variants: Vec<String>,
}

impl Default for WorldRules {
    fn default() -> Self {
        Self {
            width: 4800.0,
            height: 3600.0,
            participant_size: 48.0,
            spawn_margin: 20.0,
            max_participants: 50,
            name_max_length: 15,
            capacity_counts_offline: false,
            variants: vec!["#FF6B6B".into(), "#4ECDC4".into(), "#45B7D1".into()],
        }
    }
}

impl WorldRules {
    pub fn half_size(&self) -> f64 {
        self.participant_size / 2.0
    }

    /// Clamp a position so the whole footprint stays inside the world.
    pub fn clamp(&self, position: Position) -> Position {
        let half = self.half_size();
        Position {
            x: clamp_axis(position.x, half, self.width - half),
            y: clamp_axis(position.y, half, self.height - half),
        }
    }

    /// Trim and check a display name. Returns the name to store.
    pub fn validate_name(&self, name: &str) -> Result<String, JoinError> {
        let trimmed = name.trim();
        let len = trimmed.chars().count();
        if len == 0 || len > self.name_max_length {
            return Err(JoinError::InvalidName {
                max_len: self.name_max_length,
            });
        }
        Ok(trimmed.to_string())
    }

    /// Inclusive spawn range on one axis.
    pub(crate) fn spawn_range(&self, extent: f64) -> (f64, f64) {
        (self.spawn_margin, extent - self.spawn_margin)
    }
}

// Written as max-then-min so a footprint wider than the world pins to `lo`.
fn clamp_axis(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}
