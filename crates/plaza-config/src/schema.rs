//! Configuration schema types for the plaza server.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the values the world has always run with.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Snapshot file name inside the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "offline_participants.json";

/// Backup file name inside the data directory.
pub const BACKUP_FILE_NAME: &str = "offline_participants.backup.json";

// =============================================================================
// Server Config
// =============================================================================

/// Listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 1666,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// World Config
// =============================================================================

/// World geometry and admission rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World width in pixels.
    pub width: f64,
    /// World height in pixels.
    pub height: f64,
    /// Edge length of a participant's square footprint.
    pub participant_size: f64,
    /// Minimum distance from the world edge for spawn positions.
    pub spawn_margin: f64,
    /// Maximum number of participants admitted at once.
    pub max_participants: u32,
    /// Maximum display name length in characters.
    pub name_max_length: u32,
    /// When true, retained offline participants occupy capacity slots.
    pub capacity_counts_offline: bool,
    /// Visual variants handed out at random on join.
    pub variants: Vec<String>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 4800.0,
            height: 3600.0,
            participant_size: 48.0,
            spawn_margin: 20.0,
            max_participants: 50,
            name_max_length: 15,
            capacity_counts_offline: false,
            variants: [
                "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8",
                "#F7DC6F", "#FF9FF3", "#54A0FF", "#5F27CD", "#00D2D3", "#FF9F43", "#C44569",
                "#F8B500", "#6C5CE7",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

// =============================================================================
// Retention Config
// =============================================================================

/// Offline retention timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// How long an offline participant is kept before eviction.
    pub offline_ttl_secs: u64,
    /// Period of the eviction sweep.
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            offline_ttl_secs: 4 * 60 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl RetentionConfig {
    pub fn offline_ttl(&self) -> Duration {
        Duration::from_secs(self.offline_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

// =============================================================================
// Persistence Config
// =============================================================================

/// Durable storage of offline participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    /// Period of the background snapshot, independent of the sweep.
    pub snapshot_interval_secs: u64,
    /// Primary snapshot file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
    /// Backup copy refreshed before each overwrite of the primary.
    pub backup_path: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_interval_secs: 300,
            path: None,
            backup_path: None,
        }
    }
}

impl PersistenceConfig {
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs)
    }

    /// Resolve the primary snapshot path, falling back to `data_dir`.
    pub fn resolved_path(&self, data_dir: &std::path::Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir.join(SNAPSHOT_FILE_NAME))
    }

    /// Resolve the backup path. Without an explicit value the backup sits
    /// next to the primary file.
    pub fn resolved_backup_path(&self, data_dir: &std::path::Path) -> PathBuf {
        if let Some(path) = &self.backup_path {
            return path.clone();
        }
        match &self.path {
            Some(primary) => primary.with_extension("backup.json"),
            None => data_dir.join(BACKUP_FILE_NAME),
        }
    }
}

// =============================================================================
// Logging Config
// =============================================================================

/// Logging switches on top of the `RUST_LOG` filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log connects, joins and departures at info level.
    pub log_connections: bool,
    /// Log every accepted move at debug level.
    pub log_movement: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_connections: true,
            log_movement: false,
        }
    }
}

// =============================================================================
// Root
// =============================================================================

/// Full plaza configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlazaConfig {
    pub server: ServerConfig,
    pub world: WorldConfig,
    pub retention: RetentionConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_match_deployment() {
        let config = PlazaConfig::default();
        assert_eq!(config.server.port, 1666);
        assert_eq!(config.world.width, 4800.0);
        assert_eq!(config.world.height, 3600.0);
        assert_eq!(config.world.participant_size, 48.0);
        assert_eq!(config.world.max_participants, 50);
        assert_eq!(config.world.name_max_length, 15);
        assert_eq!(config.world.variants.len(), 16);
        assert_eq!(config.retention.offline_ttl(), Duration::from_secs(14_400));
        assert!(!config.world.capacity_counts_offline);
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9000,
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn snapshot_paths_default_to_data_dir() {
        let persistence = PersistenceConfig::default();
        let dir = Path::new("/var/lib/plaza");
        assert_eq!(
            persistence.resolved_path(dir),
            dir.join("offline_participants.json")
        );
        assert_eq!(
            persistence.resolved_backup_path(dir),
            dir.join("offline_participants.backup.json")
        );
    }

    #[test]
    fn backup_path_follows_explicit_primary() {
        let persistence = PersistenceConfig {
            path: Some(PathBuf::from("/srv/state.json")),
            ..Default::default()
        };
        let dir = Path::new("/unused");
        assert_eq!(
            persistence.resolved_backup_path(dir),
            PathBuf::from("/srv/state.backup.json")
        );
    }
}
