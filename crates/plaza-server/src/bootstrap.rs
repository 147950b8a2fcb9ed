//! Wire the session subsystem together from the loaded config.

use std::path::Path;
use std::sync::Arc;

use plaza_common::PersistenceError;
use plaza_config::{PlazaConfig, WorldConfig};
use plaza_session::persistence::recover;
use plaza_session::{
    Clock, Dispatcher, LogSettings, PersistenceWorker, Registry, RetentionMonitor,
    RetentionPolicy, SnapshotStore, World, WorldRules,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// A running world plus its retention task.
pub struct Runtime {
    pub world: World,
    pub retention: JoinHandle<()>,
}

pub fn world_rules(world: &WorldConfig) -> WorldRules {
    WorldRules {
        width: world.width,
        height: world.height,
        participant_size: world.participant_size,
        spawn_margin: world.spawn_margin,
        max_participants: world.max_participants as usize,
        name_max_length: world.name_max_length as usize,
        capacity_counts_offline: world.capacity_counts_offline,
        variants: world.variants.clone(),
    }
}

pub fn retention_policy(config: &PlazaConfig) -> RetentionPolicy {
    RetentionPolicy {
        offline_ttl: config.retention.offline_ttl(),
        sweep_interval: config.retention.sweep_interval(),
    }
}

/// Build the registry, restore retained participants, and start the
/// retention and snapshot tasks.
pub fn start(config: &PlazaConfig, data_dir: &Path, clock: Arc<dyn Clock>) -> Runtime {
    let policy = retention_policy(config);
    let mut registry = Registry::with_entropy(world_rules(&config.world), clock);

    let store = config.persistence.enabled.then(|| {
        SnapshotStore::new(
            config.persistence.resolved_path(data_dir),
            config.persistence.resolved_backup_path(data_dir),
        )
    });
    if let Some(store) = &store {
        tracing::info!(
            primary = %store.primary().display(),
            backup = %store.backup().display(),
            "Persistence enabled"
        );
        recover(store, &mut registry, policy.offline_ttl);
    }

    let registry = Arc::new(RwLock::new(registry));
    let world = World::new(registry.clone(), Dispatcher::new()).with_log_settings(LogSettings {
        connections: config.logging.log_connections,
        movement: config.logging.log_movement,
    });

    // The worker stops on its own once the last handle is dropped.
    let world = match store {
        Some(store) => {
            let (handle, _task) =
                PersistenceWorker::spawn(registry, store, config.persistence.snapshot_interval());
            world.with_persistence(handle)
        }
        None => world,
    };

    let retention = RetentionMonitor::new(world.clone(), policy).spawn();

    Runtime { world, retention }
}

/// Stop sweeping, retain everyone still online as offline, and write the
/// final snapshot. Returns the number of participants written.
pub async fn shutdown(runtime: &Runtime) -> Result<usize, PersistenceError> {
    runtime.retention.abort();
    runtime.world.disconnect_all().await;
    match runtime.world.persistence() {
        Some(handle) => handle.flush().await,
        None => Ok(0),
    }
}
