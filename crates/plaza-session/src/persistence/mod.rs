//! Durable mirror of offline participants.

mod snapshot;
mod store;
mod worker;


pub use snapshot::{ParticipantRecord, Snapshot, SNAPSHOT_VERSION};
pub use store::{read_snapshot, Recovered, SnapshotSource, SnapshotStore};
pub use worker::{PersistHandle, PersistenceWorker};

use std::time::Duration;

use crate::registry::{Registry, RestoreStats};

/// Load the stored snapshot into `registry` at startup.
///
/// Entries already past `ttl` are discarded. If neither the primary nor the
/// backup can be read the registry starts empty.
pub fn recover(store: &SnapshotStore, registry: &mut Registry, ttl: Duration) -> RestoreStats {
    let Recovered { snapshot, source } = store.load();
    let Some(snapshot) = snapshot else {
        tracing::info!("Starting with no retained participants");
        return RestoreStats::default();
    };

    let saved_at = snapshot.last_saved;
    let stats = registry.restore(snapshot.into_participants(), ttl);
    tracing::info!(
        source = ?source,
        saved_at = %saved_at,
        restored = stats.restored,
        expired = stats.expired,
        skipped = stats.skipped,
        "Recovered offline participants"
    );
    stats
}
