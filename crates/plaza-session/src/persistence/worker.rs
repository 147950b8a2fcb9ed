//! Background snapshot worker.
//!
//! Snapshots are taken on request (after a disconnect or an eviction sweep)
//! and on a fixed interval. The registry lock is held only long enough to
//! copy the offline participants; file I/O runs on the blocking pool.

use std::sync::Arc;
use std::time::Duration;

use plaza_common::PersistenceError;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::snapshot::Snapshot;
use super::store::SnapshotStore;
use crate::world::SharedRegistry;

enum PersistCommand {
    Snapshot,
    Flush(oneshot::Sender<Result<usize, PersistenceError>>),
}

/// Cheap handle for triggering snapshots. Clones share one worker.
#[derive(Clone)]
pub struct PersistHandle {
    tx: mpsc::Sender<PersistCommand>,
    registry: SharedRegistry,
    store: Arc<SnapshotStore>,
}

impl PersistHandle {
    /// Ask for a snapshot soon. Never blocks; requests that arrive while one
    /// is already queued are merged into it.
    pub fn request_snapshot(&self) {
        match self.tx.try_send(PersistCommand::Snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::trace!("Snapshot already pending");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Persistence worker stopped, snapshot request dropped");
            }
        }
    }

    /// Write a snapshot now and wait for the result.
    ///
    /// Goes through the worker so it is ordered after pending requests;
    /// writes directly if the worker is gone.
    pub async fn flush(&self) -> Result<usize, PersistenceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(reply_tx)).await.is_ok() {
            if let Ok(result) = reply_rx.await {
                return result;
            }
        }
        write_snapshot(&self.registry, &self.store).await
    }

    /// Synchronous best-effort snapshot for contexts that cannot await,
    /// such as a panic hook. Fails if the registry is locked.
    pub fn save_blocking(&self) -> Result<usize, PersistenceError> {
        let snapshot = {
            let registry = self
                .registry
                .try_read()
                .map_err(|_| PersistenceError::Unavailable("registry is locked".into()))?;
            Snapshot::capture(registry.offline_participants(), registry.clock().now())
        };
        self.store.save(&snapshot)?;
        Ok(snapshot.len())
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }
}

pub struct PersistenceWorker {
    registry: SharedRegistry,
    store: Arc<SnapshotStore>,
    rx: mpsc::Receiver<PersistCommand>,
    interval: Duration,
}

impl PersistenceWorker {
    /// Start the worker. It runs until every [`PersistHandle`] is dropped.
    pub fn spawn(
        registry: SharedRegistry,
        store: SnapshotStore,
        interval: Duration,
    ) -> (PersistHandle, JoinHandle<()>) {
        // One slot: a queued request already covers anything that follows it.
        let (tx, rx) = mpsc::channel(1);
        let store = Arc::new(store);

        let handle = PersistHandle {
            tx,
            registry: registry.clone(),
            store: store.clone(),
        };
        let worker = PersistenceWorker {
            registry,
            store,
            rx,
            interval,
        };
        (handle, tokio::spawn(worker.run()))
    }

    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.persist("periodic").await,
                command = self.rx.recv() => match command {
                    Some(PersistCommand::Snapshot) => self.persist("requested").await,
                    Some(PersistCommand::Flush(reply)) => {
                        let _ = reply.send(write_snapshot(&self.registry, &self.store).await);
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("Persistence worker stopped");
    }

    async fn persist(&self, trigger: &'static str) {
        match write_snapshot(&self.registry, &self.store).await {
            Ok(count) => {
                tracing::debug!(trigger, participants = count, "Snapshot written");
            }
            Err(e) => {
                tracing::warn!(trigger, error = %e, "Snapshot write failed, will retry on next trigger");
            }
        }
    }
}

async fn write_snapshot(
    registry: &SharedRegistry,
    store: &Arc<SnapshotStore>,
) -> Result<usize, PersistenceError> {
    let snapshot = {
        let registry = registry.read().await;
        Snapshot::capture(registry.offline_participants(), registry.clock().now())
    };
    let count = snapshot.len();

    let store = store.clone();
    let path = store.primary().to_path_buf();
    tokio::task::spawn_blocking(move || store.save(&snapshot))
        .await
        .map_err(|e| PersistenceError::Write {
            path,
            source: std::io::Error::other(e),
        })??;
    Ok(count)
}
