//! Retention monitor: periodic eviction of expired offline participants.

use std::time::Duration;

use plaza_common::ParticipantId;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::events::ServerEvent;
use crate::world::World;

#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    /// How long an offline participant is kept.
    pub offline_ttl: Duration,
    /// How often the sweep runs. Worst-case overstay is one period.
    pub sweep_interval: Duration,
}

pub struct RetentionMonitor {
    world: World,
    policy: RetentionPolicy,
}

impl RetentionMonitor {
    pub fn new(world: World, policy: RetentionPolicy) -> Self {
        Self { world, policy }
    }

    /// Run one sweep. Returns the evicted ids.
    ///
    /// Each eviction is broadcast as `participantLeft`. If anything was
    /// evicted a snapshot is requested so the store drops it too.
    pub async fn sweep(&self) -> Vec<ParticipantId> {
        let evicted: Vec<ParticipantId> = {
            let mut registry = self.world.registry().write().await;
            let evicted = registry.evict_expired(self.policy.offline_ttl);
            for participant in &evicted {
                tracing::info!(
                    participant = %participant.id,
                    name = %participant.name,
                    "Evicting expired offline participant"
                );
                self.world
                    .dispatcher()
                    .broadcast(
                        &ServerEvent::ParticipantLeft {
                            id: participant.id.clone(),
                        },
                        None,
                    )
                    .await;
            }
            evicted.into_iter().map(|p| p.id).collect()
        };

        if !evicted.is_empty() {
            if let Some(persistence) = self.world.persistence() {
                persistence.request_snapshot();
            }
        }
        evicted
    }

    /// Sweep every `sweep_interval` until the task is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.policy.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let evicted = self.sweep().await;
                let remaining = self.world.registry().read().await.len();
                tracing::debug!(evicted = evicted.len(), participants = remaining, "Retention sweep");
            }
        })
    }
}
