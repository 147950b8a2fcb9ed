//! The world hub: one registry lock, one dispatcher, one snapshot worker.
//!
//! Every connection-driven operation takes the registry write lock for its
//! whole duration and emits its events before releasing it, so observers
//! see mutations in the order they were applied.

use std::sync::Arc;

use plaza_common::{JoinError, ParticipantId};
use tokio::sync::RwLock;

use crate::dispatcher::{Dispatcher, Outbox};
use crate::events::ServerEvent;
use crate::participant::{ClientMeta, Participant, Position};
use crate::persistence::PersistHandle;
use crate::registry::Registry;

/// The registry behind the single-writer lock shared by all tasks.
pub type SharedRegistry = Arc<RwLock<Registry>>;

/// Which routine events get logged.
#[derive(Debug, Clone, Copy)]
pub struct LogSettings {
    pub connections: bool,
    pub movement: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            connections: true,
            movement: false,
        }
    }
}

#[derive(Clone)]
pub struct World {
    registry: SharedRegistry,
    dispatcher: Dispatcher,
    persistence: Option<PersistHandle>,
    log: LogSettings,
}

impl World {
    pub fn new(registry: SharedRegistry, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            dispatcher,
            persistence: None,
            log: LogSettings::default(),
        }
    }

    pub fn with_persistence(mut self, handle: PersistHandle) -> Self {
        self.persistence = Some(handle);
        self
    }

    pub fn with_log_settings(mut self, log: LogSettings) -> Self {
        self.log = log;
        self
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn persistence(&self) -> Option<&PersistHandle> {
        self.persistence.as_ref()
    }

    /// Attach a freshly accepted connection's outbox.
    pub async fn connect(&self, id: ParticipantId, outbox: Outbox) {
        if self.log.connections {
            tracing::info!(participant = %id, "Connection opened");
        }
        self.dispatcher.register(id, outbox).await;
    }

    /// Admit the connection `id` as a participant.
    ///
    /// On success the caller receives `currentState` and everyone else
    /// `participantJoined`. On rejection only the caller hears about it.
    pub async fn join(
        &self,
        id: &ParticipantId,
        name: &str,
        client_meta: Option<ClientMeta>,
    ) -> Result<Participant, JoinError> {
        let mut registry = self.registry.write().await;
        match registry.join(id.clone(), name, client_meta) {
            Ok(outcome) => {
                if self.log.connections {
                    tracing::info!(
                        participant = %id,
                        name = %outcome.participant.name,
                        online = registry.online_count(),
                        "Participant joined"
                    );
                }
                self.dispatcher
                    .send_to(
                        id,
                        &ServerEvent::CurrentState {
                            participants: outcome.current_state,
                        },
                    )
                    .await;
                self.dispatcher
                    .broadcast(
                        &ServerEvent::ParticipantJoined {
                            participant: outcome.participant.clone(),
                        },
                        Some(id),
                    )
                    .await;
                Ok(outcome.participant)
            }
            Err(e) => {
                drop(registry);
                tracing::info!(participant = %id, reason = %e, "Join rejected");
                self.dispatcher
                    .send_to(
                        id,
                        &ServerEvent::SessionError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                Err(e)
            }
        }
    }

    /// Move the participant and tell everyone else where it ended up.
    pub async fn move_by(&self, id: &ParticipantId, dx: f64, dy: f64) -> Option<Position> {
        let mut registry = self.registry.write().await;
        let position = registry.move_by(id, dx, dy)?;
        if self.log.movement {
            tracing::debug!(participant = %id, x = position.x, y = position.y, "Participant moved");
        }
        self.dispatcher
            .broadcast(
                &ServerEvent::ParticipantMoved {
                    id: id.clone(),
                    x: position.x,
                    y: position.y,
                },
                Some(id),
            )
            .await;
        Some(position)
    }

    /// Detach the connection and retain its participant offline.
    pub async fn disconnect(&self, id: &ParticipantId) -> Option<Participant> {
        self.dispatcher.unregister(id).await;

        let participant = {
            let mut registry = self.registry.write().await;
            let participant = registry.disconnect(id);
            if let Some(p) = &participant {
                self.dispatcher
                    .broadcast(
                        &ServerEvent::ParticipantOffline {
                            id: p.id.clone(),
                            name: p.name.clone(),
                        },
                        Some(id),
                    )
                    .await;
            }
            participant
        };

        match &participant {
            Some(p) => {
                if self.log.connections {
                    tracing::info!(participant = %id, name = %p.name, "Participant went offline");
                }
                if let Some(persistence) = &self.persistence {
                    persistence.request_snapshot();
                }
            }
            None => {
                if self.log.connections {
                    tracing::info!(participant = %id, "Connection closed before joining");
                }
            }
        }
        participant
    }

    /// Retain every online participant offline, as if all connections had
    /// dropped at once. Used on shutdown ahead of the final snapshot.
    pub async fn disconnect_all(&self) -> Vec<Participant> {
        let mut registry = self.registry.write().await;
        let disconnected = registry.disconnect_all();
        for p in &disconnected {
            self.dispatcher
                .broadcast(
                    &ServerEvent::ParticipantOffline {
                        id: p.id.clone(),
                        name: p.name.clone(),
                    },
                    Some(&p.id),
                )
                .await;
        }
        if self.log.connections && !disconnected.is_empty() {
            tracing::info!(participants = disconnected.len(), "Retained online participants offline");
        }
        disconnected
    }
}
