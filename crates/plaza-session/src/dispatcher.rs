//! Broadcast dispatcher: fans server events out to connected sessions.
//!
//! Each connection owns a bounded outbox drained by its own writer task,
//! so delivery is FIFO per destination. Sends never block: a full or
//! closed outbox is logged and skipped without affecting other
//! destinations.

use std::collections::HashMap;
use std::sync::Arc;

use plaza_common::ParticipantId;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

use crate::events::ServerEvent;

/// Outbox capacity per connection.
pub const OUTBOX_CAPACITY: usize = 256;

/// Sending half of a connection's outbox. Frames are pre-serialized JSON.
pub type Outbox = mpsc::Sender<String>;

#[derive(Clone, Default)]
pub struct Dispatcher {
    connections: Arc<RwLock<HashMap<ParticipantId, Outbox>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbox. Replaces any previous outbox for `id`.
    pub async fn register(&self, id: ParticipantId, outbox: Outbox) {
        self.connections.write().await.insert(id, outbox);
    }

    /// Drop a connection's outbox. Returns true if it was registered.
    pub async fn unregister(&self, id: &ParticipantId) -> bool {
        self.connections.write().await.remove(id).is_some()
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Deliver `event` to a single connection.
    pub async fn send_to(&self, id: &ParticipantId, event: &ServerEvent) -> bool {
        let Some(frame) = encode(event) else {
            return false;
        };
        let map = self.connections.read().await;
        match map.get(id) {
            Some(outbox) => deliver(id, outbox, frame, event.kind()),
            None => {
                tracing::debug!(participant = %id, event = event.kind(), "No outbox for direct send");
                false
            }
        }
    }

    /// Deliver `event` to every connection except `exclude`.
    ///
    /// Returns the number of outboxes that accepted the frame.
    pub async fn broadcast(&self, event: &ServerEvent, exclude: Option<&ParticipantId>) -> usize {
        let Some(frame) = encode(event) else {
            return 0;
        };
        let map = self.connections.read().await;
        let mut delivered = 0;
        for (id, outbox) in map.iter() {
            if Some(id) == exclude {
                continue;
            }
            if deliver(id, outbox, frame.clone(), event.kind()) {
                delivered += 1;
            }
        }
        delivered
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!(event = event.kind(), error = %e, "Failed to encode event");
            None
        }
    }
}

fn deliver(id: &ParticipantId, outbox: &Outbox, frame: String, kind: &'static str) -> bool {
    match outbox.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(participant = %id, event = kind, "Outbox full, dropping event");
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(participant = %id, event = kind, "Outbox closed, dropping event");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left(id: &str) -> ServerEvent {
        ServerEvent::ParticipantLeft {
            id: ParticipantId::from(id),
        }
    }

    #[tokio::test]
    async fn broadcast_skips_excluded() {
        let dispatcher = Dispatcher::new();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        dispatcher.register(ParticipantId::from("a"), tx_a).await;
        dispatcher.register(ParticipantId::from("b"), tx_b).await;

        let delivered = dispatcher
            .broadcast(&left("x"), Some(&ParticipantId::from("a")))
            .await;
        assert_eq!(delivered, 1);

        let frame = rx_b.recv().await.unwrap();
        assert_eq!(frame, r#"{"type":"participantLeft","id":"x"}"#);
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_without_exclude_reaches_everyone() {
        let dispatcher = Dispatcher::new();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        dispatcher.register(ParticipantId::from("a"), tx_a).await;
        dispatcher.register(ParticipantId::from("b"), tx_b).await;

        assert_eq!(dispatcher.broadcast(&left("x"), None).await, 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn dead_destination_does_not_affect_others() {
        let dispatcher = Dispatcher::new();
        let (tx_dead, rx_dead) = mpsc::channel(8);
        let (tx_live, mut rx_live) = mpsc::channel(8);
        dispatcher.register(ParticipantId::from("dead"), tx_dead).await;
        dispatcher.register(ParticipantId::from("live"), tx_live).await;
        drop(rx_dead);

        assert_eq!(dispatcher.broadcast(&left("x"), None).await, 1);
        assert!(rx_live.recv().await.is_some());
    }

    #[tokio::test]
    async fn full_outbox_drops_without_blocking() {
        let dispatcher = Dispatcher::new();
        let (tx, mut rx) = mpsc::channel(1);
        dispatcher.register(ParticipantId::from("a"), tx).await;

        assert_eq!(dispatcher.broadcast(&left("1"), None).await, 1);
        assert_eq!(dispatcher.broadcast(&left("2"), None).await, 0);
        assert_eq!(rx.recv().await.unwrap(), r#"{"type":"participantLeft","id":"1"}"#);
    }

    #[tokio::test]
    async fn per_destination_order_is_fifo() {
        let dispatcher = Dispatcher::new();
        let (tx, mut rx) = mpsc::channel(16);
        dispatcher.register(ParticipantId::from("a"), tx).await;

        for n in 0..5 {
            dispatcher.broadcast(&left(&n.to_string()), None).await;
        }
        for n in 0..5 {
            let frame = rx.recv().await.unwrap();
            assert!(frame.contains(&format!("\"id\":\"{n}\"")));
        }
    }

    #[tokio::test]
    async fn send_to_targets_one_connection() {
        let dispatcher = Dispatcher::new();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        dispatcher.register(ParticipantId::from("a"), tx_a).await;
        dispatcher.register(ParticipantId::from("b"), tx_b).await;

        assert!(dispatcher.send_to(&ParticipantId::from("b"), &left("x")).await);
        assert!(!dispatcher.send_to(&ParticipantId::from("zzz"), &left("x")).await);
        assert!(rx_b.recv().await.is_some());
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_removes_connection() {
        let dispatcher = Dispatcher::new();
        let (tx, _rx) = mpsc::channel(8);
        dispatcher.register(ParticipantId::from("a"), tx).await;
        assert_eq!(dispatcher.connection_count().await, 1);

        assert!(dispatcher.unregister(&ParticipantId::from("a")).await);
        assert!(!dispatcher.unregister(&ParticipantId::from("a")).await);
        assert_eq!(dispatcher.connection_count().await, 0);
    }
}
