//! Authoritative presence state for a shared 2D world.
//!
//! The [`Registry`] owns every participant, online or retained offline.
//! [`World`] wraps it behind a single lock and composes it with the
//! [`Dispatcher`] fan-out, the [`RetentionMonitor`] TTL sweep and the
//! background snapshot worker in [`persistence`].

pub mod clock;
pub mod dispatcher;
pub mod events;
pub mod participant;
pub mod persistence;
pub mod registry;
pub mod retention;
pub mod world;

pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatcher::Dispatcher;
pub use events::ServerEvent;
pub use participant::{ClientMeta, Participant, Position};
pub use persistence::{PersistHandle, PersistenceWorker, SnapshotStore};
pub use registry::{JoinOutcome, Registry, RestoreStats, WorldRules};
pub use retention::{RetentionMonitor, RetentionPolicy};
pub use world::{LogSettings, SharedRegistry, World};
