pub mod errors;
pub mod id;

pub use errors::{ConfigError, JoinError, PersistenceError, PlazaError};
pub use id::{new_id, ParticipantId};

pub type Result<T> = std::result::Result<T, PlazaError>;
