use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Admission-time rejections. Surfaced to the joining connection only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    #[error("name must be between 1 and {max_len} characters")]
    InvalidName { max_len: usize },

    #[error("the world is full ({max} participants), try again later")]
    CapacityExceeded { max: usize },

    #[error("this connection has already joined")]
    AlreadyJoined,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("snapshot write failed for {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot read failed for {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("snapshot at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("snapshot unavailable: {0}")]
    Unavailable(String),
}

/// Fatal errors surfaced by the server's startup and shutdown path.
#[derive(Debug, thiserror::Error)]
pub enum PlazaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
