use std::io;
use thiserror::Error;

/// Error type for thread pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// A worker thread could not be spawned.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(#[source] io::Error),

    /// Pool limits are out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The pool no longer accepts jobs.
    #[error("Thread pool is already shut down")]
    AlreadyShutdown,

    /// `shutdown` was called on a pool that was already shut down.
    #[error("Thread pool was shut down twice")]
    DoubleShutdown,

    /// IO error while reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be deserialized.
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias for thread pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
