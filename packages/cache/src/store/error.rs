use thiserror::Error;

/// Errors raised by a chunk store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached in time.
    #[error("chunk store unavailable: {0}")]
    Unavailable(String),

    /// A command reached the backend but failed.
    #[error("chunk store command failed: {0}")]
    Backend(String),

    /// The handle was closed during shutdown.
    #[error("chunk store handle is closed")]
    Closed,
}

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}
