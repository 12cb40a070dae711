use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Json conversion(Serde) error: {0}")]
    Serde(String),

    /// No cache store has been installed, or the configured one could not be reached.
    #[error("Cache store is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored record did not match the expected kind, version or shape.
    #[error("Schema error: {0}")]
    Schema(String),

    /// An optimistic write lost against a concurrent writer too many times.
    #[error("Write conflict: {0}")]
    Conflict(String),
}

impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
