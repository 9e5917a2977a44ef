use async_trait::async_trait;

/// Key-value trait - abstraction over the client's durable storage
/// (files on disk, or memory in tests).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage operation errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}
