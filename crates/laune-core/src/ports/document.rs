//! Shared document port - the single remote JSON document all clients share.

use async_trait::async_trait;

/// Transport for the shared document. Implementations move raw document
/// text; encoding and expiry are the adapter's concern.
#[async_trait]
pub trait SharedDocumentStore: Send + Sync {
    /// Read the document text. `Ok(None)` means the service answered but
    /// holds no document yet.
    async fn read(&self) -> Result<Option<String>, RemoteError>;

    /// Replace the whole document.
    async fn write(&self, content: &str) -> Result<(), RemoteError>;

    /// Whether `write` can be attempted (a credential is configured).
    fn can_write(&self) -> bool;
}

/// Remote transport errors.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Credential rejected")]
    Unauthorized,

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("No write credential configured")]
    ReadOnly,
}
