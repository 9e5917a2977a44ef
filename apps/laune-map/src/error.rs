//! Application-level error types.

use laune_core::{DomainError, StoreError};

/// Why the controller did not take a post.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    NotSaved(#[from] StoreError),

    #[error("Controller has been shut down")]
    ShutDown,
}
