//! Domain-level error types and the degraded-result wrapper.

use std::fmt;

use thiserror::Error;

/// Domain errors - business rule failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Kinds of failure surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Remote read or parse failed; local fallback or stale data in use.
    FetchFailed,
    /// Remote write failed; the local cache was still updated.
    SaveFailed,
    /// No document id or credential; the adapter runs in a reduced mode.
    ConfigMissing,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::FetchFailed => "fetch failed",
            ErrorKind::SaveFailed => "save failed",
            ErrorKind::ConfigMissing => "configuration missing",
        };
        f.write_str(name)
    }
}

/// A backend step that failed while the operation as a whole still produced a value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct StoreError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn fetch(err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::FetchFailed, err.to_string())
    }

    pub fn save(err: impl fmt::Display) -> Self {
        Self::new(ErrorKind::SaveFailed, err.to_string())
    }
}

/// Result of a store operation that never fails outright.
///
/// `degraded` is set when a remote step failed and a fallback was used.
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    pub degraded: Option<StoreError>,
}

impl<T> Synced<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            degraded: None,
        }
    }

    pub fn degraded(value: T, error: StoreError) -> Self {
        Self {
            value,
            degraded: Some(error),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.degraded.is_none()
    }

    /// Keep the first degradation seen when chaining two steps.
    pub fn or_degraded(mut self, error: Option<StoreError>) -> Self {
        if self.degraded.is_none() {
            self.degraded = error;
        }
        self
    }
}
