//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod document;
mod kv;

pub use clock::{Clock, ManualClock, SystemClock};
pub use document::{RemoteError, SharedDocumentStore};
pub use kv::{KeyValueStore, StorageError};
