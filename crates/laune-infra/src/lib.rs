//! # Laune Infrastructure
//!
//! Concrete implementations of the ports defined in `laune-core`, plus the
//! adapter that keeps the local cache and the shared document in step.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No network transport, local cache only
//! - `gist` - GitHub Gist transport via reqwest

pub mod gist;
pub mod kv;
pub mod local_cache;
pub mod remote;

// Re-exports
pub use gist::GistConfig;
pub use kv::{FileKeyValueStore, InMemoryKeyValueStore};
pub use local_cache::{LOCAL_CACHE_KEY, LocalPostCache};
pub use remote::{InMemoryDocumentStore, RemoteStoreAdapter, SyncMode};

#[cfg(feature = "gist")]
pub use gist::GistDocumentStore;
