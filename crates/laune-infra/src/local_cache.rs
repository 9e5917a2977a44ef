//! Local durable cache of the last known post list.
//!
//! A passive fallback: every failure is logged and swallowed so callers on
//! the critical path never depend on it.

use std::sync::Arc;

use laune_core::domain::Post;
use laune_core::ports::KeyValueStore;

/// Storage key shared with the browser client.
pub const LOCAL_CACHE_KEY: &str = "mood-posts";

#[derive(Clone)]
pub struct LocalPostCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalPostCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, LOCAL_CACHE_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The stored list, or empty when absent, unreadable, or unparsable.
    pub async fn load(&self) -> Vec<Post> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Local cache read failed");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Post>>(&raw) {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Local cache is corrupt, ignoring it");
                Vec::new()
            }
        }
    }

    /// Overwrite the stored list.
    pub async fn save(&self, posts: &[Post]) {
        let raw = match serde_json::to_string(posts) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode posts for local cache");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw).await {
            tracing::warn!(key = %self.key, error = %e, "Local cache write failed");
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key).await {
            tracing::warn!(key = %self.key, error = %e, "Local cache clear failed");
        }
    }
}
