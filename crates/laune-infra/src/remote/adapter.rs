//! Remote shared store adapter.
//!
//! Reads and writes the whole shared document, falls back to the local
//! cache on any failure, and never persists an expired post.
//!
//! `add_post` is a fetch, append, save sequence with no locking. Two
//! clients adding at the same time both read the same document and the
//! later save replaces the earlier one. That loss is accepted.

use std::fmt;
use std::sync::Arc;

use laune_core::domain::{NewPost, Post, PostIdGenerator, filter_visible, retain_visible};
use laune_core::ports::{Clock, SharedDocumentStore};
use laune_core::{DomainError, StoreError, Synced};
use laune_shared::SharedDocument;

use crate::local_cache::LocalPostCache;

#[cfg(feature = "gist")]
use crate::gist::{GistConfig, GistDocumentStore};

/// How much of the remote document this adapter may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// No document configured; the local cache is the only store.
    LocalOnly,
    /// Document readable, writes go to the local cache only.
    ReadOnly,
    ReadWrite,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncMode::LocalOnly => "local-only",
            SyncMode::ReadOnly => "read-only",
            SyncMode::ReadWrite => "read-write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Remote,
    Local,
}

struct Fetched {
    posts: Vec<Post>,
    source: Source,
    pruned: usize,
    degraded: Option<StoreError>,
}

#[derive(Clone)]
pub struct RemoteStoreAdapter {
    remote: Option<Arc<dyn SharedDocumentStore>>,
    local: LocalPostCache,
    clock: Arc<dyn Clock>,
    ids: Arc<PostIdGenerator>,
}

impl RemoteStoreAdapter {
    pub fn new(
        remote: Option<Arc<dyn SharedDocumentStore>>,
        local: LocalPostCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            remote,
            local,
            clock,
            ids: Arc::new(PostIdGenerator::new()),
        }
    }

    pub fn local_only(local: LocalPostCache, clock: Arc<dyn Clock>) -> Self {
        Self::new(None, local, clock)
    }

    /// Build from gist settings, degrading to a reduced mode when values are missing.
    #[cfg(feature = "gist")]
    pub fn from_config(config: &GistConfig, local: LocalPostCache, clock: Arc<dyn Clock>) -> Self {
        let missing = laune_core::ErrorKind::ConfigMissing;
        match config.mode() {
            SyncMode::LocalOnly => {
                tracing::warn!(kind = %missing, "GIST_ID not set. Posts stay on this device (local-only mode).");
                return Self::local_only(local, clock);
            }
            SyncMode::ReadOnly => {
                tracing::warn!(kind = %missing, "GITHUB_TOKEN not set. Shared posts are read-only.");
            }
            SyncMode::ReadWrite => {}
        }
        let Some(gist_id) = config.gist_id.as_deref() else {
            return Self::local_only(local, clock);
        };

        match GistDocumentStore::new(gist_id, config) {
            Ok(store) => {
                let remote: Arc<dyn SharedDocumentStore> = Arc::new(store);
                Self::new(Some(remote), local, clock)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to build gist client. Using local-only mode.");
                Self::local_only(local, clock)
            }
        }
    }

    pub fn mode(&self) -> SyncMode {
        match &self.remote {
            None => SyncMode::LocalOnly,
            Some(remote) if remote.can_write() => SyncMode::ReadWrite,
            Some(_) => SyncMode::ReadOnly,
        }
    }

    pub fn local(&self) -> &LocalPostCache {
        &self.local
    }

    /// Current visible posts.
    ///
    /// When expired posts were dropped, the pruned list is written back in
    /// a spawned task; the returned list does not wait on it.
    pub async fn fetch(&self) -> Synced<Vec<Post>> {
        let fetched = self.fetch_filtered().await;

        if fetched.pruned > 0 {
            let adapter = self.clone();
            let posts = fetched.posts.clone();
            let source = fetched.source;
            tokio::spawn(async move {
                adapter.persist_pruned(source, posts).await;
            });
        }

        Synced {
            value: fetched.posts,
            degraded: fetched.degraded,
        }
    }

    /// Persist `posts` after dropping expired ones.
    ///
    /// The local cache is always written. A failed remote write is logged
    /// and reported as a degradation.
    pub async fn save(&self, posts: Vec<Post>) -> Synced<()> {
        let posts = filter_visible(posts, self.clock.now_millis());
        let mut result = Synced::clean(());

        if let Some(remote) = self.remote.as_ref().filter(|r| r.can_write()) {
            let written = match SharedDocument::new(posts.clone()).encode_pretty() {
                Ok(text) => remote.write(&text).await.map_err(StoreError::save),
                Err(e) => Err(StoreError::save(e)),
            };
            if let Err(e) = written {
                tracing::warn!(error = %e, posts = posts.len(), "Failed to save posts to shared document");
                result = Synced::degraded((), e);
            }
        }

        self.local.save(&posts).await;
        result
    }

    /// Create a post, append it to the current document, and save.
    ///
    /// Returns the new post; `degraded` is set when the save did not reach
    /// the shared document.
    pub async fn add_post(&self, data: NewPost) -> Result<Synced<Post>, DomainError> {
        let data = data.validate()?;
        let now = self.clock.now_millis();
        let post = Post::new(self.ids.next(now), data, now);

        // The save below persists the pruned list, so no background write here
        let Fetched {
            mut posts,
            degraded,
            ..
        } = self.fetch_filtered().await;
        posts.push(post.clone());

        // The shared document is unknown; writing it would drop other clients' posts
        if let Some(error) = degraded {
            self.local.save(&filter_visible(posts, now)).await;
            tracing::warn!(post_id = %post.id, error = %error, "Post kept on this device only");
            return Ok(Synced::degraded(post, error));
        }

        let saved = self.save(posts).await;

        tracing::info!(post_id = %post.id, mood = %post.mood, "Post added");
        Ok(Synced {
            value: post,
            degraded: saved.degraded,
        })
    }

    /// Drop expired posts from the stored document. Returns how many were removed.
    pub async fn cleanup(&self) -> Synced<usize> {
        let fetched = self.fetch_filtered().await;
        let pruned = fetched.pruned;
        if pruned == 0 {
            return Synced {
                value: 0,
                degraded: fetched.degraded,
            };
        }

        let persisted = self.persist_pruned(fetched.source, fetched.posts).await;
        tracing::info!("Cleaned up {} expired posts", pruned);

        Synced {
            value: pruned,
            degraded: fetched.degraded,
        }
        .or_degraded(persisted.degraded)
    }

    pub async fn clear_local(&self) {
        self.local.clear().await;
    }

    async fn fetch_filtered(&self) -> Fetched {
        let (mut posts, source, degraded) = self.read_source().await;
        let pruned = retain_visible(&mut posts, self.clock.now_millis());
        if pruned > 0 {
            tracing::debug!(pruned, remaining = posts.len(), "Dropped expired posts");
        }

        Fetched {
            posts,
            source,
            pruned,
            degraded,
        }
    }

    async fn read_source(&self) -> (Vec<Post>, Source, Option<StoreError>) {
        let Some(remote) = &self.remote else {
            return (self.local.load().await, Source::Local, None);
        };

        let error = match remote.read().await {
            Ok(Some(text)) => match SharedDocument::decode_lenient(&text) {
                Ok((document, discarded)) => {
                    if discarded > 0 {
                        tracing::warn!(discarded, "Skipped malformed posts in shared document");
                    }
                    return (document.posts, Source::Remote, None);
                }
                Err(e) => StoreError::fetch(e),
            },
            Ok(None) => {
                tracing::debug!("Shared document not created yet, reading local cache");
                return (self.local.load().await, Source::Local, None);
            }
            Err(e) => StoreError::fetch(e),
        };

        tracing::warn!(error = %error, "Failed to fetch shared document, using local cache");
        (self.local.load().await, Source::Local, Some(error))
    }

    // Posts read from the local cache are only written back there, so a failed
    // remote read never overwrites the shared document with local data.
    async fn persist_pruned(&self, source: Source, posts: Vec<Post>) -> Synced<()> {
        match source {
            Source::Remote => self.save(posts).await,
            Source::Local => {
                self.local.save(&posts).await;
                Synced::clean(())
            }
        }
    }
}
