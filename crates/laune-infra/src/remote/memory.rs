//! In-memory shared document.
//!
//! Stands in for the gist in tests and offline demos, with switches to
//! inject failures and a barrier to line up concurrent readers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Barrier, RwLock};

use laune_core::ports::{RemoteError, SharedDocumentStore};

pub struct InMemoryDocumentStore {
    content: RwLock<Option<String>>,
    writable: bool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
    read_barrier: Option<Barrier>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            content: RwLock::new(None),
            writable: true,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            read_barrier: None,
        }
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: RwLock::new(Some(content.into())),
            ..Self::new()
        }
    }

    /// A store that rejects writes the way a gist does without a token.
    pub fn read_only(self) -> Self {
        Self {
            writable: false,
            ..self
        }
    }

    /// Hold every read until `readers` reads are in flight. Each reader
    /// takes its snapshot before waiting.
    pub fn with_read_barrier(self, readers: usize) -> Self {
        Self {
            read_barrier: Some(Barrier::new(readers)),
            ..self
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn content(&self) -> Option<String> {
        self.content.read().await.clone()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedDocumentStore for InMemoryDocumentStore {
    async fn read(&self) -> Result<Option<String>, RemoteError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RemoteError::Http("connection refused".into()));
        }

        let snapshot = self.content.read().await.clone();
        if let Some(barrier) = &self.read_barrier {
            barrier.wait().await;
        }
        Ok(snapshot)
    }

    async fn write(&self, content: &str) -> Result<(), RemoteError> {
        if !self.writable {
            return Err(RemoteError::ReadOnly);
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }

        *self.content.write().await = Some(content.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn can_write(&self) -> bool {
        self.writable
    }
}
