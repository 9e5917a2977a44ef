//! Post store controller - owns the live collection of visible posts.
//!
//! Mutations are not serialized against each other: a user post racing a
//! periodic cleanup can lose one side's update in the shared document.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, RwLock, watch};
use tokio_cron_scheduler::JobSchedulerError;

use laune_core::domain::{NewPost, Post, retain_visible};
use laune_core::ports::Clock;
use laune_core::ErrorKind;
use laune_infra::{RemoteStoreAdapter, SyncMode};

use crate::background::{BackgroundConfig, Scheduler};
use crate::error::ControllerError;

/// Top-level controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

/// Point-in-time view of the controller for status displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerStatus {
    pub phase: Phase,
    pub is_loading: bool,
    pub last_error: Option<ErrorKind>,
    pub post_count: usize,
    pub mode: SyncMode,
}

struct State {
    phase: Phase,
    posts: Vec<Post>,
    is_loading: bool,
    last_error: Option<ErrorKind>,
}

struct Inner {
    adapter: RemoteStoreAdapter,
    clock: Arc<dyn Clock>,
    state: RwLock<State>,
    posts_tx: watch::Sender<Arc<[Post]>>,
    torn_down: AtomicBool,
    background: Mutex<Option<Scheduler>>,
}

#[derive(Clone)]
pub struct PostStoreController {
    inner: Arc<Inner>,
}

impl PostStoreController {
    pub fn new(adapter: RemoteStoreAdapter, clock: Arc<dyn Clock>) -> Self {
        let (posts_tx, _) = watch::channel(Arc::from(Vec::new()));
        Self {
            inner: Arc::new(Inner {
                adapter,
                clock,
                state: RwLock::new(State {
                    phase: Phase::Uninitialized,
                    posts: Vec::new(),
                    is_loading: false,
                    last_error: None,
                }),
                posts_tx,
                torn_down: AtomicBool::new(false),
                background: Mutex::new(None),
            }),
        }
    }

    /// Collection-changed notifications carrying the new visible list.
    pub fn subscribe(&self) -> watch::Receiver<Arc<[Post]>> {
        self.inner.posts_tx.subscribe()
    }

    /// Current visible posts.
    pub fn snapshot(&self) -> Arc<[Post]> {
        self.inner.posts_tx.borrow().clone()
    }

    pub fn mode(&self) -> SyncMode {
        self.inner.adapter.mode()
    }

    pub async fn status(&self) -> ControllerStatus {
        let state = self.inner.state.read().await;
        ControllerStatus {
            phase: state.phase,
            is_loading: state.is_loading,
            last_error: state.last_error,
            post_count: state.posts.len(),
            mode: self.inner.adapter.mode(),
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    /// Load the visible posts from the store.
    ///
    /// A failed remote read keeps whatever posts are already shown unless
    /// the local fallback has something to offer.
    pub async fn initialize(&self) {
        if self.is_torn_down() {
            return;
        }
        {
            let mut state = self.inner.state.write().await;
            state.phase = Phase::Loading;
            state.is_loading = true;
        }

        let fetched = self.inner.adapter.fetch().await;

        // Checked under the lock; shutdown sets the flag while holding it
        let mut state = self.inner.state.write().await;
        if self.is_torn_down() {
            tracing::debug!("Fetch finished after shutdown, result ignored");
            return;
        }
        state.is_loading = false;
        match fetched.degraded {
            None => {
                state.posts = fetched.value;
                state.last_error = None;
                state.phase = Phase::Ready;
            }
            Some(error) => {
                tracing::warn!(error = %error, "Showing fallback posts");
                if fetched.value.is_empty() {
                    retain_visible(&mut state.posts, self.inner.clock.now_millis());
                } else {
                    state.posts = fetched.value;
                }
                state.last_error = Some(error.kind);
                state.phase = Phase::Error;
            }
        }
        self.publish(&state);
    }

    /// Manual retry; same as [`PostStoreController::initialize`].
    pub async fn refresh(&self) {
        self.initialize().await;
    }

    /// Add a post. It appears in the collection only after the store
    /// confirmed the save.
    pub async fn add_post(&self, data: NewPost) -> Result<Post, ControllerError> {
        if self.is_torn_down() {
            return Err(ControllerError::ShutDown);
        }
        self.inner.state.write().await.last_error = None;

        let result = self.inner.adapter.add_post(data).await;

        let mut state = self.inner.state.write().await;
        if self.is_torn_down() {
            return Err(ControllerError::ShutDown);
        }
        let added = match result {
            Ok(added) => added,
            Err(e) => {
                state.last_error = Some(ErrorKind::SaveFailed);
                return Err(e.into());
            }
        };
        if let Some(error) = added.degraded {
            state.last_error = Some(ErrorKind::SaveFailed);
            return Err(error.into());
        }

        state.posts.push(added.value.clone());
        retain_visible(&mut state.posts, self.inner.clock.now_millis());
        self.publish(&state);
        Ok(added.value)
    }

    /// Drop posts that expired since the last pass. No network access.
    pub async fn refilter(&self) -> usize {
        if self.is_torn_down() {
            return 0;
        }
        let mut state = self.inner.state.write().await;
        if self.is_torn_down() {
            return 0;
        }
        let pruned = retain_visible(&mut state.posts, self.inner.clock.now_millis());
        if pruned > 0 {
            tracing::debug!(pruned, "Expired posts removed from view");
            self.publish(&state);
        }
        pruned
    }

    /// Prune the shared document, then reload the collection from it.
    pub async fn cleanup_remote(&self) {
        if self.is_torn_down() {
            return;
        }
        let cleaned = self.inner.adapter.cleanup().await;
        if let Some(error) = &cleaned.degraded {
            tracing::warn!(error = %error, "Remote cleanup degraded");
        }
        self.refresh().await;
    }

    /// Reset this device's view. The shared document is untouched.
    pub async fn clear_local(&self) {
        if self.is_torn_down() {
            return;
        }
        self.inner.adapter.clear_local().await;

        let mut state = self.inner.state.write().await;
        if self.is_torn_down() {
            return;
        }
        state.posts.clear();
        self.publish(&state);
        tracing::info!("Local posts cleared");
    }

    /// Register and start the periodic re-filter and cleanup jobs.
    pub async fn start_background(&self, config: &BackgroundConfig) -> Result<(), JobSchedulerError> {
        let mut scheduler = Scheduler::new(config.scheduler.clone()).await?;

        let weak = Arc::downgrade(&self.inner);
        scheduler
            .add_repeated("refilter", config.refilter_interval, move || {
                let weak = weak.clone();
                async move {
                    if let Some(controller) = Self::upgrade(&weak) {
                        controller.refilter().await;
                    }
                }
            })
            .await?;

        let weak = Arc::downgrade(&self.inner);
        scheduler
            .add_repeated("cleanup", config.cleanup_interval, move || {
                let weak = weak.clone();
                async move {
                    if let Some(controller) = Self::upgrade(&weak) {
                        controller.cleanup_remote().await;
                    }
                }
            })
            .await?;

        scheduler.start().await?;

        let previous = self.inner.background.lock().await.replace(scheduler);
        if let Some(mut previous) = previous {
            previous.shutdown().await?;
        }
        Ok(())
    }

    /// Stop background work. Operations still in flight finish without
    /// touching state.
    pub async fn shutdown(&self) {
        {
            let _state = self.inner.state.write().await;
            self.inner.torn_down.store(true, Ordering::SeqCst);
        }

        if let Some(mut scheduler) = self.inner.background.lock().await.take() {
            if let Err(e) = scheduler.shutdown().await {
                tracing::warn!(error = %e, "Scheduler did not stop cleanly");
            }
        }
        tracing::info!("Post store controller shut down");
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn publish(&self, state: &State) {
        self.inner.posts_tx.send_replace(Arc::from(state.posts.clone()));
    }
}
