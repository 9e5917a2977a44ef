//! Map SDK loader service.
//!
//! Loads the SDK at most once per success. Callers that arrive while a load
//! is in flight wait on a oneshot continuation and get the same outcome.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

pub const DEFAULT_SDK_URL: &str = "https://maps.googleapis.com/maps/api/js";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("MAP_API_KEY is not set")]
    ConfigMissing,
    #[error("map SDK failed to load: {0}")]
    Load(String),
    #[error("map SDK load was abandoned")]
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    NotStarted,
    Loading,
    Ready,
    Failed(LoaderError),
}

/// Where the SDK comes from.
#[async_trait]
pub trait SdkSource: Send + Sync {
    async fn load(&self, api_key: &str) -> Result<(), LoaderError>;
}

/// Fetches the SDK bootstrap script over HTTP.
pub struct HttpSdkSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSdkSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("laune-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl SdkSource for HttpSdkSource {
    async fn load(&self, api_key: &str) -> Result<(), LoaderError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("key", api_key), ("libraries", "geometry")])
            .send()
            .await
            .map_err(|e| LoaderError::Load(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::Load(format!("HTTP {status}")));
        }

        let script = response
            .text()
            .await
            .map_err(|e| LoaderError::Load(e.to_string()))?;
        if script.trim().is_empty() {
            return Err(LoaderError::Load("empty SDK script".to_string()));
        }

        tracing::debug!(bytes = script.len(), "Map SDK script fetched");
        Ok(())
    }
}

type Continuation = oneshot::Sender<Result<(), LoaderError>>;

struct Inner {
    state: LoaderState,
    pending: Vec<Continuation>,
}

pub struct SdkLoader {
    api_key: Option<String>,
    source: Arc<dyn SdkSource>,
    inner: Mutex<Inner>,
}

impl SdkLoader {
    pub fn new(api_key: Option<String>, source: Arc<dyn SdkSource>) -> Self {
        Self {
            api_key,
            source,
            inner: Mutex::new(Inner {
                state: LoaderState::NotStarted,
                pending: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> LoaderState {
        self.lock().state.clone()
    }

    /// Load the SDK unless it is already loaded.
    pub async fn ensure_loaded(&self) -> Result<(), LoaderError> {
        let waiter = {
            let mut inner = self.lock();
            match inner.state {
                LoaderState::Ready => return Ok(()),
                LoaderState::Loading => {
                    let (tx, rx) = oneshot::channel();
                    inner.pending.push(tx);
                    Some(rx)
                }
                LoaderState::NotStarted | LoaderState::Failed(_) => {
                    if self.api_key.is_none() {
                        tracing::warn!("MAP_API_KEY not set. Map SDK not loaded.");
                        inner.state = LoaderState::Failed(LoaderError::ConfigMissing);
                        return Err(LoaderError::ConfigMissing);
                    }
                    inner.state = LoaderState::Loading;
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            return rx.await.unwrap_or(Err(LoaderError::Abandoned));
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return Err(LoaderError::ConfigMissing);
        };

        let mut guard = LoadGuard {
            loader: self,
            armed: true,
        };
        tracing::info!("Loading map SDK");
        let result = self.source.load(api_key).await;
        guard.armed = false;
        self.complete(result.clone());
        result
    }

    fn complete(&self, result: Result<(), LoaderError>) {
        let pending = {
            let mut inner = self.lock();
            inner.state = match &result {
                Ok(()) => LoaderState::Ready,
                Err(e) => LoaderState::Failed(e.clone()),
            };
            std::mem::take(&mut inner.pending)
        };

        match &result {
            Ok(()) => tracing::info!(waiters = pending.len(), "Map SDK loaded"),
            Err(e) => tracing::error!(error = %e, waiters = pending.len(), "Map SDK failed to load"),
        }
        for tx in pending {
            let _ = tx.send(result.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn waiting(&self) -> usize {
        self.lock().pending.len()
    }
}

// Resets the loader when the loading future is dropped before completion.
struct LoadGuard<'a> {
    loader: &'a SdkLoader,
    armed: bool,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let pending = {
            let mut inner = self.loader.lock();
            inner.state = LoaderState::NotStarted;
            std::mem::take(&mut inner.pending)
        };
        for tx in pending {
            let _ = tx.send(Err(LoaderError::Abandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct GatedSource {
        gate: Notify,
        loads: AtomicUsize,
        fail_first: bool,
    }

    impl GatedSource {
        fn new(fail_first: bool) -> Arc<Self> {
            Arc::new(Self {
                gate: Notify::new(),
                loads: AtomicUsize::new(0),
                fail_first,
            })
        }
    }

    #[async_trait]
    impl SdkSource for GatedSource {
        async fn load(&self, _api_key: &str) -> Result<(), LoaderError> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail_first && n == 0 {
                Err(LoaderError::Load("network down".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let source = GatedSource::new(false);
        let loader = Arc::new(SdkLoader::new(Some("key".into()), source.clone()));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.ensure_loaded().await }
        });
        while loader.state() != LoaderState::Loading {
            tokio::task::yield_now().await;
        }

        let others: Vec<_> = (0..2)
            .map(|_| {
                let loader = loader.clone();
                tokio::spawn(async move { loader.ensure_loaded().await })
            })
            .collect();
        while loader.waiting() < 2 {
            tokio::task::yield_now().await;
        }

        source.gate.notify_one();
        assert_eq!(first.await.unwrap(), Ok(()));
        for other in others {
            assert_eq!(other.await.unwrap(), Ok(()));
        }

        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(loader.state(), LoaderState::Ready);
        assert_eq!(loader.ensure_loaded().await, Ok(()));
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_loading() {
        let source = GatedSource::new(false);
        let loader = SdkLoader::new(None, source.clone());

        assert_eq!(loader.ensure_loaded().await, Err(LoaderError::ConfigMissing));
        assert_eq!(loader.state(), LoaderState::Failed(LoaderError::ConfigMissing));
        assert_eq!(source.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_load_permits_retry() {
        let source = GatedSource::new(true);
        let loader = SdkLoader::new(Some("key".into()), source.clone());

        source.gate.notify_one();
        let error = loader.ensure_loaded().await.unwrap_err();
        assert!(matches!(error, LoaderError::Load(_)));
        assert!(matches!(loader.state(), LoaderState::Failed(_)));

        source.gate.notify_one();
        assert_eq!(loader.ensure_loaded().await, Ok(()));
        assert_eq!(loader.state(), LoaderState::Ready);
        assert_eq!(source.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_waiters_receive_the_same_failure() {
        let source = GatedSource::new(true);
        let loader = Arc::new(SdkLoader::new(Some("key".into()), source.clone()));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.ensure_loaded().await }
        });
        while loader.state() != LoaderState::Loading {
            tokio::task::yield_now().await;
        }
        let waiter = tokio::spawn({
            let loader = loader.clone();
            async move { loader.ensure_loaded().await }
        });
        while loader.waiting() < 1 {
            tokio::task::yield_now().await;
        }

        source.gate.notify_one();
        let expected = Err(LoaderError::Load("network down".to_string()));
        assert_eq!(first.await.unwrap(), expected);
        assert_eq!(waiter.await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_dropped_load_resets_state() {
        let source = GatedSource::new(false);
        let loader = Arc::new(SdkLoader::new(Some("key".into()), source.clone()));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.ensure_loaded().await }
        });
        while loader.state() != LoaderState::Loading {
            tokio::task::yield_now().await;
        }
        first.abort();
        let _ = first.await;

        assert_eq!(loader.state(), LoaderState::NotStarted);
    }
}
