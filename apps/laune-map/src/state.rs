//! Application state - the controller and services wired from configuration.

use std::sync::Arc;

use laune_core::ports::{Clock, KeyValueStore, SystemClock};
use laune_infra::{FileKeyValueStore, LocalPostCache, RemoteStoreAdapter};

use crate::config::AppConfig;
use crate::controller::PostStoreController;
use crate::map::{DEFAULT_SDK_URL, HttpSdkSource, SdkLoader, SdkSource};

#[derive(Clone)]
pub struct AppState {
    pub controller: PostStoreController,
    pub loader: Arc<SdkLoader>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(config.data_dir.clone()));
        let local = LocalPostCache::new(store);
        let adapter = RemoteStoreAdapter::from_config(&config.gist, local, clock.clone());
        tracing::info!(
            mode = %adapter.mode(),
            data_dir = %config.data_dir.display(),
            "Post store configured"
        );

        let source: Arc<dyn SdkSource> =
            Arc::new(HttpSdkSource::new(DEFAULT_SDK_URL, config.gist.timeout)?);
        let loader = Arc::new(SdkLoader::new(config.map_api_key.clone(), source));

        tracing::info!("Application state initialized");

        Ok(Self {
            controller: PostStoreController::new(adapter, clock),
            loader,
        })
    }
}
