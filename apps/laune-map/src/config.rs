//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use laune_infra::GistConfig;

use crate::background::BackgroundConfig;
use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gist: GistConfig,
    /// Directory of the local post cache.
    pub data_dir: PathBuf,
    /// Only the map SDK loader reads this.
    pub map_api_key: Option<String>,
    pub background: BackgroundConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            gist: GistConfig::from_env(),
            data_dir: env::var("LAUNE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./.laune")),
            map_api_key: env::var("MAP_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            background: BackgroundConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}
