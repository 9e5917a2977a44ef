//! Background work - the two periodic post-store tasks and their scheduler.

mod scheduler;

use std::time::Duration;

pub use scheduler::{Scheduler, SchedulerConfig};

/// Periods of the controller's background tasks.
#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    /// In-memory expiry pass, no network.
    pub refilter_interval: Duration,
    /// Remote cleanup followed by a re-fetch.
    pub cleanup_interval: Duration,
    pub scheduler: SchedulerConfig,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            refilter_interval: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(60),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl BackgroundConfig {
    pub fn from_env() -> Self {
        Self {
            refilter_interval: Duration::from_secs(secs_var("REFILTER_INTERVAL_SECS", 30)),
            cleanup_interval: Duration::from_secs(secs_var("CLEANUP_INTERVAL_SECS", 60)),
            scheduler: SchedulerConfig::from_env(),
        }
    }
}

fn secs_var(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}
