//! Interval job scheduler using tokio-cron-scheduler.

use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

/// Job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
    jobs: Vec<uuid::Uuid>,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self {
            inner,
            config,
            jobs: Vec::new(),
        })
    }

    /// Add a job that runs every `every`, first run one period after start.
    ///
    /// # Example
    /// ```ignore
    /// scheduler.add_repeated("refilter", Duration::from_secs(30), || async {
    ///     tracing::info!("Running refilter");
    /// }).await?;
    /// ```
    pub async fn add_repeated<F, Fut>(
        &mut self,
        name: &'static str,
        every: Duration,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_repeated_async(every, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        self.jobs.push(id);
        tracing::info!(job = name, every_secs = every.as_secs(), job_id = %id, "Repeated job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!(jobs = self.jobs.len(), "Scheduler started");
        Ok(())
    }

    /// Remove every registered job and stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        for id in self.jobs.drain(..) {
            if let Err(e) = self.inner.remove(&id).await {
                tracing::warn!(job_id = %id, error = %e, "Failed to remove job");
            }
        }
        if self.config.enabled {
            self.inner.shutdown().await?;
        }
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}
