//! Starts and stops the worker pool and the cron scheduler together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crm_core::config::AppConfig;
use crm_core::error::AppError;
use crm_database::traits::JobStore;
use crm_service::Services;

use crate::jobs::default_executor;
use crate::queue::JobQueue;
use crate::runner::WorkerRunner;
use crate::scheduler::CronScheduler;

/// Running background machinery.
#[derive(Debug)]
pub struct Background {
    runner: Option<JoinHandle<()>>,
    scheduler: Option<CronScheduler>,
}

impl Background {
    /// Spawn the worker pool and register the cron schedules, each only
    /// when enabled in configuration. The runner stops when `cancel`
    /// flips to `true`.
    pub async fn start(
        config: &AppConfig,
        jobs: Arc<dyn JobStore>,
        services: &Services,
        cancel: watch::Receiver<bool>,
    ) -> Result<Self, AppError> {
        let worker_id = format!("worker-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let queue = Arc::new(JobQueue::new(jobs, worker_id));

        let runner = if config.worker.enabled {
            let executor = Arc::new(default_executor(
                Arc::clone(&services.reminders),
                Arc::clone(&services.rules),
                Arc::clone(&services.tasks),
                Arc::clone(&services.maintenance),
            ));
            info!(handlers = ?executor.registered_types(), "Job executor ready");

            let runner = WorkerRunner::new(Arc::clone(&queue), executor, config.worker.clone());
            Some(tokio::spawn(async move { runner.run(cancel).await }))
        } else {
            info!("Worker disabled");
            None
        };

        let scheduler = if config.scheduler.enabled {
            let scheduler = CronScheduler::new(Arc::clone(&queue)).await?;
            scheduler.register_default_tasks(&config.scheduler).await?;
            scheduler.start().await?;
            Some(scheduler)
        } else {
            info!("Scheduler disabled");
            None
        };

        Ok(Self { runner, scheduler })
    }

    /// Stop the scheduler and wait up to `grace` for the runner to drain.
    /// The caller must already have signalled the cancel channel.
    pub async fn stop(mut self, grace: Duration) {
        if let Some(mut scheduler) = self.scheduler.take() {
            if let Err(e) = scheduler.shutdown().await {
                warn!(error = %e, "Scheduler did not shut down cleanly");
            }
        }

        if let Some(runner) = self.runner.take() {
            match tokio::time::timeout(grace, runner).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Worker task panicked"),
                Err(_) => warn!(grace_seconds = grace.as_secs(), "Worker did not stop in time"),
            }
        }
    }
}
