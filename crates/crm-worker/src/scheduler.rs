//! Cron scheduler that enqueues the periodic jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info};

use crm_core::config::SchedulerConfig;
use crm_core::error::AppError;
use crm_entity::job::{CreateJob, JobKind, JobPriority};

use crate::queue::JobQueue;

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    scheduler: JobScheduler,
    /// Job queue for enqueuing scheduled work.
    queue: Arc<JobQueue>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    pub async fn new(queue: Arc<JobQueue>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, queue })
    }

    /// Register every periodic job with its configured schedule.
    pub async fn register_default_tasks(&self, config: &SchedulerConfig) -> Result<(), AppError> {
        self.register(JobKind::ReminderDispatch, &config.reminder_dispatch, JobPriority::High)
            .await?;
        self.register(
            JobKind::AutomatedNotifications,
            &config.automated_notifications,
            JobPriority::Normal,
        )
        .await?;
        self.register(JobKind::SlaBreachCheck, &config.sla_breach_check, JobPriority::Normal)
            .await?;
        self.register(JobKind::MaintenanceCleanup, &config.maintenance_cleanup, JobPriority::Low)
            .await?;

        info!("All scheduled tasks registered");
        Ok(())
    }

    /// Enqueue a job of `kind` on every tick of `cron` (six-field syntax).
    pub async fn register(
        &self,
        kind: JobKind,
        cron: &str,
        priority: JobPriority,
    ) -> Result<(), AppError> {
        let queue = Arc::clone(&self.queue);
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            Box::pin(async move {
                debug!(job_type = kind.as_str(), "Scheduling periodic job");
                let mut params = CreateJob::for_kind(kind, priority);
                params.payload = serde_json::json!({ "trigger": "cron" });
                if let Err(e) = queue.enqueue(&params).await {
                    error!(job_type = kind.as_str(), error = %e, "Failed to enqueue periodic job");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{cron}' for {kind}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {kind} schedule: {e}")))?;

        info!(job_type = kind.as_str(), cron, "Registered periodic job");
        Ok(())
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }
}
