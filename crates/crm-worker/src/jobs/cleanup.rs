//! Retention cleanup for notifications, delivery logs and finished jobs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crm_entity::job::{Job, JobKind};
use crm_service::MaintenanceService;

use crate::executor::{JobExecutionError, JobHandler};

#[derive(Debug)]
pub struct MaintenanceCleanupHandler {
    maintenance: Arc<MaintenanceService>,
}

impl MaintenanceCleanupHandler {
    pub fn new(maintenance: Arc<MaintenanceService>) -> Self {
        Self { maintenance }
    }
}

#[async_trait]
impl JobHandler for MaintenanceCleanupHandler {
    fn job_type(&self) -> &str {
        JobKind::MaintenanceCleanup.as_str()
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let summary = self
            .maintenance
            .cleanup(Utc::now())
            .await
            .map_err(JobExecutionError::from_service)?;

        info!(
            job_id = %job.id,
            notifications_deleted = summary.notifications_deleted,
            logs_deleted = summary.logs_deleted,
            jobs_deleted = summary.jobs_deleted,
            "Maintenance cleanup finished"
        );

        let value = serde_json::to_value(&summary)
            .map_err(|e| JobExecutionError::Permanent(format!("Unserializable summary: {e}")))?;
        Ok(Some(value))
    }
}
