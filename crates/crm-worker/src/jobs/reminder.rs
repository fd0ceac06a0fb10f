//! Fires due stage reminders.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crm_entity::job::{Job, JobKind};
use crm_service::ReminderService;

use crate::executor::{JobExecutionError, JobHandler};

#[derive(Debug)]
pub struct ReminderDispatchHandler {
    reminders: Arc<ReminderService>,
}

impl ReminderDispatchHandler {
    pub fn new(reminders: Arc<ReminderService>) -> Self {
        Self { reminders }
    }
}

#[async_trait]
impl JobHandler for ReminderDispatchHandler {
    fn job_type(&self) -> &str {
        JobKind::ReminderDispatch.as_str()
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let summary = self
            .reminders
            .dispatch_due(Utc::now())
            .await
            .map_err(JobExecutionError::from_service)?;

        info!(
            job_id = %job.id,
            due = summary.due,
            delivered = summary.delivered,
            orphaned = summary.orphaned,
            "Reminder dispatch finished"
        );

        let value = serde_json::to_value(&summary)
            .map_err(|e| JobExecutionError::Permanent(format!("Unserializable summary: {e}")))?;
        Ok(Some(value))
    }
}
