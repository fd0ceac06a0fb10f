//! Evaluates the automated notification rules.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crm_entity::job::{Job, JobKind};
use crm_service::NotificationRuleService;

use crate::executor::{JobExecutionError, JobHandler};

#[derive(Debug)]
pub struct AutomatedNotificationsHandler {
    rules: Arc<NotificationRuleService>,
}

impl AutomatedNotificationsHandler {
    pub fn new(rules: Arc<NotificationRuleService>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl JobHandler for AutomatedNotificationsHandler {
    fn job_type(&self) -> &str {
        JobKind::AutomatedNotifications.as_str()
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let summary = self
            .rules
            .trigger_automated_notifications()
            .await
            .map_err(JobExecutionError::from_service)?;

        info!(
            job_id = %job.id,
            rules_evaluated = summary.rules_evaluated,
            delivered = summary.delivered,
            failed = summary.failed,
            "Automated notifications finished"
        );

        // Per-delivery failures live in the notification log, not the job.
        let value = serde_json::to_value(&summary)
            .map_err(|e| JobExecutionError::Permanent(format!("Unserializable summary: {e}")))?;
        Ok(Some(value))
    }
}
