//! Flags open tasks whose SLA deadline has passed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crm_entity::job::{Job, JobKind};
use crm_service::TaskService;

use crate::executor::{JobExecutionError, JobHandler};

#[derive(Debug)]
pub struct SlaBreachCheckHandler {
    tasks: Arc<TaskService>,
}

impl SlaBreachCheckHandler {
    pub fn new(tasks: Arc<TaskService>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl JobHandler for SlaBreachCheckHandler {
    fn job_type(&self) -> &str {
        JobKind::SlaBreachCheck.as_str()
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let flagged = self
            .tasks
            .mark_sla_breaches(Utc::now())
            .await
            .map_err(JobExecutionError::from_service)?;

        info!(job_id = %job.id, flagged, "SLA breach check finished");
        Ok(Some(serde_json::json!({ "flagged": flagged })))
    }
}
