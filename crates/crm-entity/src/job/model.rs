//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::JobKind;
use super::status::{JobPriority, JobStatus};

/// A row of the `jobs` queue table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    /// Job type identifier (see [`JobKind`]).
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    pub priority: JobPriority,
    /// Job-specific payload (JSON).
    pub payload: serde_json::Value,
    /// Summary returned by the handler on success.
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub status: JobStatus,
    /// Number of execution attempts so far.
    pub attempts: i32,
    pub max_attempts: i32,
    /// Earliest execution time (None = immediate).
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// User who enqueued the job, None for cron jobs.
    pub created_by: Option<Uuid>,
    /// Worker that claimed the job.
    pub worker_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Check if the job can be retried.
    pub fn can_retry(&self) -> bool {
        self.status.can_retry() && self.attempts < self.max_attempts
    }

    /// Parse the stored job type.
    pub fn kind(&self) -> Option<JobKind> {
        self.job_type.parse().ok()
    }
}

/// Data required to enqueue a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    pub job_type: String,
    pub queue: String,
    pub priority: JobPriority,
    pub payload: serde_json::Value,
    pub max_attempts: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
}

impl CreateJob {
    /// Build an immediate job of a known kind with an empty payload.
    pub fn for_kind(kind: JobKind, priority: JobPriority) -> Self {
        Self {
            job_type: kind.as_str().to_string(),
            queue: kind.queue().to_string(),
            priority,
            payload: serde_json::json!({}),
            max_attempts: 3,
            scheduled_at: None,
            created_by: None,
        }
    }
}
