//! Per-type SLA policy rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::types::TaskType;

/// Default completion window for one task type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskSlaPolicy {
    pub task_type: TaskType,
    pub default_sla_hours: i32,
    pub updated_at: DateTime<Utc>,
}
