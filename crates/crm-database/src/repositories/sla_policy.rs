//! SLA policy repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_entity::task::{TaskSlaPolicy, TaskType};

use crate::traits::SlaPolicyStore;

#[derive(Debug, Clone)]
pub struct SlaPolicyRepository {
    pool: PgPool,
}

impl SlaPolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlaPolicyStore for SlaPolicyRepository {
    async fn list(&self) -> AppResult<Vec<TaskSlaPolicy>> {
        sqlx::query_as::<_, TaskSlaPolicy>("SELECT * FROM task_sla_policies ORDER BY task_type")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list SLA policies", e))
    }

    async fn find(&self, task_type: TaskType) -> AppResult<Option<TaskSlaPolicy>> {
        sqlx::query_as::<_, TaskSlaPolicy>("SELECT * FROM task_sla_policies WHERE task_type = $1")
            .bind(task_type)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find SLA policy", e))
    }

    async fn upsert(&self, task_type: TaskType, hours: i32) -> AppResult<TaskSlaPolicy> {
        sqlx::query_as::<_, TaskSlaPolicy>(
            "INSERT INTO task_sla_policies (task_type, default_sla_hours) VALUES ($1, $2) \
             ON CONFLICT (task_type) DO UPDATE SET default_sla_hours = EXCLUDED.default_sla_hours, \
             updated_at = NOW() RETURNING *",
        )
        .bind(task_type)
        .bind(hours)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update SLA policy", e))
    }
}
