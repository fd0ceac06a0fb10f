//! Task repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_entity::task::{NewTask, Task};

use crate::traits::TaskStore;

/// Repository for lead tasks.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn create(&self, data: &NewTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (lead_id, task_type, title, description, due_date, assigned_to, \
             priority, dependencies, sla_hours, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(data.lead_id)
        .bind(data.task_type)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .bind(data.priority)
        .bind(&data.dependencies)
        .bind(data.sla_hours)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create task", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find task", e))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load tasks", e))
    }

    async fn find_by_lead(&self, lead_id: Uuid) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE lead_id = $1 ORDER BY due_date ASC, created_at ASC",
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list lead tasks", e))
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE status = 'open' AND due_date < $1 ORDER BY due_date ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query overdue tasks", e))
    }

    async fn complete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status = 'done', completed_at = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete task", e))?
        .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))
    }

    async fn snooze(&self, id: Uuid, until: DateTime<Utc>) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status = 'snoozed', due_date = $2, completed_at = NULL, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(until)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to snooze task", e))?
        .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))
    }

    async fn reopen(&self, id: Uuid) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status = 'open', completed_at = NULL, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reopen task", e))?
        .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))
    }

    async fn set_dependencies(&self, id: Uuid, dependencies: &[Uuid]) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET dependencies = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(dependencies.to_vec())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update task dependencies", e))?
        .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))
    }

    async fn mark_breached(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE tasks SET sla_breached = TRUE, updated_at = NOW() \
             WHERE status = 'open' AND due_date < $1 AND sla_breached = FALSE",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to flag SLA breaches", e))?;
        Ok(result.rows_affected())
    }
}
