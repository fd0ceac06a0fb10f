//! Reminder repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_entity::reminder::{CreateReminder, ReminderTask, ReminderType};

use crate::traits::ReminderStore;

/// Repository for `reminder_tasks`.
#[derive(Debug, Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for ReminderRepository {
    async fn create(&self, data: &CreateReminder) -> AppResult<ReminderTask> {
        sqlx::query_as::<_, ReminderTask>(
            "INSERT INTO reminder_tasks (entity_id, entity_type, reminder_type, message, scheduled_for, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.entity_id)
        .bind(data.entity_type)
        .bind(data.reminder_type)
        .bind(&data.message)
        .bind(data.scheduled_for)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create reminder", e))
    }

    async fn find_by_entity(&self, entity_id: Uuid) -> AppResult<Vec<ReminderTask>> {
        sqlx::query_as::<_, ReminderTask>(
            "SELECT * FROM reminder_tasks WHERE entity_id = $1 ORDER BY created_at DESC",
        )
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reminders", e))
    }

    async fn cancel_pending(
        &self,
        entity_id: Uuid,
        reminder_type: ReminderType,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE reminder_tasks SET status = 'cancelled', read_at = $3 \
             WHERE entity_id = $1 AND reminder_type = $2 AND status = 'pending'",
        )
        .bind(entity_id)
        .bind(reminder_type)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel reminders", e))?;
        Ok(result.rows_affected())
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<ReminderTask>> {
        sqlx::query_as::<_, ReminderTask>(
            "SELECT * FROM reminder_tasks WHERE status = 'pending' AND scheduled_for <= $1 \
             ORDER BY scheduled_for ASC LIMIT $2",
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query due reminders", e))
    }

    async fn mark_sent(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE reminder_tasks SET status = 'sent' WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark reminder sent", e))?;
        Ok(result.rows_affected() == 1)
    }
}
