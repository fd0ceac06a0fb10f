//! Delivery log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_entity::notification::{DeliveryChannel, NewNotificationLog, NotificationLog, RuleType};

use crate::traits::NotificationLogStore;

#[derive(Debug, Clone)]
pub struct NotificationLogRepository {
    pool: PgPool,
}

impl NotificationLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationLogStore for NotificationLogRepository {
    async fn append(&self, entry: &NewNotificationLog) -> AppResult<NotificationLog> {
        sqlx::query_as::<_, NotificationLog>(
            "INSERT INTO notification_logs (rule_type, entity_id, recipient_id, channel, message, delivery_status, error) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(entry.rule_type)
        .bind(entry.entity_id)
        .bind(entry.recipient_id)
        .bind(entry.channel)
        .bind(&entry.message)
        .bind(entry.delivery_status)
        .bind(&entry.error)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append notification log", e))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<NotificationLog>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notification_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count notification logs", e))?;

        let rows = sqlx::query_as::<_, NotificationLog>(
            "SELECT * FROM notification_logs ORDER BY sent_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notification logs", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    async fn delivered_since(
        &self,
        rule_type: RuleType,
        entity_id: Uuid,
        channel: DeliveryChannel,
        since: DateTime<Utc>,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM notification_logs \
             WHERE rule_type = $1 AND entity_id = $2 AND channel = $3 \
             AND delivery_status = 'sent' AND sent_at >= $4)",
        )
        .bind(rule_type)
        .bind(entity_id)
        .bind(channel)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check delivery history", e))
    }

    async fn delete_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notification_logs WHERE sent_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to prune notification logs", e))?;
        Ok(result.rows_affected())
    }
}
