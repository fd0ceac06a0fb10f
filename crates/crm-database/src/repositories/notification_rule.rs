//! Notification rule repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use crm_core::error::{AppError, ErrorKind};
use crm_core::result::AppResult;
use crm_entity::notification::{NotificationConfig, NotificationRule, RuleType};

use crate::traits::NotificationRuleStore;

/// Repository for the seeded `notification_rules` rows.
#[derive(Debug, Clone)]
pub struct NotificationRuleRepository {
    pool: PgPool,
}

impl NotificationRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRuleStore for NotificationRuleRepository {
    async fn list(&self) -> AppResult<Vec<NotificationRule>> {
        sqlx::query_as::<_, NotificationRule>("SELECT * FROM notification_rules ORDER BY rule_type")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list rules", e))
    }

    async fn find(&self, rule_type: RuleType) -> AppResult<Option<NotificationRule>> {
        sqlx::query_as::<_, NotificationRule>("SELECT * FROM notification_rules WHERE rule_type = $1")
            .bind(rule_type)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find rule", e))
    }

    async fn set_active(
        &self,
        rule_type: RuleType,
        is_active: bool,
    ) -> AppResult<NotificationRule> {
        sqlx::query_as::<_, NotificationRule>(
            "UPDATE notification_rules SET is_active = $2, updated_at = NOW() \
             WHERE rule_type = $1 RETURNING *",
        )
        .bind(rule_type)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to toggle rule", e))?
        .ok_or_else(|| AppError::not_found(format!("Rule {rule_type} not found")))
    }

    async fn update_config(
        &self,
        rule_type: RuleType,
        config: &NotificationConfig,
    ) -> AppResult<NotificationRule> {
        sqlx::query_as::<_, NotificationRule>(
            "UPDATE notification_rules SET notification_config = $2, updated_at = NOW() \
             WHERE rule_type = $1 RETURNING *",
        )
        .bind(rule_type)
        .bind(Json(config))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update rule", e))?
        .ok_or_else(|| AppError::not_found(format!("Rule {rule_type} not found")))
    }
}
