//! Append-only delivery log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::rule::RuleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    InApp,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    /// Nothing was delivered (no recipient, channel unavailable).
    Skipped,
}

impl DeliveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InApp => "in_app",
            Self::Email => "email",
        }
    }
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// One delivery attempt of an automated rule.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationLog {
    pub id: Uuid,
    pub rule_type: RuleType,
    /// Lead or task that matched the rule.
    pub entity_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub channel: DeliveryChannel,
    pub message: String,
    pub delivery_status: DeliveryStatus,
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// Data required to append a log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotificationLog {
    pub rule_type: RuleType,
    pub entity_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub channel: DeliveryChannel,
    pub message: String,
    pub delivery_status: DeliveryStatus,
    pub error: Option<String>,
}
