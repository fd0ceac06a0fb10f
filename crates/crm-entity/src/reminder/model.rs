//! Reminder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::types::{EntityType, ReminderStatus, ReminderType};

/// A delayed follow-up created when a lead or deal changes stage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReminderTask {
    pub id: Uuid,
    /// Lead or deal the reminder refers to.
    pub entity_id: Uuid,
    pub entity_type: EntityType,
    pub reminder_type: ReminderType,
    pub message: String,
    /// When the reminder becomes due.
    pub scheduled_for: DateTime<Utc>,
    pub status: ReminderStatus,
    /// Set when the reminder is resolved manually.
    pub read_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ReminderTask {
    /// Pending and past its scheduled time.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ReminderStatus::Pending && self.scheduled_for <= now
    }
}

/// Data required to schedule a reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReminder {
    pub entity_id: Uuid,
    pub entity_type: EntityType,
    pub reminder_type: ReminderType,
    pub message: String,
    pub scheduled_for: DateTime<Utc>,
    pub created_by: Option<Uuid>,
}
