//! Automated notification rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crm_core::AppError;

/// The pre-seeded rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_rule_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Open lead with a score at or above the threshold.
    HighScoreLead,
    /// Open task past its due date.
    TaskReminder,
    /// Lead in negotiation with a high closing probability.
    HighProbNegotiation,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [
        Self::HighScoreLead,
        Self::TaskReminder,
        Self::HighProbNegotiation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighScoreLead => "high_score_lead",
            Self::TaskReminder => "task_reminder",
            Self::HighProbNegotiation => "high_prob_negotiation",
        }
    }

    /// Threshold applied when the rule config does not set one.
    pub fn default_threshold(&self) -> Option<i32> {
        match self {
            Self::HighScoreLead => Some(80),
            Self::HighProbNegotiation => Some(70),
            Self::TaskReminder => None,
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown rule type: '{s}'")))
    }
}

/// Message and channel settings stored as JSONB on the rule row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Message template; `{name}` is replaced with the matched entity name.
    pub message: String,
    #[serde(default = "default_true")]
    pub in_app: bool,
    #[serde(default)]
    pub email: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i32>,
}

fn default_true() -> bool {
    true
}

impl NotificationConfig {
    /// Render the message for a matched entity.
    pub fn render(&self, name: &str) -> String {
        self.message.replace("{name}", name)
    }
}

/// A toggleable automated notification rule.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRule {
    pub id: Uuid,
    pub rule_type: RuleType,
    pub is_active: bool,
    pub notification_config: Json<NotificationConfig>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationRule {
    /// Effective threshold: configured value, else the rule default.
    pub fn threshold(&self) -> Option<i32> {
        self.notification_config
            .threshold
            .or_else(|| self.rule_type.default_threshold())
    }
}
