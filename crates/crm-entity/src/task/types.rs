//! Task type, priority and status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crm_core::AppError;

/// Closed set of task types. Each type carries a default SLA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Call,
    Email,
    Meeting,
    Valuation,
    Proposal,
    FollowUp,
    DocumentReview,
}

impl TaskType {
    pub const ALL: [TaskType; 7] = [
        Self::Call,
        Self::Email,
        Self::Meeting,
        Self::Valuation,
        Self::Proposal,
        Self::FollowUp,
        Self::DocumentReview,
    ];

    /// SLA used when the policy table has no row for this type.
    pub fn fallback_sla_hours(&self) -> i32 {
        match self {
            Self::Call | Self::Email => 24,
            Self::Meeting | Self::DocumentReview => 72,
            Self::Valuation => 120,
            Self::Proposal => 96,
            Self::FollowUp => 48,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Email => "email",
            Self::Meeting => "meeting",
            Self::Valuation => "valuation",
            Self::Proposal => "proposal",
            Self::FollowUp => "follow_up",
            Self::DocumentReview => "document_review",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown task type: '{s}'")))
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Work pending.
    Open,
    /// Completed; `completed_at` is set.
    Done,
    /// Deferred to a later due date.
    Snoozed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Done => "done",
            Self::Snoozed => "snoozed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_sla_hours() {
        assert_eq!(TaskType::Call.fallback_sla_hours(), 24);
        assert_eq!(TaskType::Email.fallback_sla_hours(), 24);
        assert_eq!(TaskType::Meeting.fallback_sla_hours(), 72);
        assert_eq!(TaskType::Valuation.fallback_sla_hours(), 120);
        assert_eq!(TaskType::Proposal.fallback_sla_hours(), 96);
        assert_eq!(TaskType::FollowUp.fallback_sla_hours(), 48);
        assert_eq!(TaskType::DocumentReview.fallback_sla_hours(), 72);
    }

    #[test]
    fn test_task_type_parse() {
        assert_eq!("follow_up".parse::<TaskType>().unwrap(), TaskType::FollowUp);
        assert!("lunch".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        let parsed: TaskPriority = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(parsed, TaskPriority::Urgent);
    }
}
