//! Known background job types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job types understood by the worker executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Fire due stage reminders as inbox notifications.
    ReminderDispatch,
    /// Evaluate every active notification rule.
    AutomatedNotifications,
    /// Flag overdue open tasks as SLA breached.
    SlaBreachCheck,
    /// Prune old delivery logs, read notifications and finished jobs.
    MaintenanceCleanup,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        Self::ReminderDispatch,
        Self::AutomatedNotifications,
        Self::SlaBreachCheck,
        Self::MaintenanceCleanup,
    ];

    /// Value stored in `jobs.job_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReminderDispatch => "reminder_dispatch",
            Self::AutomatedNotifications => "automated_notifications",
            Self::SlaBreachCheck => "sla_breach_check",
            Self::MaintenanceCleanup => "maintenance_cleanup",
        }
    }

    /// Queue the job type is routed to.
    pub fn queue(&self) -> &'static str {
        match self {
            Self::ReminderDispatch | Self::AutomatedNotifications => "notifications",
            Self::SlaBreachCheck | Self::MaintenanceCleanup => "maintenance",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = crm_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crm_core::AppError::validation(format!("Unknown job type: '{s}'")))
    }
}
