//! Cron schedules for periodic jobs.
//!
//! Expressions use the six-field format (`sec min hour dom mon dow`)
//! understood by `tokio-cron-scheduler`.

use serde::{Deserialize, Serialize};

/// Cron expressions for every periodic job the worker enqueues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether periodic jobs are scheduled at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Fire due stage reminders.
    #[serde(default = "default_reminder_dispatch")]
    pub reminder_dispatch: String,
    /// Evaluate automated notification rules.
    #[serde(default = "default_automated_notifications")]
    pub automated_notifications: String,
    /// Flag open tasks past their SLA deadline.
    #[serde(default = "default_sla_breach_check")]
    pub sla_breach_check: String,
    /// Purge old jobs and read notifications.
    #[serde(default = "default_maintenance_cleanup")]
    pub maintenance_cleanup: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_dispatch: default_reminder_dispatch(),
            automated_notifications: default_automated_notifications(),
            sla_breach_check: default_sla_breach_check(),
            maintenance_cleanup: default_maintenance_cleanup(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_reminder_dispatch() -> String {
    "0 */5 * * * *".to_string()
}

fn default_automated_notifications() -> String {
    "0 0 * * * *".to_string()
}

fn default_sla_breach_check() -> String {
    "0 */15 * * * *".to_string()
}

fn default_maintenance_cleanup() -> String {
    "0 0 3 * * *".to_string()
}
