//! SLA and due-date arithmetic.

use chrono::{DateTime, Duration, Utc};

use crm_core::error::AppError;
use crm_core::result::AppResult;
use crm_entity::task::{TaskSlaPolicy, TaskType};

/// SLA hours for a task type: the policy row when present, else the
/// built-in fallback.
pub fn effective_sla_hours(task_type: TaskType, policy: Option<&TaskSlaPolicy>) -> i32 {
    policy
        .map(|p| p.default_sla_hours)
        .unwrap_or_else(|| task_type.fallback_sla_hours())
}

/// Due date for a task created at `now` with no explicit due date.
pub fn due_date_from_sla(now: DateTime<Utc>, sla_hours: i32) -> DateTime<Utc> {
    now + Duration::hours(i64::from(sla_hours))
}

/// New due date of a task snoozed for `days` days.
pub fn snoozed_until(now: DateTime<Utc>, days: i64) -> AppResult<DateTime<Utc>> {
    if days < 1 {
        return Err(AppError::validation("Snooze must be at least one day"));
    }
    Duration::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| AppError::validation(format!("Snooze of {days} days is out of range")))
}
