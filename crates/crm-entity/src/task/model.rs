//! Task entity model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::types::{TaskPriority, TaskStatus, TaskType};

/// A unit of work attached to a lead.
///
/// `completed_at` is set exactly when `status` is [`TaskStatus::Done`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    /// Lead the task belongs to.
    pub lead_id: Uuid,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Option<Uuid>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Tasks that must be done before this one can start. May reference
    /// tasks of other leads.
    pub dependencies: Vec<Uuid>,
    /// SLA hours resolved at creation time.
    pub sla_hours: i32,
    /// Set by the breach check once an open task passes its due date.
    pub sla_breached: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task is open and past its due date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Open && self.due_date < now
    }
}

/// Data required to create a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub lead_id: Uuid,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    /// Explicit due date; computed from the SLA when absent.
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
}

/// Fully resolved insert for the task store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub lead_id: Uuid,
    pub task_type: TaskType,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Option<Uuid>,
    pub priority: TaskPriority,
    pub dependencies: Vec<Uuid>,
    pub sla_hours: i32,
    pub created_by: Uuid,
}

/// A task augmented with its dependency resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWithDependencies {
    #[serde(flatten)]
    pub task: Task,
    /// True iff every dependency resolves to a done task.
    pub can_start: bool,
    /// Status of each dependency, `None` when the id no longer resolves.
    pub dependency_status: BTreeMap<Uuid, Option<TaskStatus>>,
}

impl TaskWithDependencies {
    /// Resolve `task`'s dependencies against a lookup of known statuses.
    pub fn resolve(task: Task, statuses: &BTreeMap<Uuid, TaskStatus>) -> Self {
        let dependency_status: BTreeMap<Uuid, Option<TaskStatus>> = task
            .dependencies
            .iter()
            .map(|dep| (*dep, statuses.get(dep).copied()))
            .collect();
        let can_start = dependency_status
            .values()
            .all(|status| *status == Some(TaskStatus::Done));

        Self {
            task,
            can_start,
            dependency_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(dependencies: Vec<Uuid>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            lead_id: Uuid::new_v4(),
            task_type: TaskType::Call,
            title: "Call the founder".into(),
            description: None,
            due_date: now,
            assigned_to: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Open,
            dependencies,
            sla_hours: 24,
            sla_breached: false,
            completed_at: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_no_dependencies_can_start() {
        let resolved = TaskWithDependencies::resolve(task(vec![]), &BTreeMap::new());
        assert!(resolved.can_start);
        assert!(resolved.dependency_status.is_empty());
    }

    #[test]
    fn test_missing_dependency_blocks_start() {
        let done = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let statuses = BTreeMap::from([(done, TaskStatus::Done)]);

        let resolved = TaskWithDependencies::resolve(task(vec![done, missing]), &statuses);

        assert!(!resolved.can_start);
        assert_eq!(resolved.dependency_status[&done], Some(TaskStatus::Done));
        assert_eq!(resolved.dependency_status[&missing], None);
    }

    #[test]
    fn test_snoozed_dependency_blocks_start() {
        let dep = Uuid::new_v4();
        let statuses = BTreeMap::from([(dep, TaskStatus::Snoozed)]);
        assert!(!TaskWithDependencies::resolve(task(vec![dep]), &statuses).can_start);
    }

    #[test]
    fn test_flattened_serialization() {
        let resolved = TaskWithDependencies::resolve(task(vec![]), &BTreeMap::new());
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["task_type"], "call");
        assert_eq!(json["can_start"], true);
    }
}
