//! Store traits consumed by the service layer.
//!
//! Every table is reached through one of these traits so services can be
//! wired against PostgreSQL in production and against
//! [`MemoryStore`](crate::memory::MemoryStore) in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crm_core::result::AppResult;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_entity::commission::{Commission, CreateCommission};
use crm_entity::job::{CreateJob, Job};
use crm_entity::lead::{Assignment, CreateLead, Lead, LeadStatus, PipelineStage, WorkerLoad};
use crm_entity::notification::{
    CreateNotification, DeliveryChannel, NewNotificationLog, Notification, NotificationConfig, NotificationLog,
    NotificationRule, RuleType,
};
use crm_entity::reminder::{CreateReminder, ReminderTask, ReminderType};
use crm_entity::task::{NewTask, Task, TaskSlaPolicy, TaskType};
use crm_entity::user::{CreateUser, User};

/// Leads and the assignment workload derived from them.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn create(&self, data: &CreateLead) -> AppResult<Lead>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Lead>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Lead>>;

    /// Page through leads, newest first.
    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Lead>>;

    /// Every lead, used by the pipeline metrics.
    async fn list_all(&self) -> AppResult<Vec<Lead>>;

    /// Open leads with `score >= min_score`.
    async fn find_open_with_min_score(&self, min_score: i32) -> AppResult<Vec<Lead>>;

    /// Leads in `stage` with `probability >= min_probability`.
    async fn find_in_stage_with_min_probability(
        &self,
        stage: PipelineStage,
        min_probability: i32,
    ) -> AppResult<Vec<Lead>>;

    /// `NEW` leads without an owner, oldest first.
    async fn find_unassigned_new(&self) -> AppResult<Vec<Lead>>;

    /// Open leads that have an owner, oldest first.
    async fn find_open_assigned(&self) -> AppResult<Vec<Lead>>;

    /// Persist a new stage. Fails with not-found for unknown leads.
    async fn update_stage(&self, id: Uuid, stage: PipelineStage) -> AppResult<Lead>;

    /// Every assignable user with their current open-lead count.
    async fn worker_loads(&self) -> AppResult<Vec<WorkerLoad>>;

    /// Apply a whole assignment plan atomically, optionally setting a
    /// status on every touched lead. Returns the number of leads updated.
    async fn apply_assignments(
        &self,
        plan: &[Assignment],
        status: Option<LeadStatus>,
    ) -> AppResult<u64>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_all(&self) -> AppResult<Vec<User>>;
}

/// Lead tasks. Tasks are never deleted.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, data: &NewTask) -> AppResult<Task>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Task>>;

    /// Tasks whose id is in `ids`; unknown ids are silently absent.
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Task>>;

    /// Tasks of a lead ordered by due date.
    async fn find_by_lead(&self, lead_id: Uuid) -> AppResult<Vec<Task>>;

    /// Open tasks with `due_date < now`.
    async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Task>>;

    /// `status = done`, `completed_at = at`.
    async fn complete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Task>;

    /// `status = snoozed`, `due_date = until`, `completed_at = null`.
    async fn snooze(&self, id: Uuid, until: DateTime<Utc>) -> AppResult<Task>;

    /// `status = open`, `completed_at = null`.
    async fn reopen(&self, id: Uuid) -> AppResult<Task>;

    async fn set_dependencies(&self, id: Uuid, dependencies: &[Uuid]) -> AppResult<Task>;

    /// Flag open tasks past their due date. Returns the number flagged.
    async fn mark_breached(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
pub trait SlaPolicyStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<TaskSlaPolicy>>;

    async fn find(&self, task_type: TaskType) -> AppResult<Option<TaskSlaPolicy>>;

    async fn upsert(&self, task_type: TaskType, hours: i32) -> AppResult<TaskSlaPolicy>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn create(&self, data: &CreateReminder) -> AppResult<ReminderTask>;

    /// Reminders of an entity, newest first.
    async fn find_by_entity(&self, entity_id: Uuid) -> AppResult<Vec<ReminderTask>>;

    /// Cancel every pending reminder of the given type. Returns the count.
    async fn cancel_pending(
        &self,
        entity_id: Uuid,
        reminder_type: ReminderType,
        at: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Pending reminders with `scheduled_for <= now`, oldest first.
    async fn find_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<ReminderTask>>;

    /// Move a pending reminder to `sent`. Returns false when the reminder
    /// was no longer pending (cancelled, or claimed by another dispatcher).
    async fn mark_sent(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait NotificationRuleStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<NotificationRule>>;

    async fn find(&self, rule_type: RuleType) -> AppResult<Option<NotificationRule>>;

    async fn set_active(&self, rule_type: RuleType, is_active: bool)
    -> AppResult<NotificationRule>;

    async fn update_config(
        &self,
        rule_type: RuleType,
        config: &NotificationConfig,
    ) -> AppResult<NotificationRule>;
}

/// Append-only delivery log of the rule engine.
#[async_trait]
pub trait NotificationLogStore: Send + Sync {
    async fn append(&self, entry: &NewNotificationLog) -> AppResult<NotificationLog>;

    /// Page through the log, newest first.
    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<NotificationLog>>;

    /// Whether a `sent` delivery exists for the rule, entity and channel
    /// since `since`.
    async fn delivered_since(
        &self,
        rule_type: RuleType,
        entity_id: Uuid,
        channel: DeliveryChannel,
        since: DateTime<Utc>,
    ) -> AppResult<bool>;

    async fn delete_before(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Per-user in-app inbox.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, data: &CreateNotification) -> AppResult<Notification>;

    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;

    /// Returns false when the notification does not belong to the user.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool>;

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    async fn delete_read_before(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
pub trait CommissionStore: Send + Sync {
    async fn create(&self, data: &CreateCommission) -> AppResult<Commission>;

    async fn list_all(&self) -> AppResult<Vec<Commission>>;

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Commission>>;
}

/// Background job queue.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, data: &CreateJob) -> AppResult<Job>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>>;

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Job>>;

    /// Claim the next runnable job of a queue.
    async fn dequeue(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>>;

    async fn complete(&self, id: Uuid, result: Option<&serde_json::Value>) -> AppResult<()>;

    async fn fail(&self, id: Uuid, error_message: &str) -> AppResult<()>;

    /// Put a failed job back to pending.
    async fn retry(&self, id: Uuid) -> AppResult<()>;

    /// Delete finished jobs last updated before `before`.
    async fn cleanup_old(&self, before: DateTime<Utc>) -> AppResult<u64>;
}
