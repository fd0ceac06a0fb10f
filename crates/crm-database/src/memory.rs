//! In-memory implementation of every store trait.
//!
//! Backs the unit and HTTP integration tests.
//! Mirrors the SQL semantics of the repositories, including the seeded
//! notification rules and SLA policies.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::types::Json;
use uuid::Uuid;

use crm_core::error::AppError;
use crm_core::result::AppResult;
use crm_core::types::id::UserId;
use crm_core::types::pagination::{PageRequest, PageResponse};
use crm_entity::commission::{Commission, CommissionStatus, CreateCommission};
use crm_entity::job::{CreateJob, Job, JobPriority, JobStatus};
use crm_entity::lead::{Assignment, CreateLead, Lead, LeadStatus, PipelineStage, WorkerLoad};
use crm_entity::notification::{
    CreateNotification, DeliveryChannel, DeliveryStatus, NewNotificationLog, Notification,
    NotificationConfig, NotificationLog, NotificationRule, RuleType,
};
use crm_entity::reminder::{CreateReminder, ReminderStatus, ReminderTask, ReminderType};
use crm_entity::task::{NewTask, Task, TaskSlaPolicy, TaskStatus, TaskType};
use crm_entity::user::{CreateUser, User};

use crate::traits::{
    CommissionStore, JobStore, LeadStore, NotificationLogStore, NotificationRuleStore,
    NotificationStore, ReminderStore, SlaPolicyStore, TaskStore, UserStore,
};

/// Rule configuration seeded by the initial migration.
pub fn default_rule_config(rule_type: RuleType) -> NotificationConfig {
    let message = match rule_type {
        RuleType::HighScoreLead => "Lead {name} tiene una puntuación alta",
        RuleType::TaskReminder => "La tarea {name} está vencida",
        RuleType::HighProbNegotiation => "La negociación {name} tiene alta probabilidad de cierre",
    };
    NotificationConfig {
        message: message.to_string(),
        in_app: true,
        email: false,
        threshold: rule_type.default_threshold(),
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    leads: DashMap<Uuid, Lead>,
    users: DashMap<Uuid, User>,
    tasks: DashMap<Uuid, Task>,
    sla_policies: DashMap<TaskType, TaskSlaPolicy>,
    reminders: DashMap<Uuid, ReminderTask>,
    rules: DashMap<RuleType, NotificationRule>,
    logs: DashMap<Uuid, NotificationLog>,
    notifications: DashMap<Uuid, Notification>,
    commissions: DashMap<Uuid, Commission>,
    jobs: DashMap<Uuid, Job>,
    /// Serializes multi-row writes (assignment plans, job claims).
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create a store seeded like a freshly migrated database.
    pub fn new() -> Self {
        let store = Self::empty();
        let now = Utc::now();
        for task_type in TaskType::ALL {
            store.sla_policies.insert(
                task_type,
                TaskSlaPolicy {
                    task_type,
                    default_sla_hours: task_type.fallback_sla_hours(),
                    updated_at: now,
                },
            );
        }
        for rule_type in RuleType::ALL {
            store.rules.insert(
                rule_type,
                NotificationRule {
                    id: Uuid::now_v7(),
                    rule_type,
                    is_active: true,
                    notification_config: Json(default_rule_config(rule_type)),
                    updated_at: now,
                },
            );
        }
        store
    }

    /// Create a store without any seed rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert a fully formed lead (tests use this to set status and owner).
    pub fn insert_lead(&self, lead: Lead) {
        self.leads.insert(lead.id, lead);
    }

    /// Insert a fully formed task.
    pub fn insert_task(&self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn sorted_by<T: Clone, K: Ord>(map: &DashMap<Uuid, T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut items: Vec<T> = map.iter().map(|entry| entry.value().clone()).collect();
    items.sort_by_key(|item| key(item));
    items
}

fn page_of<T: Clone + serde::Serialize>(items: Vec<T>, page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    PageResponse::new(page.slice(&items), page, total)
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn create(&self, data: &CreateLead) -> AppResult<Lead> {
        let now = Utc::now();
        let lead = Lead {
            id: Uuid::now_v7(),
            name: data.name.clone(),
            company: data.company.clone(),
            email: data.email.clone(),
            score: data.score,
            status: LeadStatus::New,
            stage: data.stage,
            probability: data.probability,
            value: data.value,
            assigned_to_id: data.assigned_to_id,
            created_at: now,
            updated_at: now,
        };
        self.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Lead>> {
        Ok(self.leads.get(&id).map(|l| l.value().clone()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = ids
            .iter()
            .filter_map(|id| self.leads.get(id).map(|l| l.value().clone()))
            .collect();
        leads.sort_by_key(|l| (l.created_at, l.id));
        leads.dedup_by_key(|l| l.id);
        Ok(leads)
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Lead>> {
        let mut leads = sorted_by(&self.leads, |l| (l.created_at, l.id));
        leads.reverse();
        Ok(page_of(leads, page))
    }

    async fn list_all(&self) -> AppResult<Vec<Lead>> {
        Ok(sorted_by(&self.leads, |l| (l.created_at, l.id)))
    }

    async fn find_open_with_min_score(&self, min_score: i32) -> AppResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .leads
            .iter()
            .filter(|l| l.is_open() && l.score >= min_score)
            .map(|l| l.value().clone())
            .collect();
        leads.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(leads)
    }

    async fn find_in_stage_with_min_probability(
        &self,
        stage: PipelineStage,
        min_probability: i32,
    ) -> AppResult<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .leads
            .iter()
            .filter(|l| l.stage == stage && l.probability >= min_probability)
            .map(|l| l.value().clone())
            .collect();
        leads.sort_by(|a, b| b.probability.cmp(&a.probability));
        Ok(leads)
    }

    async fn find_unassigned_new(&self) -> AppResult<Vec<Lead>> {
        let leads = sorted_by(&self.leads, |l| (l.created_at, l.id));
        Ok(leads
            .into_iter()
            .filter(|l| l.status == LeadStatus::New && l.assigned_to_id.is_none())
            .collect())
    }

    async fn find_open_assigned(&self) -> AppResult<Vec<Lead>> {
        let leads = sorted_by(&self.leads, |l| (l.created_at, l.id));
        Ok(leads
            .into_iter()
            .filter(|l| l.is_open() && l.assigned_to_id.is_some())
            .collect())
    }

    async fn update_stage(&self, id: Uuid, stage: PipelineStage) -> AppResult<Lead> {
        let mut lead = self
            .leads
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Lead {id} not found")))?;
        lead.stage = stage;
        lead.updated_at = Utc::now();
        Ok(lead.value().clone())
    }

    async fn worker_loads(&self) -> AppResult<Vec<WorkerLoad>> {
        let mut loads: Vec<WorkerLoad> = self
            .users
            .iter()
            .filter(|u| u.is_assignable())
            .map(|u| {
                let open = self
                    .leads
                    .iter()
                    .filter(|l| l.is_open() && l.assigned_to_id == Some(u.id))
                    .count();
                WorkerLoad::new(UserId::from_uuid(u.id), open as u32)
            })
            .collect();
        loads.sort_by_key(|w| w.worker_id);
        Ok(loads)
    }

    async fn apply_assignments(
        &self,
        plan: &[Assignment],
        status: Option<LeadStatus>,
    ) -> AppResult<u64> {
        let _guard = self.lock();

        if let Some(missing) = plan
            .iter()
            .find(|a| !self.leads.contains_key(a.lead_id.as_uuid()))
        {
            return Err(AppError::not_found(format!(
                "Lead {} not found",
                missing.lead_id
            )));
        }

        let now = Utc::now();
        for assignment in plan {
            if let Some(mut lead) = self.leads.get_mut(assignment.lead_id.as_uuid()) {
                lead.assigned_to_id = Some(assignment.worker_id.into_uuid());
                if let Some(status) = status {
                    lead.status = status;
                }
                lead.updated_at = now;
            }
        }
        Ok(plan.len() as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        if self.users.iter().any(|u| u.email == data.email) {
            return Err(AppError::conflict(format!(
                "User with email '{}' already exists",
                data.email
            )));
        }
        let user = User {
            id: Uuid::now_v7(),
            full_name: data.full_name.clone(),
            email: data.email.clone(),
            role: data.role,
            is_active: true,
            accepts_leads: data.accepts_leads,
            created_at: Utc::now(),
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(sorted_by(&self.users, |u| u.full_name.clone()))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, data: &NewTask) -> AppResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::now_v7(),
            lead_id: data.lead_id,
            task_type: data.task_type,
            title: data.title.clone(),
            description: data.description.clone(),
            due_date: data.due_date,
            assigned_to: data.assigned_to,
            priority: data.priority,
            status: TaskStatus::Open,
            dependencies: data.dependencies.clone(),
            sla_hours: data.sla_hours,
            sla_breached: false,
            completed_at: None,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Task>> {
        Ok(self.tasks.get(&id).map(|t| t.value().clone()))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Task>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.tasks.get(id).map(|t| t.value().clone()))
            .collect())
    }

    async fn find_by_lead(&self, lead_id: Uuid) -> AppResult<Vec<Task>> {
        let tasks = sorted_by(&self.tasks, |t| (t.due_date, t.created_at));
        Ok(tasks.into_iter().filter(|t| t.lead_id == lead_id).collect())
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<Task>> {
        let tasks = sorted_by(&self.tasks, |t| t.due_date);
        Ok(tasks.into_iter().filter(|t| t.is_overdue(now)).collect())
    }

    async fn complete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Task> {
        let mut task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))?;
        task.status = TaskStatus::Done;
        task.completed_at = Some(at);
        task.updated_at = Utc::now();
        Ok(task.value().clone())
    }

    async fn snooze(&self, id: Uuid, until: DateTime<Utc>) -> AppResult<Task> {
        let mut task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))?;
        task.status = TaskStatus::Snoozed;
        task.due_date = until;
        task.completed_at = None;
        task.updated_at = Utc::now();
        Ok(task.value().clone())
    }

    async fn reopen(&self, id: Uuid) -> AppResult<Task> {
        let mut task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))?;
        task.status = TaskStatus::Open;
        task.completed_at = None;
        task.updated_at = Utc::now();
        Ok(task.value().clone())
    }

    async fn set_dependencies(&self, id: Uuid, dependencies: &[Uuid]) -> AppResult<Task> {
        let mut task = self
            .tasks
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Task {id} not found")))?;
        task.dependencies = dependencies.to_vec();
        task.updated_at = Utc::now();
        Ok(task.value().clone())
    }

    async fn mark_breached(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut flagged = 0;
        for mut task in self.tasks.iter_mut() {
            if task.is_overdue(now) && !task.sla_breached {
                task.sla_breached = true;
                task.updated_at = now;
                flagged += 1;
            }
        }
        Ok(flagged)
    }
}

#[async_trait]
impl SlaPolicyStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<TaskSlaPolicy>> {
        let mut policies: Vec<TaskSlaPolicy> =
            self.sla_policies.iter().map(|p| p.value().clone()).collect();
        policies.sort_by_key(|p| p.task_type);
        Ok(policies)
    }

    async fn find(&self, task_type: TaskType) -> AppResult<Option<TaskSlaPolicy>> {
        Ok(self.sla_policies.get(&task_type).map(|p| p.value().clone()))
    }

    async fn upsert(&self, task_type: TaskType, hours: i32) -> AppResult<TaskSlaPolicy> {
        let policy = TaskSlaPolicy {
            task_type,
            default_sla_hours: hours,
            updated_at: Utc::now(),
        };
        self.sla_policies.insert(task_type, policy.clone());
        Ok(policy)
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn create(&self, data: &CreateReminder) -> AppResult<ReminderTask> {
        let reminder = ReminderTask {
            id: Uuid::now_v7(),
            entity_id: data.entity_id,
            entity_type: data.entity_type,
            reminder_type: data.reminder_type,
            message: data.message.clone(),
            scheduled_for: data.scheduled_for,
            status: ReminderStatus::Pending,
            read_at: None,
            created_by: data.created_by,
            created_at: Utc::now(),
        };
        self.reminders.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    async fn find_by_entity(&self, entity_id: Uuid) -> AppResult<Vec<ReminderTask>> {
        let mut reminders = sorted_by(&self.reminders, |r| (r.created_at, r.id));
        reminders.reverse();
        Ok(reminders
            .into_iter()
            .filter(|r| r.entity_id == entity_id)
            .collect())
    }

    async fn cancel_pending(
        &self,
        entity_id: Uuid,
        reminder_type: ReminderType,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut cancelled = 0;
        for mut reminder in self.reminders.iter_mut() {
            if reminder.entity_id == entity_id
                && reminder.reminder_type == reminder_type
                && reminder.status == ReminderStatus::Pending
            {
                reminder.status = ReminderStatus::Cancelled;
                reminder.read_at = Some(at);
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<ReminderTask>> {
        let reminders = sorted_by(&self.reminders, |r| (r.scheduled_for, r.id));
        Ok(reminders
            .into_iter()
            .filter(|r| r.is_due(now))
            .take(limit as usize)
            .collect())
    }

    async fn mark_sent(&self, id: Uuid) -> AppResult<bool> {
        match self.reminders.get_mut(&id) {
            Some(mut reminder) if reminder.status == ReminderStatus::Pending => {
                reminder.status = ReminderStatus::Sent;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl NotificationRuleStore for MemoryStore {
    async fn list(&self) -> AppResult<Vec<NotificationRule>> {
        let mut rules: Vec<NotificationRule> =
            self.rules.iter().map(|r| r.value().clone()).collect();
        rules.sort_by_key(|r| r.rule_type.as_str());
        Ok(rules)
    }

    async fn find(&self, rule_type: RuleType) -> AppResult<Option<NotificationRule>> {
        Ok(self.rules.get(&rule_type).map(|r| r.value().clone()))
    }

    async fn set_active(
        &self,
        rule_type: RuleType,
        is_active: bool,
    ) -> AppResult<NotificationRule> {
        let mut rule = self
            .rules
            .get_mut(&rule_type)
            .ok_or_else(|| AppError::not_found(format!("Rule {rule_type} not found")))?;
        rule.is_active = is_active;
        rule.updated_at = Utc::now();
        Ok(rule.value().clone())
    }

    async fn update_config(
        &self,
        rule_type: RuleType,
        config: &NotificationConfig,
    ) -> AppResult<NotificationRule> {
        let mut rule = self
            .rules
            .get_mut(&rule_type)
            .ok_or_else(|| AppError::not_found(format!("Rule {rule_type} not found")))?;
        rule.notification_config = Json(config.clone());
        rule.updated_at = Utc::now();
        Ok(rule.value().clone())
    }
}

#[async_trait]
impl NotificationLogStore for MemoryStore {
    async fn append(&self, entry: &NewNotificationLog) -> AppResult<NotificationLog> {
        let log = NotificationLog {
            id: Uuid::now_v7(),
            rule_type: entry.rule_type,
            entity_id: entry.entity_id,
            recipient_id: entry.recipient_id,
            channel: entry.channel,
            message: entry.message.clone(),
            delivery_status: entry.delivery_status,
            error: entry.error.clone(),
            sent_at: Utc::now(),
        };
        self.logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<NotificationLog>> {
        let mut logs = sorted_by(&self.logs, |l| (l.sent_at, l.id));
        logs.reverse();
        Ok(page_of(logs, page))
    }

    async fn delivered_since(
        &self,
        rule_type: RuleType,
        entity_id: Uuid,
        channel: DeliveryChannel,
        since: DateTime<Utc>,
    ) -> AppResult<bool> {
        Ok(self.logs.iter().any(|l| {
            l.rule_type == rule_type
                && l.entity_id == Some(entity_id)
                && l.channel == channel
                && l.delivery_status == DeliveryStatus::Sent
                && l.sent_at >= since
        }))
    }

    async fn delete_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let before_len = self.logs.len();
        self.logs.retain(|_, l| l.sent_at >= before);
        Ok((before_len - self.logs.len()) as u64)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, data: &CreateNotification) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            category: data.category.clone(),
            title: data.title.clone(),
            message: data.message.clone(),
            entity_type: data.entity_type.clone(),
            entity_id: data.entity_id,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        };
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let mut items: Vec<Notification> = sorted_by(&self.notifications, |n| (n.created_at, n.id))
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect();
        items.reverse();
        Ok(page_of(items, page))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_unread())
            .count() as i64)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        match self.notifications.get_mut(&id) {
            Some(mut n) if n.user_id == user_id => {
                n.is_read = true;
                n.read_at.get_or_insert_with(Utc::now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let now = Utc::now();
        let mut updated = 0;
        for mut n in self.notifications.iter_mut() {
            if n.user_id == user_id && n.is_unread() {
                n.is_read = true;
                n.read_at = Some(now);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_read_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let before_len = self.notifications.len();
        self.notifications
            .retain(|_, n| !(n.is_read && n.created_at < before));
        Ok((before_len - self.notifications.len()) as u64)
    }
}

#[async_trait]
impl CommissionStore for MemoryStore {
    async fn create(&self, data: &CreateCommission) -> AppResult<Commission> {
        let now = Utc::now();
        let commission = Commission {
            id: Uuid::now_v7(),
            lead_id: data.lead_id,
            collaborator_id: data.collaborator_id,
            amount: data.amount,
            status: data.status,
            created_at: now,
            paid_at: (data.status == CommissionStatus::Paid).then_some(now),
        };
        self.commissions.insert(commission.id, commission.clone());
        Ok(commission)
    }

    async fn list_all(&self) -> AppResult<Vec<Commission>> {
        Ok(sorted_by(&self.commissions, |c| (c.created_at, c.id)))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Commission>> {
        let mut items = sorted_by(&self.commissions, |c| (c.created_at, c.id));
        items.reverse();
        Ok(page_of(items, page))
    }
}

fn priority_rank(priority: JobPriority) -> u8 {
    match priority {
        JobPriority::Low => 0,
        JobPriority::Normal => 1,
        JobPriority::High => 2,
        JobPriority::Critical => 3,
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::now_v7(),
            job_type: data.job_type.clone(),
            queue: data.queue.clone(),
            priority: data.priority,
            payload: data.payload.clone(),
            result: None,
            error_message: None,
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: data.max_attempts,
            scheduled_at: data.scheduled_at,
            started_at: None,
            completed_at: None,
            created_by: data.created_by,
            worker_id: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        Ok(self.jobs.get(&id).map(|j| j.value().clone()))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Job>> {
        let mut jobs = sorted_by(&self.jobs, |j| (j.created_at, j.id));
        jobs.reverse();
        Ok(page_of(jobs, page))
    }

    async fn dequeue(&self, queue: &str, worker_id: &str) -> AppResult<Option<Job>> {
        let _guard = self.lock();
        let now = Utc::now();

        let next = self
            .jobs
            .iter()
            .filter(|j| {
                j.queue == queue
                    && j.status == JobStatus::Pending
                    && j.scheduled_at.is_none_or(|at| at <= now)
            })
            .map(|j| {
                (
                    std::cmp::Reverse(priority_rank(j.priority)),
                    j.created_at,
                    j.id,
                )
            })
            .min();

        let Some((_, _, id)) = next else {
            return Ok(None);
        };

        Ok(self.jobs.get_mut(&id).map(|mut job| {
            job.status = JobStatus::Running;
            job.started_at = Some(now);
            job.worker_id = Some(worker_id.to_string());
            job.attempts += 1;
            job.updated_at = now;
            job.value().clone()
        }))
    }

    async fn complete(&self, id: Uuid, result: Option<&serde_json::Value>) -> AppResult<()> {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            let now = Utc::now();
            job.status = JobStatus::Completed;
            job.result = result.cloned();
            job.completed_at = Some(now);
            job.updated_at = now;
        }
        Ok(())
    }

    async fn fail(&self, id: Uuid, error_message: &str) -> AppResult<()> {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            job.status = JobStatus::Failed;
            job.error_message = Some(error_message.to_string());
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn retry(&self, id: Uuid) -> AppResult<()> {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            if job.status == JobStatus::Failed {
                job.status = JobStatus::Pending;
                job.started_at = None;
                job.worker_id = None;
                job.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn cleanup_old(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let before_len = self.jobs.len();
        self.jobs
            .retain(|_, j| !(j.status.is_terminal() && j.updated_at < before));
        Ok((before_len - self.jobs.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::types::id::LeadId;
    use crm_entity::user::UserRole;

    async fn advisor(store: &MemoryStore, email: &str) -> User {
        UserStore::create(
            store,
            &CreateUser {
                full_name: email.to_string(),
                email: email.to_string(),
                role: UserRole::Advisor,
                accepts_leads: true,
            },
        )
        .await
        .unwrap()
    }

    fn lead_input(name: &str) -> CreateLead {
        CreateLead {
            name: name.to_string(),
            company: None,
            email: None,
            score: 50,
            stage: PipelineStage::Lead,
            probability: 10,
            value: 100_000.0,
            assigned_to_id: None,
        }
    }

    #[tokio::test]
    async fn test_seeded_rules_and_policies() {
        let store = MemoryStore::new();
        assert_eq!(NotificationRuleStore::list(&store).await.unwrap().len(), 3);
        let policy = SlaPolicyStore::find(&store, TaskType::Valuation)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(policy.default_sla_hours, 120);
        assert!(SlaPolicyStore::list(&MemoryStore::empty()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_worker_loads_count_only_open_leads() {
        let store = MemoryStore::new();
        let worker = advisor(&store, "ana@example.com").await;

        let open = LeadStore::create(&store, &lead_input("open")).await.unwrap();
        let mut converted = LeadStore::create(&store, &lead_input("won")).await.unwrap();
        converted.status = LeadStatus::Converted;
        converted.assigned_to_id = Some(worker.id);
        store.insert_lead(converted);

        let plan = [Assignment {
            lead_id: LeadId::from_uuid(open.id),
            worker_id: UserId::from_uuid(worker.id),
        }];
        store
            .apply_assignments(&plan, Some(LeadStatus::Contacted))
            .await
            .unwrap();

        let loads = store.worker_loads().await.unwrap();
        assert_eq!(loads, vec![WorkerLoad::new(UserId::from_uuid(worker.id), 1)]);
    }

    #[tokio::test]
    async fn test_apply_assignments_is_all_or_nothing() {
        let store = MemoryStore::new();
        let worker = advisor(&store, "ben@example.com").await;
        let lead = LeadStore::create(&store, &lead_input("a")).await.unwrap();

        let plan = [
            Assignment {
                lead_id: LeadId::from_uuid(lead.id),
                worker_id: UserId::from_uuid(worker.id),
            },
            Assignment {
                lead_id: LeadId::new(),
                worker_id: UserId::from_uuid(worker.id),
            },
        ];
        assert!(store.apply_assignments(&plan, None).await.is_err());

        let unchanged = LeadStore::find_by_id(&store, lead.id).await.unwrap().unwrap();
        assert!(unchanged.assigned_to_id.is_none());
    }

    fn job(job_type: &str, priority: JobPriority) -> CreateJob {
        CreateJob {
            job_type: job_type.into(),
            queue: "maintenance".into(),
            priority,
            payload: serde_json::json!({}),
            max_attempts: 3,
            scheduled_at: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_dequeue_prefers_priority() {
        let store = MemoryStore::new();
        let low = JobStore::create(&store, &job("maintenance_cleanup", JobPriority::Low))
            .await
            .unwrap();
        let high = JobStore::create(&store, &job("sla_breach_check", JobPriority::High))
            .await
            .unwrap();

        let first = store.dequeue("maintenance", "w1").await.unwrap().unwrap();
        assert_eq!(first.id, high.id);
        assert_eq!(first.attempts, 1);
        let second = store.dequeue("maintenance", "w1").await.unwrap().unwrap();
        assert_eq!(second.id, low.id);
        assert!(store.dequeue("maintenance", "w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_pending_is_idempotent() {
        let store = MemoryStore::new();
        let entity = Uuid::new_v4();
        ReminderStore::create(
            &store,
            &CreateReminder {
                entity_id: entity,
                entity_type: Default::default(),
                reminder_type: ReminderType::NdaFollowUp,
                message: "m".into(),
                scheduled_for: Utc::now(),
                created_by: None,
            },
        )
        .await
        .unwrap();

        let now = Utc::now();
        assert_eq!(
            store.cancel_pending(entity, ReminderType::NdaFollowUp, now).await.unwrap(),
            1
        );
        assert_eq!(
            store.cancel_pending(entity, ReminderType::NdaFollowUp, now).await.unwrap(),
            0
        );
    }
}
