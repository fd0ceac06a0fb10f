//! Task CRUD, lifecycle transitions and SLA policy management.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crm_core::error::AppError;
use crm_database::traits::{LeadStore, SlaPolicyStore, TaskStore};
use crm_entity::task::{
    CreateTask, NewTask, Task, TaskSlaPolicy, TaskType, TaskWithDependencies,
};

use crate::context::RequestContext;

use super::{dependencies, sla};

/// Maximum length of a task title.
const MAX_TITLE_LEN: usize = 255;

/// Manages lead tasks and their SLA.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    sla_policies: Arc<dyn SlaPolicyStore>,
    leads: Arc<dyn LeadStore>,
}

impl std::fmt::Debug for TaskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskService").finish()
    }
}

impl TaskService {
    /// Creates a new task service.
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        sla_policies: Arc<dyn SlaPolicyStore>,
        leads: Arc<dyn LeadStore>,
    ) -> Self {
        Self {
            tasks,
            sla_policies,
            leads,
        }
    }

    /// Creates a task on a lead.
    ///
    /// The SLA is resolved from the policy table (falling back to the
    /// built-in hours per type) and, when no due date is supplied, the due
    /// date becomes `now + sla_hours`.
    pub async fn create_task(
        &self,
        ctx: &RequestContext,
        input: CreateTask,
    ) -> Result<Task, AppError> {
        let title = validate_title(&input.title)?;

        if self.leads.find_by_id(input.lead_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Lead {} not found",
                input.lead_id
            )));
        }

        let deps = dependencies::normalize(&input.dependencies);
        dependencies::validate(self.tasks.as_ref(), None, &deps).await?;

        let sla_hours = self.resolve_sla_hours(input.task_type).await?;
        let due_date = input
            .due_date
            .unwrap_or_else(|| sla::due_date_from_sla(ctx.request_time, sla_hours));

        let task = self
            .tasks
            .create(&NewTask {
                lead_id: input.lead_id,
                task_type: input.task_type,
                title,
                description: input.description,
                due_date,
                assigned_to: input.assigned_to,
                priority: input.priority,
                dependencies: deps,
                sla_hours,
                created_by: ctx.user_id.into_uuid(),
            })
            .await?;

        info!(
            task_id = %task.id,
            lead_id = %task.lead_id,
            task_type = task.task_type.as_str(),
            sla_hours,
            user_id = %ctx.user_id,
            "Task created"
        );
        Ok(task)
    }

    /// Gets a task by ID.
    pub async fn get_task(&self, task_id: Uuid) -> Result<Task, AppError> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))
    }

    /// Marks a task done.
    pub async fn complete_task(&self, ctx: &RequestContext, task_id: Uuid) -> Result<Task, AppError> {
        let task = self.tasks.complete(task_id, Utc::now()).await?;
        info!(task_id = %task_id, user_id = %ctx.user_id, "Task completed");
        Ok(task)
    }

    /// Pushes a task's due date `days` days into the future.
    pub async fn snooze_task(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        days: i64,
    ) -> Result<Task, AppError> {
        let until = sla::snoozed_until(Utc::now(), days)?;
        let task = self.tasks.snooze(task_id, until).await?;
        info!(task_id = %task_id, days, user_id = %ctx.user_id, "Task snoozed");
        Ok(task)
    }

    /// Puts a done or snoozed task back to open.
    pub async fn reopen_task(&self, ctx: &RequestContext, task_id: Uuid) -> Result<Task, AppError> {
        let task = self.tasks.reopen(task_id).await?;
        info!(task_id = %task_id, user_id = %ctx.user_id, "Task reopened");
        Ok(task)
    }

    /// Replaces a task's dependency list.
    pub async fn set_dependencies(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        deps: &[Uuid],
    ) -> Result<Task, AppError> {
        self.get_task(task_id).await?;

        let deps = dependencies::normalize(deps);
        dependencies::validate(self.tasks.as_ref(), Some(task_id), &deps).await?;

        let task = self.tasks.set_dependencies(task_id, &deps).await?;
        info!(
            task_id = %task_id,
            dependencies = deps.len(),
            user_id = %ctx.user_id,
            "Task dependencies updated"
        );
        Ok(task)
    }

    /// Lists every task of a lead with its dependency resolution.
    ///
    /// Dependencies on tasks of other leads are fetched separately so their
    /// status still resolves. Ids that no longer exist resolve to `None`.
    pub async fn list_lead_tasks(
        &self,
        lead_id: Uuid,
    ) -> Result<Vec<TaskWithDependencies>, AppError> {
        let tasks = self.tasks.find_by_lead(lead_id).await.map_err(|e| {
            warn!(lead_id = %lead_id, error = %e, "Failed to load lead tasks");
            e
        })?;

        let local: HashSet<Uuid> = tasks.iter().map(|t| t.id).collect();
        let foreign: Vec<Uuid> = tasks
            .iter()
            .flat_map(|t| t.dependencies.iter().copied())
            .filter(|id| !local.contains(id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let external = if foreign.is_empty() {
            Vec::new()
        } else {
            self.tasks.find_by_ids(&foreign).await?
        };

        Ok(dependencies::resolve_all(tasks, &external))
    }

    /// Lists the SLA policy table.
    pub async fn list_sla_policies(&self) -> Result<Vec<TaskSlaPolicy>, AppError> {
        self.sla_policies.list().await
    }

    /// Sets the default SLA hours of a task type.
    pub async fn update_sla_policy(
        &self,
        ctx: &RequestContext,
        task_type: TaskType,
        hours: i32,
    ) -> Result<TaskSlaPolicy, AppError> {
        if hours < 1 {
            return Err(AppError::validation("SLA hours must be at least 1"));
        }
        let policy = self.sla_policies.upsert(task_type, hours).await?;
        info!(
            task_type = task_type.as_str(),
            hours,
            user_id = %ctx.user_id,
            "SLA policy updated"
        );
        Ok(policy)
    }

    /// SLA hours that a new task of `task_type` would get.
    pub async fn resolve_sla_hours(&self, task_type: TaskType) -> Result<i32, AppError> {
        let policy = self.sla_policies.find(task_type).await?;
        Ok(sla::effective_sla_hours(task_type, policy.as_ref()))
    }

    /// Flags open tasks past their due date. Returns how many were flagged.
    pub async fn mark_sla_breaches(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let flagged = self.tasks.mark_breached(now).await?;
        if flagged > 0 {
            info!(flagged, "SLA breaches flagged");
        }
        Ok(flagged)
    }
}

fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("Task title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "Task title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}
