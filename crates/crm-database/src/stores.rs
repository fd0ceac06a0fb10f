//! Bundle of every store handle, wired either to PostgreSQL or to memory.

use std::sync::Arc;

use sqlx::PgPool;

use crate::memory::MemoryStore;
use crate::repositories::{
    CommissionRepository, JobRepository, LeadRepository, NotificationLogRepository,
    NotificationRepository, NotificationRuleRepository, ReminderRepository, SlaPolicyRepository,
    TaskRepository, UserRepository,
};
use crate::traits::{
    CommissionStore, JobStore, LeadStore, NotificationLogStore, NotificationRuleStore,
    NotificationStore, ReminderStore, SlaPolicyStore, TaskStore, UserStore,
};

/// Shared store handles passed to service constructors.
#[derive(Clone)]
pub struct Stores {
    pub leads: Arc<dyn LeadStore>,
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub sla_policies: Arc<dyn SlaPolicyStore>,
    pub reminders: Arc<dyn ReminderStore>,
    pub rules: Arc<dyn NotificationRuleStore>,
    pub logs: Arc<dyn NotificationLogStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub commissions: Arc<dyn CommissionStore>,
    pub jobs: Arc<dyn JobStore>,
}

impl Stores {
    /// Wire every store to the given PostgreSQL pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            leads: Arc::new(LeadRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            tasks: Arc::new(TaskRepository::new(pool.clone())),
            sla_policies: Arc::new(SlaPolicyRepository::new(pool.clone())),
            reminders: Arc::new(ReminderRepository::new(pool.clone())),
            rules: Arc::new(NotificationRuleRepository::new(pool.clone())),
            logs: Arc::new(NotificationLogRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool.clone())),
            commissions: Arc::new(CommissionRepository::new(pool.clone())),
            jobs: Arc::new(JobRepository::new(pool)),
        }
    }

    /// Wire every store to one shared in-memory store.
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            leads: store.clone(),
            users: store.clone(),
            tasks: store.clone(),
            sla_policies: store.clone(),
            reminders: store.clone(),
            rules: store.clone(),
            logs: store.clone(),
            notifications: store.clone(),
            commissions: store.clone(),
            jobs: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
