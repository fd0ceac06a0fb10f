//! Wiring of every service from a store bundle and configuration.

use std::sync::Arc;

use crm_core::config::AppConfig;
use crm_core::traits::storage::StorageProvider;
use crm_database::Stores;

use crate::assignment::AssignmentService;
use crate::lead::{CommissionService, LeadService, UserService};
use crate::maintenance::MaintenanceService;
use crate::metrics::MetricsService;
use crate::notification::{EmailSender, NotificationRuleService, NotificationService};
use crate::reminder::ReminderService;
use crate::task::TaskService;
use crate::teaser::TeaserService;

/// Every application service, shared by the HTTP layer, the worker and
/// the CLI.
#[derive(Debug, Clone)]
pub struct Services {
    pub leads: Arc<LeadService>,
    pub users: Arc<UserService>,
    pub commissions: Arc<CommissionService>,
    pub tasks: Arc<TaskService>,
    pub reminders: Arc<ReminderService>,
    pub rules: Arc<NotificationRuleService>,
    pub notifications: Arc<NotificationService>,
    pub assignment: Arc<AssignmentService>,
    pub metrics: Arc<MetricsService>,
    pub teasers: Arc<TeaserService>,
    pub maintenance: Arc<MaintenanceService>,
}

impl Services {
    pub fn new(
        config: &AppConfig,
        stores: &Stores,
        storage: Arc<dyn StorageProvider>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        let notifications = &config.notifications;
        let reminders = Arc::new(ReminderService::new(
            stores.reminders.clone(),
            stores.leads.clone(),
            stores.notifications.clone(),
        ));

        Self {
            leads: Arc::new(LeadService::new(stores.leads.clone(), reminders.clone())),
            users: Arc::new(UserService::new(stores.users.clone())),
            commissions: Arc::new(CommissionService::new(
                stores.commissions.clone(),
                stores.leads.clone(),
            )),
            tasks: Arc::new(TaskService::new(
                stores.tasks.clone(),
                stores.sla_policies.clone(),
                stores.leads.clone(),
            )),
            reminders,
            rules: Arc::new(NotificationRuleService::new(
                stores.rules.clone(),
                stores.logs.clone(),
                stores.leads.clone(),
                stores.tasks.clone(),
                stores.users.clone(),
                stores.notifications.clone(),
                email,
                notifications.dedup_window_hours,
            )),
            notifications: Arc::new(NotificationService::new(stores.notifications.clone())),
            assignment: Arc::new(AssignmentService::new(stores.leads.clone())),
            metrics: Arc::new(MetricsService::new(
                stores.leads.clone(),
                stores.commissions.clone(),
            )),
            teasers: Arc::new(TeaserService::new(
                storage,
                stores.leads.clone(),
                config.storage.teaser_bucket.clone(),
                config.storage.max_teaser_bytes,
            )),
            maintenance: Arc::new(MaintenanceService::new(
                stores.notifications.clone(),
                stores.logs.clone(),
                stores.jobs.clone(),
                notifications.retention_days,
            )),
        }
    }
}
