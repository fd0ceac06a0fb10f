//! Built-in job handler implementations.

pub mod cleanup;
pub mod notification;
pub mod reminder;
pub mod sla;

use std::sync::Arc;

use crm_service::{MaintenanceService, NotificationRuleService, ReminderService, TaskService};

use crate::executor::JobExecutor;

pub use cleanup::MaintenanceCleanupHandler;
pub use notification::AutomatedNotificationsHandler;
pub use reminder::ReminderDispatchHandler;
pub use sla::SlaBreachCheckHandler;

/// Build an executor with a handler for every periodic job kind.
pub fn default_executor(
    reminders: Arc<ReminderService>,
    rules: Arc<NotificationRuleService>,
    tasks: Arc<TaskService>,
    maintenance: Arc<MaintenanceService>,
) -> JobExecutor {
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ReminderDispatchHandler::new(reminders)));
    executor.register(Arc::new(AutomatedNotificationsHandler::new(rules)));
    executor.register(Arc::new(SlaBreachCheckHandler::new(tasks)));
    executor.register(Arc::new(MaintenanceCleanupHandler::new(maintenance)));
    executor
}
