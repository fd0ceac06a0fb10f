//! PostgreSQL implementations of the store traits.

pub mod commission;
pub mod job;
pub mod lead;
pub mod notification;
pub mod notification_log;
pub mod notification_rule;
pub mod reminder;
pub mod sla_policy;
pub mod task;
pub mod user;

pub use commission::CommissionRepository;
pub use job::JobRepository;
pub use lead::LeadRepository;
pub use notification::NotificationRepository;
pub use notification_log::NotificationLogRepository;
pub use notification_rule::NotificationRuleRepository;
pub use reminder::ReminderRepository;
pub use sla_policy::SlaPolicyRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
