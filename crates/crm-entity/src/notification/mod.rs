//! Notification domain entities: automated rules, their delivery log and
//! the per-user in-app inbox.

pub mod log;
pub mod model;
pub mod rule;

pub use log::{DeliveryChannel, DeliveryStatus, NewNotificationLog, NotificationLog};
pub use model::{CreateNotification, Notification};
pub use rule::{NotificationConfig, NotificationRule, RuleType};
