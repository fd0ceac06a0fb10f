//! Stage-change reminder entities.

pub mod model;
pub mod types;

pub use model::{CreateReminder, ReminderTask};
pub use types::{EntityType, ReminderStatus, ReminderType};
