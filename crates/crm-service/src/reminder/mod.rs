//! Stage-change reminders: scheduling, cancellation and dispatch.

pub mod rules;
pub mod service;

pub use rules::{ReminderRule, rule_for_stage};
pub use service::{DispatchSummary, ReminderService};
