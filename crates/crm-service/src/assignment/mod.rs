//! Lead assignment balancer.
//!
//! [`planner`] holds the pure planning functions; [`service`] loads the
//! inputs and applies a plan in one transaction.

pub mod planner;
pub mod service;

pub use planner::{plan_auto_assignment, plan_redistribution};
pub use service::{AssignmentService, AssignmentSummary};
