//! HTTP request handlers, one module per resource.

pub mod assignment;
pub mod commission;
pub mod health;
pub mod job;
pub mod lead;
pub mod metrics;
pub mod notification;
pub mod rule;
pub mod task;
pub mod teaser;
pub mod user;
