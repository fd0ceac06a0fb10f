//! Lead task engine: task repository, SLA calculator and dependency
//! resolution.

pub mod dependencies;
pub mod service;
pub mod sla;

pub use service::TaskService;
