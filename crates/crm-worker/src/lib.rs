//! Background job processing and scheduled tasks for the CRM.
//!
//! This crate provides:
//! - A DB-backed job queue
//! - A worker runner that polls queues and executes jobs on a bounded pool
//! - A job executor that dispatches on `job_type`
//! - A cron scheduler that enqueues the periodic jobs
//! - Handlers for reminder dispatch, automated notifications, SLA breach
//!   checks and maintenance cleanup

pub mod background;
pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use background::Background;
pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use jobs::default_executor;
pub use queue::JobQueue;
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
