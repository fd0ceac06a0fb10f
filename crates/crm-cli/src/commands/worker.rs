//! Worker management CLI commands.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::watch;

use crate::output::{self, OutputFormat};
use crm_core::error::AppError;
use crm_core::types::pagination::PageRequest;
use crm_entity::job::{CreateJob, Job, JobKind, JobPriority};
use crm_worker::{Background, JobQueue};

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker subcommand
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Run the worker pool and cron scheduler until Ctrl+C
    Run,
    /// Show recent jobs
    Status {
        /// Number of jobs to show
        #[arg(short, long, default_value = "20")]
        limit: u64,
    },
    /// Enqueue a job of the given type
    Trigger {
        /// Job type, e.g. `reminder_dispatch`
        job_type: String,
    },
}

/// Job display row for table output
#[derive(Debug, Serialize, Tabled)]
struct JobRow {
    id: String,
    job_type: String,
    status: String,
    attempts: String,
    error: String,
    updated_at: String,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            job_type: job.job_type.clone(),
            status: job.status.to_string(),
            attempts: format!("{}/{}", job.attempts, job.max_attempts),
            error: job.error_message.clone().unwrap_or_default(),
            updated_at: job.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute worker commands
pub async fn execute(
    args: &WorkerArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (stores, services) = super::build_services(&config).await?;

    match &args.command {
        WorkerCommand::Run => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let background =
                Background::start(&config, Arc::clone(&stores.jobs), &services, shutdown_rx)
                    .await?;
            println!("Worker running, press Ctrl+C to stop.");

            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
            let _ = shutdown_tx.send(true);
            background
                .stop(Duration::from_secs(config.server.shutdown_grace_seconds))
                .await;
            output::print_success("Worker stopped.");
        }
        WorkerCommand::Status { limit } => {
            let queue = JobQueue::new(Arc::clone(&stores.jobs), "cli");
            let page = queue.list(&PageRequest::new(1, *limit)).await?;
            let rows: Vec<JobRow> = page.items.iter().map(JobRow::from).collect();
            output::print_list(&rows, format);
            output::print_kv("Total", &page.total_items.to_string());
            output::print_kv("Worker Enabled", &config.worker.enabled.to_string());
            output::print_kv("Concurrency", &config.worker.concurrency.to_string());
        }
        WorkerCommand::Trigger { job_type } => {
            let kind: JobKind = job_type.parse()?;
            let queue = JobQueue::new(Arc::clone(&stores.jobs), "cli");
            let job = queue
                .enqueue(&CreateJob::for_kind(kind, JobPriority::High))
                .await?;
            output::print_success(&format!("Job '{}' enqueued (id: {})", kind, job.id));
        }
    }

    Ok(())
}
