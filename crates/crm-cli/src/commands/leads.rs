//! Lead assignment CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use crm_core::error::AppError;
use crm_core::types::id::LeadId;
use crm_service::{AssignmentSummary, RequestContext};

/// Arguments for lead commands
#[derive(Debug, Args)]
pub struct LeadsArgs {
    /// Lead subcommand
    #[command(subcommand)]
    pub command: LeadsCommand,
}

/// Lead subcommands
#[derive(Debug, Subcommand)]
pub enum LeadsCommand {
    /// Assign leads round-robin to the least-loaded workers
    Assign {
        /// Lead ids to assign; defaults to every unassigned new lead
        #[arg(long = "lead")]
        leads: Vec<Uuid>,
    },
    /// Rebalance every open assigned lead across workers
    Redistribute,
}

/// Assignment display row
#[derive(Debug, Serialize, Tabled)]
struct AssignmentRow {
    lead_id: String,
    worker_id: String,
}

/// Execute lead commands
pub async fn execute(
    args: &LeadsArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (_, services) = super::build_services(&config).await?;
    let ctx = RequestContext::system();

    let summary = match &args.command {
        LeadsCommand::Assign { leads } => {
            let ids = if leads.is_empty() {
                None
            } else {
                Some(leads.iter().copied().map(LeadId::from_uuid).collect())
            };
            services.assignment.auto_assign_leads(&ctx, ids).await?
        }
        LeadsCommand::Redistribute => services.assignment.redistribute_workload(&ctx).await?,
    };

    print_summary(&summary, format);
    Ok(())
}

fn print_summary(summary: &AssignmentSummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_summary(summary, format),
        OutputFormat::Table => {
            let rows: Vec<AssignmentRow> = summary
                .plan
                .iter()
                .map(|a| AssignmentRow {
                    lead_id: a.lead_id.to_string(),
                    worker_id: a.worker_id.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
            output::print_success(&format!(
                "{} lead(s) assigned across {} worker(s)",
                summary.assigned, summary.workers
            ));
        }
    }
}
