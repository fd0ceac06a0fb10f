//! CLI command definitions and dispatch.

pub mod leads;
pub mod migrate;
pub mod rules;
pub mod serve;
pub mod token;
pub mod users;
pub mod worker;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use crm_core::config::AppConfig;
use crm_core::error::AppError;
use crm_database::{DatabasePool, Stores};
use crm_service::{Services, sender_from_config};
use crm_storage::LocalStorageProvider;

/// Deal-flow CRM: lead tasks, reminders, notification rules and assignment
#[derive(Debug, Parser)]
#[command(name = "crm", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server with the background worker
    Serve(serve::ServeArgs),
    /// Apply pending database migrations
    Migrate,
    /// Background worker and job queue
    Worker(worker::WorkerArgs),
    /// Lead assignment
    Leads(leads::LeadsArgs),
    /// Automated notification rules
    Rules(rules::RulesArgs),
    /// User management
    Users(users::UsersArgs),
    /// Issue an access token for a user
    Token(token::TokenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Worker(args) => worker::execute(args, &self.config, self.format).await,
            Commands::Leads(args) => leads::execute(args, &self.config, self.format).await,
            Commands::Rules(args) => rules::execute(args, &self.config, self.format).await,
            Commands::Users(args) => users::execute(args, &self.config, self.format).await,
            Commands::Token(args) => token::execute(args, &self.config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<sqlx::PgPool, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(pool.pool().clone())
}

/// Helper: wire the service layer against PostgreSQL.
pub async fn build_services(config: &AppConfig) -> Result<(Stores, Services), AppError> {
    let pool = create_db_pool(config).await?;
    let stores = Stores::postgres(pool);
    let storage = Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);
    let email = sender_from_config(&config.notifications)?;
    let services = Services::new(config, &stores, storage, email);
    Ok((stores, services))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_leads_assign() {
        let cli = Cli::try_parse_from(["crm", "leads", "assign"]).unwrap();
        assert!(matches!(cli.command, Commands::Leads(_)));
        assert_eq!(cli.config, "config/default.toml");
    }

    #[test]
    fn test_parses_rules_toggle() {
        let cli = Cli::try_parse_from([
            "crm",
            "--format",
            "json",
            "rules",
            "toggle",
            "high_score_lead",
            "--off",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Rules(_)));
    }

    #[test]
    fn test_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["crm", "upload"]).is_err());
    }
}
