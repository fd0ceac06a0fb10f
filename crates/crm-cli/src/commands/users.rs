//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use crm_core::error::AppError;
use crm_entity::user::{CreateUser, User, UserRole};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UsersArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UsersCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List all users
    List,
    /// Create a user
    Create {
        /// Full name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Role: admin, manager or advisor
        #[arg(long, default_value = "advisor")]
        role: String,
        /// Exclude the user from lead assignment
        #[arg(long)]
        no_leads: bool,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    active: bool,
    accepts_leads: bool,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.full_name.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            active: u.is_active,
            accepts_leads: u.accepts_leads,
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UsersArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (_, services) = super::build_services(&config).await?;

    match &args.command {
        UsersCommand::List => {
            let users = services.users.list_users().await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
        }
        UsersCommand::Create {
            name,
            email,
            role,
            no_leads,
        } => {
            let role: UserRole = role.parse()?;
            let user = services
                .users
                .create_user(CreateUser {
                    full_name: name.clone(),
                    email: email.clone(),
                    role,
                    accepts_leads: !no_leads,
                })
                .await?;
            output::print_success(&format!("User '{}' created (id: {})", user.full_name, user.id));
        }
    }

    Ok(())
}
