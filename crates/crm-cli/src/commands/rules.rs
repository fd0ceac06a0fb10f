//! Notification rule CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use crm_core::error::AppError;
use crm_entity::notification::{NotificationRule, RuleType};
use crm_service::RequestContext;

/// Arguments for rule commands
#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Rule subcommand
    #[command(subcommand)]
    pub command: RulesCommand,
}

/// Rule subcommands
#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List the automated notification rules
    List,
    /// Enable or disable a rule
    Toggle {
        /// Rule type, e.g. `high_score_lead`
        rule_type: String,
        /// Disable the rule instead of enabling it
        #[arg(long)]
        off: bool,
    },
    /// Evaluate every active rule now
    Trigger,
}

/// Rule display row
#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    rule_type: String,
    active: bool,
    threshold: String,
    in_app: bool,
    email: bool,
    message: String,
}

impl From<&NotificationRule> for RuleRow {
    fn from(rule: &NotificationRule) -> Self {
        Self {
            rule_type: rule.rule_type.to_string(),
            active: rule.is_active,
            threshold: rule.threshold().map(|t| t.to_string()).unwrap_or_default(),
            in_app: rule.notification_config.in_app,
            email: rule.notification_config.email,
            message: rule.notification_config.message.clone(),
        }
    }
}

/// Execute rule commands
pub async fn execute(
    args: &RulesArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (_, services) = super::build_services(&config).await?;

    match &args.command {
        RulesCommand::List => {
            let rules = services.rules.list_rules().await?;
            let rows: Vec<RuleRow> = rules.iter().map(RuleRow::from).collect();
            output::print_list(&rows, format);
        }
        RulesCommand::Toggle { rule_type, off } => {
            let rule_type: RuleType = rule_type.parse()?;
            let rule = services
                .rules
                .toggle_rule(&RequestContext::system(), rule_type, !off)
                .await?;
            let state = if rule.is_active { "enabled" } else { "disabled" };
            output::print_success(&format!("Rule '{}' {}", rule.rule_type, state));
        }
        RulesCommand::Trigger => {
            let summary = services.rules.trigger_automated_notifications().await?;
            output::print_summary(&summary, format);
        }
    }

    Ok(())
}
