//! Issue bearer tokens for API access.

use clap::Args;
use uuid::Uuid;

use crate::output;
use crm_auth::JwtEncoder;
use crm_core::error::AppError;

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// User the token is issued for
    #[arg(long)]
    pub user_id: Uuid,
}

/// Execute the token command
pub async fn execute(args: &TokenArgs, config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let (_, services) = super::build_services(&config).await?;

    let user = services.users.get_user(args.user_id).await?;
    if !user.is_active {
        return Err(AppError::forbidden(format!("User {} is inactive", user.id)));
    }

    let encoder = JwtEncoder::new(&config.auth);
    let (token, expires_at) = encoder.generate_access_token(user.id, user.role, &user.full_name)?;

    println!("{}", token);
    output::print_kv("User", &user.full_name);
    output::print_kv("Role", &user.role.to_string());
    output::print_kv("Expires", &expires_at.to_rfc3339());
    Ok(())
}
