//! Deal-flow CRM server.
//!
//! Loads configuration, prepares the database and hands over to the API
//! crate, which also runs the background worker and cron scheduler.

use tracing_subscriber::{EnvFilter, fmt};

use crm_core::config::AppConfig;
use crm_core::error::AppError;
use crm_database::DatabasePool;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment.
///
/// `CRM_ENV` overlays are applied inside [`AppConfig::load`].
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("CRM_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting deal-flow CRM v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    crm_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Server, worker and scheduler ─────────────────────
    crm_api::run_server(config, db.pool().clone()).await?;

    db.close().await;
    tracing::info!("Deal-flow CRM shut down gracefully");
    Ok(())
}
