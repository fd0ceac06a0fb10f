//! Application builder: wires router, middleware and state into an Axum app.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::PgPool;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crm_core::config::AppConfig;
use crm_core::error::AppError;
use crm_database::Stores;
use crm_service::sender_from_config;
use crm_storage::LocalStorageProvider;
use crm_worker::Background;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    build_router(state)
        .layer(axum::middleware::from_fn(request_logging))
        .layer(build_compression_layer())
        .layer(cors)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}

/// Runs the CRM server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    tracing::info!("Starting CRM server...");

    // ── Step 1: Stores ───────────────────────────────────────────
    let stores = Stores::postgres(db_pool);

    // ── Step 2: Teaser storage ───────────────────────────────────
    tracing::info!(root = %config.storage.root_path, "Initializing local storage...");
    let storage = Arc::new(LocalStorageProvider::new(&config.storage.root_path).await?);

    // ── Step 3: Outbound e-mail ──────────────────────────────────
    let email = sender_from_config(&config.notifications)?;

    // ── Step 4: Services and shared state ────────────────────────
    let app_state = AppState::new(config.clone(), stores.clone(), storage, email);

    // ── Step 5: Shutdown channel, worker and scheduler ───────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let background = Background::start(
        &config,
        Arc::clone(&stores.jobs),
        &app_state.services,
        shutdown_rx,
    )
    .await?;

    // ── Step 6: Build and start HTTP server ──────────────────────
    let app = build_app(app_state);
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("CRM server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    background
        .stop(Duration::from_secs(config.server.shutdown_grace_seconds))
        .await;
    tracing::info!("CRM server stopped");

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
