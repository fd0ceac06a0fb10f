//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use crm_auth::jwt::{JwtDecoder, JwtEncoder};
use crm_auth::rbac::RbacEnforcer;
use crm_core::config::AppConfig;
use crm_core::traits::storage::StorageProvider;
use crm_database::Stores;
use crm_service::{EmailSender, Services};
use crm_worker::JobQueue;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    // Auth
    pub jwt_encoder: Arc<JwtEncoder>,
    pub jwt_decoder: Arc<JwtDecoder>,
    pub rbac: Arc<RbacEnforcer>,

    /// Business services.
    pub services: Services,

    /// Queue used to trigger background jobs on demand.
    pub job_queue: Arc<JobQueue>,

    /// Process start, for the health endpoint.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        stores: Stores,
        storage: Arc<dyn StorageProvider>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        let services = Services::new(&config, &stores, storage, email);
        let job_queue = Arc::new(JobQueue::new(stores.jobs, "api"));

        Self {
            jwt_encoder: Arc::new(JwtEncoder::new(&config.auth)),
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            rbac: Arc::new(RbacEnforcer::new()),
            services,
            job_queue,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
