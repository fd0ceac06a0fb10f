//! Route definitions for the CRM HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Multipart framing overhead allowed on top of the teaser size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the API router with state applied. Layers are added by
/// [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let max_body = usize::try_from(state.config.storage.max_teaser_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(lead_routes())
        .merge(task_routes())
        .merge(rule_routes())
        .merge(notification_routes())
        .merge(metrics_routes())
        .merge(commission_routes())
        .merge(user_routes())
        .merge(job_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Leads, stage changes, per-lead views, balancing and teasers
fn lead_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/leads",
            get(handlers::lead::list_leads).post(handlers::lead::create_lead),
        )
        .route("/leads/auto-assign", post(handlers::assignment::auto_assign))
        .route("/leads/redistribute", post(handlers::assignment::redistribute))
        .route("/leads/{id}", get(handlers::lead::get_lead))
        .route("/leads/{id}/stage", put(handlers::lead::change_stage))
        .route("/leads/{id}/tasks", get(handlers::lead::list_lead_tasks))
        .route("/leads/{id}/reminders", get(handlers::lead::list_reminders))
        .route(
            "/leads/{id}/reminders/{reminder_type}",
            delete(handlers::lead::cancel_reminder),
        )
        .route("/leads/{id}/teaser", post(handlers::teaser::upload_teaser))
}

/// Tasks and the SLA table
fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(handlers::task::create_task))
        .route("/tasks/{id}", get(handlers::task::get_task))
        .route("/tasks/{id}/complete", post(handlers::task::complete_task))
        .route("/tasks/{id}/snooze", post(handlers::task::snooze_task))
        .route("/tasks/{id}/reopen", post(handlers::task::reopen_task))
        .route(
            "/tasks/{id}/dependencies",
            put(handlers::task::set_dependencies),
        )
        .route("/sla-policies", get(handlers::task::list_sla_policies))
        .route(
            "/sla-policies/{task_type}",
            put(handlers::task::update_sla_policy),
        )
}

/// Notification rules and their delivery log
fn rule_routes() -> Router<AppState> {
    Router::new()
        .route("/notification-rules", get(handlers::rule::list_rules))
        .route("/notification-rules/trigger", post(handlers::rule::trigger))
        .route(
            "/notification-rules/{rule_type}/active",
            put(handlers::rule::toggle_rule),
        )
        .route(
            "/notification-rules/{rule_type}/config",
            put(handlers::rule::update_rule_config),
        )
        .route("/notification-logs", get(handlers::rule::list_logs))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

fn metrics_routes() -> Router<AppState> {
    Router::new()
        .route("/metrics/kanban", get(handlers::metrics::kanban))
        .route("/metrics/commissions", get(handlers::metrics::commissions))
}

fn commission_routes() -> Router<AppState> {
    Router::new().route(
        "/commissions",
        get(handlers::commission::list_commissions).post(handlers::commission::create_commission),
    )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route("/users/me", get(handlers::user::me))
}

/// Background jobs
fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(handlers::job::list_jobs))
        .route("/jobs/{id}", get(handlers::job::get_job))
        .route("/jobs/run/{job_type}", post(handlers::job::enqueue_job))
}
