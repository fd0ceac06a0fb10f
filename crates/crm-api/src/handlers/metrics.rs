//! Pipeline and commission dashboards.

use axum::Json;
use axum::extract::State;

use crm_auth::rbac::Permission;
use crm_service::metrics::{CommissionStats, KanbanStats};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/metrics/kanban
pub async fn kanban(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<KanbanStats>>> {
    auth.require(&state, Permission::MetricsView)?;
    let stats = state.services.metrics.kanban().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/metrics/commissions
pub async fn commissions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<CommissionStats>>> {
    auth.require(&state, Permission::CommissionView)?;
    let stats = state.services.metrics.commissions().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
