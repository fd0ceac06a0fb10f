//! Lead assignment balancer handlers (manager or above).

use axum::Json;
use axum::extract::State;

use crm_auth::rbac::Permission;
use crm_core::types::id::LeadId;
use crm_service::AssignmentSummary;

use crate::dto::request::AutoAssignRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/leads/auto-assign
pub async fn auto_assign(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<AutoAssignRequest>>,
) -> ApiResult<Json<ApiResponse<AssignmentSummary>>> {
    auth.require(&state, Permission::LeadAssign)?;
    let lead_ids = body
        .and_then(|Json(req)| req.lead_ids)
        .map(|ids| ids.into_iter().map(LeadId::from_uuid).collect());

    let summary = state
        .services
        .assignment
        .auto_assign_leads(&auth, lead_ids)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// POST /api/leads/redistribute
pub async fn redistribute(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<AssignmentSummary>>> {
    auth.require(&state, Permission::LeadAssign)?;
    let summary = state
        .services
        .assignment
        .redistribute_workload(&auth)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}
