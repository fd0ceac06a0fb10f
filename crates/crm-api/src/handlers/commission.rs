//! Commission handlers.

use axum::Json;
use axum::extract::{Query, State};

use crm_auth::rbac::Permission;
use crm_core::types::pagination::PageResponse;
use crm_entity::commission::Commission;

use crate::dto::request::CreateCommissionRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/commissions
pub async fn list_commissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Commission>>>> {
    auth.require(&state, Permission::CommissionView)?;
    let page = state
        .services
        .commissions
        .list_commissions(&params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/commissions
pub async fn create_commission(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateCommissionRequest>,
) -> ApiResult<Json<ApiResponse<Commission>>> {
    auth.require(&state, Permission::CommissionManage)?;
    let commission = state
        .services
        .commissions
        .create_commission(&auth, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(commission)))
}
