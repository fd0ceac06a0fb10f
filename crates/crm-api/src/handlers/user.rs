//! User handlers.

use axum::Json;
use axum::extract::State;

use crm_auth::rbac::Permission;
use crm_entity::user::User;

use crate::dto::request::CreateUserRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .services
        .users
        .get_user(auth.user_id.into_uuid())
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<User>>>> {
    auth.require(&state, Permission::LeadAssign)?;
    let users = state.services.users.list_users().await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    auth.require(&state, Permission::UserManage)?;
    let user = state.services.users.create_user(req.into()).await?;
    Ok(Json(ApiResponse::ok(user)))
}
