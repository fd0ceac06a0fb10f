//! Task handlers and the SLA policy table.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crm_auth::rbac::Permission;
use crm_entity::task::{Task, TaskSlaPolicy, TaskType};

use crate::dto::request::{
    CreateTaskRequest, SetDependenciesRequest, SnoozeTaskRequest, UpdateSlaPolicyRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    auth.require(&state, Permission::TaskWrite)?;
    let task = state.services.tasks.create_task(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    auth.require(&state, Permission::TaskRead)?;
    let task = state.services.tasks.get_task(id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// POST /api/tasks/{id}/complete
pub async fn complete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    auth.require(&state, Permission::TaskWrite)?;
    let task = state.services.tasks.complete_task(&auth, id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// POST /api/tasks/{id}/snooze
pub async fn snooze_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<SnoozeTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    auth.require(&state, Permission::TaskWrite)?;
    let task = state.services.tasks.snooze_task(&auth, id, req.days).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// POST /api/tasks/{id}/reopen
pub async fn reopen_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    auth.require(&state, Permission::TaskWrite)?;
    let task = state.services.tasks.reopen_task(&auth, id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// PUT /api/tasks/{id}/dependencies
pub async fn set_dependencies(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetDependenciesRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    auth.require(&state, Permission::TaskWrite)?;
    let task = state
        .services
        .tasks
        .set_dependencies(&auth, id, &req.dependencies)
        .await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// GET /api/sla-policies
pub async fn list_sla_policies(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<TaskSlaPolicy>>>> {
    auth.require(&state, Permission::TaskRead)?;
    let policies = state.services.tasks.list_sla_policies().await?;
    Ok(Json(ApiResponse::ok(policies)))
}

/// PUT /api/sla-policies/{task_type}
pub async fn update_sla_policy(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_type): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateSlaPolicyRequest>,
) -> ApiResult<Json<ApiResponse<TaskSlaPolicy>>> {
    auth.require(&state, Permission::SlaManage)?;
    let task_type: TaskType = task_type.parse()?;
    let policy = state
        .services
        .tasks
        .update_sla_policy(&auth, task_type, req.default_sla_hours)
        .await?;
    Ok(Json(ApiResponse::ok(policy)))
}
