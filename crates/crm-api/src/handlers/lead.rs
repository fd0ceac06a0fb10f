//! Lead handlers: CRUD, stage changes and the per-lead views.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use crm_auth::rbac::Permission;
use crm_core::types::pagination::PageResponse;
use crm_entity::lead::Lead;
use crm_entity::reminder::{ReminderTask, ReminderType};
use crm_entity::task::TaskWithDependencies;

use crate::dto::request::{ChangeStageRequest, CreateLeadRequest};
use crate::dto::response::{ApiResponse, CountResponse, StageChangeResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/leads
pub async fn list_leads(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Lead>>>> {
    auth.require(&state, Permission::LeadRead)?;
    let page = state
        .services
        .leads
        .list_leads(&params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/leads
pub async fn create_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateLeadRequest>,
) -> ApiResult<Json<ApiResponse<Lead>>> {
    auth.require(&state, Permission::LeadWrite)?;
    let lead = state.services.leads.create_lead(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(lead)))
}

/// GET /api/leads/{id}
pub async fn get_lead(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Lead>>> {
    auth.require(&state, Permission::LeadRead)?;
    let lead = state.services.leads.get_lead(id).await?;
    Ok(Json(ApiResponse::ok(lead)))
}

/// PUT /api/leads/{id}/stage
pub async fn change_stage(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStageRequest>,
) -> ApiResult<Json<ApiResponse<StageChangeResponse>>> {
    auth.require(&state, Permission::LeadWrite)?;
    let (lead, reminder) = state
        .services
        .reminders
        .change_lead_stage(&auth, id, req.stage)
        .await?;
    Ok(Json(ApiResponse::ok(StageChangeResponse { lead, reminder })))
}

/// GET /api/leads/{id}/tasks
pub async fn list_lead_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<TaskWithDependencies>>>> {
    auth.require(&state, Permission::TaskRead)?;
    let tasks = state.services.tasks.list_lead_tasks(id).await?;
    Ok(Json(ApiResponse::ok(tasks)))
}

/// GET /api/leads/{id}/reminders
pub async fn list_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<ReminderTask>>>> {
    auth.require(&state, Permission::LeadRead)?;
    let reminders = state.services.reminders.list_reminders(id).await?;
    Ok(Json(ApiResponse::ok(reminders)))
}

/// DELETE /api/leads/{id}/reminders/{reminder_type}
pub async fn cancel_reminder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, reminder_type)): Path<(Uuid, String)>,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    auth.require(&state, Permission::ReminderManage)?;
    let reminder_type: ReminderType = reminder_type.parse()?;
    let cancelled = state
        .services
        .reminders
        .cancel_reminder(id, reminder_type)
        .await?;
    Ok(Json(ApiResponse::ok(CountResponse {
        count: cancelled as i64,
    })))
}
