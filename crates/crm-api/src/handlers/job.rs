//! Background job inspection and on-demand triggering.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use crm_auth::rbac::Permission;
use crm_core::error::AppError;
use crm_core::types::pagination::PageResponse;
use crm_entity::job::{CreateJob, Job, JobKind, JobPriority};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Job>>>> {
    auth.require(&state, Permission::JobView)?;
    let page = state.job_queue.list(&params.into_page_request()).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Job>>> {
    auth.require(&state, Permission::JobView)?;
    let job = state
        .job_queue
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Job {id} not found")))?;
    Ok(Json(ApiResponse::ok(job)))
}

/// POST /api/jobs/run/{job_type}: enqueue a periodic job now.
pub async fn enqueue_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job_type): Path<String>,
) -> ApiResult<Json<ApiResponse<Job>>> {
    auth.require(&state, Permission::RuleTrigger)?;
    let kind: JobKind = job_type.parse()?;

    let mut params = CreateJob::for_kind(kind, JobPriority::High);
    params.created_by = Some(auth.user_id.into_uuid());
    let job = state.job_queue.enqueue(&params).await?;
    Ok(Json(ApiResponse::ok(job)))
}
