//! Teaser document upload.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use bytes::Bytes;
use uuid::Uuid;

use crm_auth::rbac::Permission;
use crm_core::error::AppError;
use crm_service::TeaserUpload;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/leads/{id}/teaser (multipart, field `file`)
pub async fn upload_teaser(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(lead_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<TeaserUpload>>> {
    auth.require(&state, Permission::TeaserUpload)?;

    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("teaser").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Failed to read upload: {e}")))?;
        file = Some((file_name, mime_type, data));
    }

    let (file_name, mime_type, data) =
        file.ok_or_else(|| AppError::validation("Missing 'file' field"))?;

    let upload = state
        .services
        .teasers
        .upload_teaser(&auth, lead_id, &file_name, &mime_type, data)
        .await?;
    Ok(Json(ApiResponse::ok(upload)))
}
