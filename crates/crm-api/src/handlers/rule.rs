//! Notification rule administration, on-demand evaluation and the delivery log.

use axum::Json;
use axum::extract::{Path, Query, State};

use crm_auth::rbac::Permission;
use crm_core::types::pagination::PageResponse;
use crm_entity::notification::{NotificationLog, NotificationRule, RuleType};
use crm_service::TriggerSummary;

use crate::dto::request::{ToggleRuleRequest, UpdateRuleConfigRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/notification-rules
pub async fn list_rules(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<NotificationRule>>>> {
    auth.require(&state, Permission::RuleView)?;
    let rules = state.services.rules.list_rules().await?;
    Ok(Json(ApiResponse::ok(rules)))
}

/// PUT /api/notification-rules/{rule_type}/active
pub async fn toggle_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_type): Path<String>,
    Json(req): Json<ToggleRuleRequest>,
) -> ApiResult<Json<ApiResponse<NotificationRule>>> {
    auth.require(&state, Permission::RuleManage)?;
    let rule_type: RuleType = rule_type.parse()?;
    let rule = state
        .services
        .rules
        .toggle_rule(&auth, rule_type, req.is_active)
        .await?;
    Ok(Json(ApiResponse::ok(rule)))
}

/// PUT /api/notification-rules/{rule_type}/config
pub async fn update_rule_config(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_type): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateRuleConfigRequest>,
) -> ApiResult<Json<ApiResponse<NotificationRule>>> {
    auth.require(&state, Permission::RuleManage)?;
    let rule_type: RuleType = rule_type.parse()?;
    let rule = state
        .services
        .rules
        .update_rule_config(&auth, rule_type, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(rule)))
}

/// POST /api/notification-rules/trigger
pub async fn trigger(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<TriggerSummary>>> {
    auth.require(&state, Permission::RuleTrigger)?;
    let summary = state
        .services
        .rules
        .trigger_automated_notifications()
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/notification-logs
pub async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<NotificationLog>>>> {
    auth.require(&state, Permission::RuleView)?;
    let logs = state
        .services
        .rules
        .list_logs(&params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(logs)))
}
