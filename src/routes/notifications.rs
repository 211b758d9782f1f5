use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::notification_dto::{
        AuditListQuery, AuditLogResponse, NotificationListQuery, NotificationResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

fn claims_user_id(claims: &Claims) -> Result<Uuid> {
    claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Invalid token subject".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(
        ("unread_only" = Option<bool>, Query, description = "Only unread notifications"),
        ("limit" = Option<i64>, Query, description = "Number of items to return")
    ),
    responses((status = 200, description = "In-app notifications, newest first"))
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let notifications = state
        .notification_service
        .list_for_user(user_id, query.unread_only.unwrap_or(false), query.limit.unwrap_or(50))
        .await?;
    let notifications: Vec<NotificationResponse> =
        notifications.into_iter().map(Into::into).collect();
    Ok(Json(notifications))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read"),
        (status = 404, description = "Notification not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let notification = state.notification_service.mark_read(id, user_id).await?;
    Ok(Json(NotificationResponse::from(notification)))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses((status = 200, description = "All notifications marked read"))
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let updated = state.notification_service.mark_all_read(user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

#[utoipa::path(
    get,
    path = "/api/audit-logs",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("user_id" = Option<String>, Query, description = "Filter by actor"),
        ("entity_type" = Option<String>, Query, description = "Filter by entity type"),
        ("action" = Option<String>, Query, description = "Filter by action")
    ),
    responses(
        (status = 200, description = "Audit trail, newest first"),
        (status = 403, description = "Requires admin role")
    )
)]
#[axum::debug_handler]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditListQuery>,
) -> Result<impl IntoResponse> {
    let logs = state.audit_service.list(query).await?;
    let logs: Vec<AuditLogResponse> = logs.into_iter().map(Into::into).collect();
    Ok(Json(logs))
}
