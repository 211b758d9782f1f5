use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListQuery, ApplicationResponse, ApplyPayload, StatusHistoryResponse,
        UpdateStatusPayload,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::UserRole,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

fn claims_user_id(claims: &Claims) -> Result<Uuid> {
    claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Invalid token subject".to_string()))
}

fn is_staff(claims: &Claims) -> bool {
    UserRole::parse(&claims.role_str())
        .map(|role| role.is_hr_or_admin())
        .unwrap_or(false)
}

#[utoipa::path(
    post,
    path = "/api/applications",
    responses(
        (status = 201, description = "Application submitted"),
        (status = 400, description = "Job is not accepting applications"),
        (status = 409, description = "Already applied to this job")
    )
)]
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate_id = claims_user_id(&claims)?;
    let application = state.application_service.apply(candidate_id, payload).await?;

    let job = state.job_service.get_job(application.job_id).await?;
    state
        .notification_service
        .create_in_app(
            job.created_by,
            "New application received",
            &format!("A candidate applied to {}", job.title),
            json!({ "application_id": application.id, "job_id": job.id }),
        )
        .await?;
    state
        .audit_service
        .record(
            Some(candidate_id),
            "application.created",
            "job_application",
            application.id,
            Some(json!({ "job_id": job.id })),
            None,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(application))))
}

#[utoipa::path(
    get,
    path = "/api/applications",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("job_id" = Option<String>, Query, description = "Filter by job")
    ),
    responses((status = 200, description = "Candidates see their own; HR and admin see all"))
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let list = if is_staff(&claims) {
        state.application_service.list_all(query).await?
    } else {
        state
            .application_service
            .list_for_candidate(user_id, query)
            .await?
    };

    Ok(Json(ApplicationListResponse {
        items: list.items.into_iter().map(Into::into).collect(),
        total: list.total,
        page: list.page,
        per_page: list.per_page,
        total_pages: list.total_pages,
    }))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application found"),
        (status = 403, description = "Belongs to another candidate"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let application = state.application_service.get_application(id).await?;
    if !is_staff(&claims) && application.candidate_id != user_id {
        return Err(Error::Forbidden(
            "This application belongs to another candidate".to_string(),
        ));
    }
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Status changed, history row appended"),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let changed_by = claims_user_id(&claims)?;
    let (application, change) = state
        .application_service
        .update_status(id, &payload.status, payload.notes.as_deref(), Some(changed_by))
        .await?;

    state
        .notification_service
        .create_in_app(
            application.candidate_id,
            "Application status updated",
            &format!(
                "Your application moved from {} to {}",
                change.old_status.as_str(),
                change.new_status.as_str()
            ),
            json!({ "application_id": application.id, "status": change.new_status.as_str() }),
        )
        .await?;
    state
        .audit_service
        .record(
            Some(changed_by),
            "application.status_changed",
            "job_application",
            application.id,
            Some(json!({
                "old_status": change.old_status.as_str(),
                "new_status": change.new_status.as_str(),
            })),
            None,
        )
        .await?;

    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/withdraw",
    params(("id" = String, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application withdrawn"),
        (status = 400, description = "Too late to withdraw"),
        (status = 403, description = "Belongs to another candidate")
    )
)]
#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims_user_id(&claims)?;
    let (application, _) = state.application_service.withdraw(id, candidate_id).await?;

    state
        .audit_service
        .record(
            Some(candidate_id),
            "application.withdrawn",
            "job_application",
            application.id,
            None,
            None,
        )
        .await?;

    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/history",
    params(("id" = String, Path, description = "Application ID")),
    responses((status = 200, description = "Status history, newest first"))
)]
#[axum::debug_handler]
pub async fn status_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let history = state.application_service.status_history(id).await?;
    let history: Vec<StatusHistoryResponse> = history.into_iter().map(Into::into).collect();
    Ok(Json(history))
}
