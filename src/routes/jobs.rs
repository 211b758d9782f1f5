use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        AttachSkillPayload, CreateJobPayload, JobListQuery, JobListResponse, JobResponse,
        PublicJobQuery, PublicJobSummary, UpdateJobPayload,
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
    post,
    path = "/api/jobs",
    responses(
        (status = 201, description = "Job created as a draft"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let created_by = claims_user_id(&claims)?;
    let job = state.job_service.create_job(created_by, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("department_id" = Option<String>, Query, description = "Filter by department"),
        ("search" = Option<String>, Query, description = "Search in titles")
    ),
    responses((status = 200, description = "Paginated jobs"))
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.job_service.list_jobs(query).await?;
    Ok(Json(JobListResponse::from(list)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job found"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_job(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    patch,
    path = "/api/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job updated"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.update_job(id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 204, description = "Job deleted with its applications"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.delete_job(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/publish",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job published; published_at is set once"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn publish_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.publish_job(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/close",
    params(("id" = String, Path, description = "Job ID")),
    responses((status = 200, description = "Job closed to new applications"))
)]
#[axum::debug_handler]
pub async fn close_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.close_job(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/archive",
    params(("id" = String, Path, description = "Job ID")),
    responses((status = 200, description = "Job archived"))
)]
#[axum::debug_handler]
pub async fn archive_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.archive_job(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/skills",
    params(("id" = String, Path, description = "Job ID")),
    responses((status = 200, description = "Skills required by the job"))
)]
#[axum::debug_handler]
pub async fn list_job_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let skills = state.job_service.list_job_skills(id).await?;
    Ok(Json(skills))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/skills",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 201, description = "Skill attached"),
        (status = 409, description = "Skill already attached")
    )
)]
#[axum::debug_handler]
pub async fn attach_job_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachSkillPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let skill = state.job_service.attach_skill(id, payload).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}/skills/{skill_id}",
    params(
        ("id" = String, Path, description = "Job ID"),
        ("skill_id" = String, Path, description = "Skill ID")
    ),
    responses(
        (status = 204, description = "Skill detached"),
        (status = 404, description = "Skill not attached")
    )
)]
#[axum::debug_handler]
pub async fn detach_job_skill(
    State(state): State<AppState>,
    Path((id, skill_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state.job_service.detach_skill(id, skill_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/public/jobs",
    params(("limit" = Option<i64>, Query, description = "Number of items to return")),
    responses((status = 200, description = "Published jobs open for applications"))
)]
#[axum::debug_handler]
pub async fn list_public_jobs(
    State(state): State<AppState>,
    Query(query): Query<PublicJobQuery>,
) -> Result<impl IntoResponse> {
    let jobs = state
        .job_service
        .list_public_jobs(query.limit.unwrap_or(20))
        .await?;
    let jobs: Vec<PublicJobSummary> = jobs.into_iter().map(Into::into).collect();
    Ok(Json(jobs))
}

#[utoipa::path(
    get,
    path = "/api/public/jobs/{slug}",
    params(("slug" = String, Path, description = "Job slug")),
    responses(
        (status = 200, description = "Job found; view counter incremented"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_public_job(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_job_by_slug(&slug).await?;
    if !job.is_published() {
        return Err(Error::NotFound("Job not found".to_string()));
    }
    state.job_service.increment_view_count(job.id).await?;
    Ok(Json(JobResponse::from(job)))
}
