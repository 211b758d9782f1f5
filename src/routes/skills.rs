use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::skill_dto::{
        CreateDepartmentPayload, CreateSkillPayload, DepartmentResponse, SkillListQuery,
        SkillResponse, UpdateSkillPayload,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::UserRole,
    AppState,
};

/// Catalog reads are open to any authenticated user; mutations are gated here
/// because they share paths with the reads.
fn require_staff(claims: &Claims) -> Result<()> {
    let staff = UserRole::parse(&claims.role_str())
        .map(|role| role.is_hr_or_admin())
        .unwrap_or(false);
    if !staff {
        return Err(Error::Forbidden(
            "Requires HR or admin role".to_string(),
        ));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/skills",
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("search" = Option<String>, Query, description = "Search by name")
    ),
    responses((status = 200, description = "Active skills, grouped by category"))
)]
#[axum::debug_handler]
pub async fn list_skills(
    State(state): State<AppState>,
    Query(query): Query<SkillListQuery>,
) -> Result<impl IntoResponse> {
    let skills = state.skill_service.list_skills(query).await?;
    let skills: Vec<SkillResponse> = skills.into_iter().map(Into::into).collect();
    Ok(Json(skills))
}

#[utoipa::path(
    post,
    path = "/api/skills",
    responses(
        (status = 201, description = "Skill created"),
        (status = 409, description = "Name already taken")
    )
)]
#[axum::debug_handler]
pub async fn create_skill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateSkillPayload>,
) -> Result<impl IntoResponse> {
    require_staff(&claims)?;
    payload.validate()?;
    let skill = state.skill_service.create_skill(payload).await?;
    Ok((StatusCode::CREATED, Json(SkillResponse::from(skill))))
}

#[utoipa::path(
    patch,
    path = "/api/skills/{id}",
    params(("id" = String, Path, description = "Skill ID")),
    responses(
        (status = 200, description = "Skill updated"),
        (status = 404, description = "Skill not found")
    )
)]
#[axum::debug_handler]
pub async fn update_skill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSkillPayload>,
) -> Result<impl IntoResponse> {
    require_staff(&claims)?;
    payload.validate()?;
    let skill = state.skill_service.update_skill(id, payload).await?;
    Ok(Json(SkillResponse::from(skill)))
}

#[utoipa::path(
    delete,
    path = "/api/skills/{id}",
    params(("id" = String, Path, description = "Skill ID")),
    responses(
        (status = 204, description = "Skill deleted"),
        (status = 404, description = "Skill not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_skill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_staff(&claims)?;
    state.skill_service.delete_skill(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/departments",
    responses((status = 200, description = "Active departments"))
)]
#[axum::debug_handler]
pub async fn list_departments(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let departments = state.skill_service.list_departments().await?;
    let departments: Vec<DepartmentResponse> = departments.into_iter().map(Into::into).collect();
    Ok(Json(departments))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    responses(
        (status = 201, description = "Department created"),
        (status = 409, description = "Name already taken")
    )
)]
#[axum::debug_handler]
pub async fn create_department(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateDepartmentPayload>,
) -> Result<impl IntoResponse> {
    require_staff(&claims)?;
    payload.validate()?;
    let department = state.skill_service.create_department(payload).await?;
    Ok((StatusCode::CREATED, Json(DepartmentResponse::from(department))))
}
