use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::skill_dto::{CreateUserSkillPayload, UpdateUserSkillPayload},
    dto::user_dto::{ProfileResponse, UpdateProfilePayload, UpdateUserPayload, UserListQuery, UserResponse},
    error::{Error, Result},
    middleware::auth::Claims,
    models::user::UserRole,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<UserResponse>,
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

/// Staff browse the whole directory; everyone else gets a list containing
/// only their own account.
fn sees_full_directory(claims: &Claims) -> bool {
    UserRole::parse(&claims.role_str())
        .map(|role| role.is_hr_or_admin())
        .unwrap_or(false)
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("search" = Option<String>, Query, description = "Search by name or email")
    ),
    responses(
        (status = 200, description = "Full directory for staff, self-only list otherwise")
    )
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    if !sees_full_directory(&claims) {
        let user_id = claims_user_id(&claims)?;
        let user = state.user_service.get_user(user_id).await?;
        return Ok(Json(UserListResponse {
            items: vec![UserResponse::from(user)],
            total: 1,
            page: 1,
            per_page: 1,
            total_pages: 1,
        }));
    }

    let list = state.user_service.list_users(query).await?;
    Ok(Json(UserListResponse {
        items: list.items.into_iter().map(Into::into).collect(),
        total: list.total,
        page: list.page,
        per_page: list.per_page,
        total_pages: list.total_pages,
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found"),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Account updated"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let user = state.user_service.update_user(user_id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/me/profile",
    responses((status = 200, description = "Profile, created on first access"))
)]
#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let profile = state.user_service.get_or_create_profile(user_id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    patch,
    path = "/api/users/me/profile",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_my_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let profile = state.user_service.update_profile(user_id, payload).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    get,
    path = "/api/users/me/stats",
    responses((status = 200, description = "Role-dependent activity counters"))
)]
#[axum::debug_handler]
pub async fn my_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let stats = state.user_service.user_stats(user_id).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/deactivate",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated"),
        (status = 403, description = "Requires admin role")
    )
)]
#[axum::debug_handler]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.set_active(id, false).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/activate",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User reactivated"),
        (status = 403, description = "Requires admin role")
    )
)]
#[axum::debug_handler]
pub async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.set_active(id, true).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/me/skills",
    responses((status = 200, description = "Skills on the profile"))
)]
#[axum::debug_handler]
pub async fn list_my_skills(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    let skills = state.skill_service.list_user_skills(user_id).await?;
    Ok(Json(skills))
}

#[utoipa::path(
    post,
    path = "/api/users/me/skills",
    responses(
        (status = 201, description = "Skill added to the profile"),
        (status = 409, description = "Skill already on the profile")
    )
)]
#[axum::debug_handler]
pub async fn add_my_skill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserSkillPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let skill = state.skill_service.add_user_skill(user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

#[utoipa::path(
    patch,
    path = "/api/users/me/skills/{id}",
    params(("id" = String, Path, description = "User skill ID")),
    responses(
        (status = 200, description = "Skill updated"),
        (status = 404, description = "Skill not on the profile")
    )
)]
#[axum::debug_handler]
pub async fn update_my_skill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserSkillPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims_user_id(&claims)?;
    let skill = state
        .skill_service
        .update_user_skill(user_id, id, payload)
        .await?;
    Ok(Json(skill))
}

#[utoipa::path(
    delete,
    path = "/api/users/me/skills/{id}",
    params(("id" = String, Path, description = "User skill ID")),
    responses(
        (status = 204, description = "Skill removed"),
        (status = 404, description = "Skill not on the profile")
    )
)]
#[axum::debug_handler]
pub async fn remove_my_skill(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let user_id = claims_user_id(&claims)?;
    state.skill_service.remove_user_skill(user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_role(role: &str) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            exp: 0,
            role: Some(role.to_string()),
            token_type: Some("access".to_string()),
        }
    }

    #[test]
    fn only_staff_see_the_full_directory() {
        assert!(sees_full_directory(&claims_with_role("admin")));
        assert!(sees_full_directory(&claims_with_role("hr")));
        assert!(!sees_full_directory(&claims_with_role("interviewer")));
        assert!(!sees_full_directory(&claims_with_role("candidate")));
        assert!(!sees_full_directory(&claims_with_role("")));
    }
}
