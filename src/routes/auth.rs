use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::get_config,
    dto::auth_dto::{
        AccessTokenResponse, ChangePasswordPayload, EmailVerificationPayload, LoginPayload,
        PasswordResetConfirmPayload, PasswordResetRequestPayload, RefreshPayload, RegisterPayload,
    },
    dto::user_dto::UserResponse,
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    responses(
        (status = 201, description = "Account created, verification email queued"),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (user, verification_token) = state.user_service.register(payload).await?;

    let config = get_config();
    let verify_link = format!("{}/verify-email?token={}", config.frontend_url, verification_token);
    state
        .notification_service
        .queue_email(
            Some(user.id),
            &user.email,
            "Welcome! Please verify your email",
            &format!("Hi {}, confirm your email address: {}", user.full_name(), verify_link),
            Some("email_verification"),
            json!({ "verify_link": verify_link }),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Token pair issued"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account deactivated")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let tokens = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(tokens))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New access token issued"),
        (status = 401, description = "Invalid refresh token")
    )
)]
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<impl IntoResponse> {
    let access_token = state
        .user_service
        .refresh_access_token(&payload.refresh_token)
        .await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-email",
    responses(
        (status = 200, description = "Email verified"),
        (status = 400, description = "Invalid or expired token")
    )
)]
#[axum::debug_handler]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<EmailVerificationPayload>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.verify_email(payload.token).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Always answers 200 so callers cannot probe which emails have accounts.
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/request",
    responses(
        (status = 200, description = "Reset email queued if the account exists")
    )
)]
#[axum::debug_handler]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequestPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    if let Some(issue) = state
        .user_service
        .request_password_reset(&payload.email)
        .await?
    {
        let config = get_config();
        let reset_link = format!("{}/reset-password?token={}", config.frontend_url, issue.token);
        state
            .notification_service
            .queue_email(
                Some(issue.user_id),
                &issue.email,
                "Password reset requested",
                &format!("Use this link to reset your password: {}", reset_link),
                Some("password_reset"),
                json!({ "reset_link": reset_link }),
            )
            .await?;
    }

    Ok(Json(json!({
        "message": "If an account exists for this email, a reset link has been sent"
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid or expired token")
    )
)]
#[axum::debug_handler]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirmPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .user_service
        .confirm_password_reset(payload.token, &payload.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password has been reset" })))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Current password incorrect"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Invalid token subject".to_string()))?;
    state.user_service.change_password(user_id, payload).await?;
    Ok(Json(json!({ "message": "Password has been changed" })))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated user"),
        (status = 401, description = "Not authenticated")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Invalid token subject".to_string()))?;
    let user = state.user_service.get_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}
