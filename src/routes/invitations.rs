use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::get_config,
    dto::invitation_dto::{
        AcceptInvitationPayload, CreateInvitationPayload, CreatedInvitationResponse,
        InvitationResponse,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/invitations",
    responses(
        (status = 201, description = "Invitation created, email queued"),
        (status = 400, description = "Unknown or disallowed role"),
        (status = 409, description = "Pending invitation or account already exists")
    )
)]
#[axum::debug_handler]
pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateInvitationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let invited_by = claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Invalid token subject".to_string()))?;
    let invitation = state.invitation_service.create(invited_by, payload).await?;

    let config = get_config();
    let invite_link = format!("{}/accept-invitation?token={}", config.frontend_url, invitation.token);
    state
        .notification_service
        .queue_email(
            None,
            &invitation.email,
            "You have been invited",
            &format!(
                "You have been invited to join as {}. Accept here: {}",
                invitation.role, invite_link
            ),
            Some("invitation"),
            json!({ "invite_link": invite_link, "role": invitation.role }),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedInvitationResponse::from(invitation)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/invitations",
    responses((status = 200, description = "All invitations, newest first"))
)]
#[axum::debug_handler]
pub async fn list_invitations(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let invitations = state.invitation_service.list().await?;
    let invitations: Vec<InvitationResponse> = invitations.into_iter().map(Into::into).collect();
    Ok(Json(invitations))
}

#[utoipa::path(
    delete,
    path = "/api/invitations/{id}",
    params(("id" = String, Path, description = "Invitation ID")),
    responses(
        (status = 204, description = "Invitation revoked"),
        (status = 404, description = "Invitation not found or already accepted")
    )
)]
#[axum::debug_handler]
pub async fn revoke_invitation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.invitation_service.revoke(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/public/invitations/{token}",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, description = "Invitation details for the accept form"),
        (status = 400, description = "Invitation expired or already accepted"),
        (status = 404, description = "Unknown token")
    )
)]
#[axum::debug_handler]
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let invitation = state.invitation_service.get_by_token(token).await?;
    if invitation.is_accepted {
        return Err(Error::BadRequest(
            "This invitation has already been accepted".to_string(),
        ));
    }
    if invitation.is_expired(Utc::now()) {
        return Err(Error::BadRequest("This invitation has expired".to_string()));
    }
    Ok(Json(InvitationResponse::from(invitation)))
}

#[utoipa::path(
    post,
    path = "/api/public/invitations/accept",
    responses(
        (status = 201, description = "Account created, token pair issued"),
        (status = 400, description = "Invitation expired"),
        (status = 409, description = "Invitation no longer valid")
    )
)]
#[axum::debug_handler]
pub async fn accept_invitation(
    State(state): State<AppState>,
    Json(payload): Json<AcceptInvitationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let tokens = state.invitation_service.accept(payload).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}
