use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::invitation::Invitation;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvitationPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub role: String,
    pub message: Option<String>,
    #[validate(range(min = 1, max = 90))]
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub invited_by: Uuid,
    pub message: Option<String>,
    pub is_accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Invitation> for InvitationResponse {
    fn from(value: Invitation) -> Self {
        Self {
            id: value.id,
            email: value.email,
            role: value.role,
            invited_by: value.invited_by,
            message: value.message,
            is_accepted: value.is_accepted,
            accepted_at: value.accepted_at,
            expires_at: value.expires_at,
            created_at: value.created_at,
        }
    }
}

/// Returned only to the inviter at creation time; the token never appears in
/// list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedInvitationResponse {
    pub invitation: InvitationResponse,
    pub token: Uuid,
}

impl From<Invitation> for CreatedInvitationResponse {
    fn from(value: Invitation) -> Self {
        let token = value.token;
        Self {
            invitation: value.into(),
            token,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AcceptInvitationPayload {
    pub token: Uuid,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
}
