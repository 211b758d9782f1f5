use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::User;
use crate::utils::token::TokenPair;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Password fields do not match"))]
    pub password_confirm: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub role: Option<String>,
    pub phone_number: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_verified: bool,
    pub is_active: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name(),
            role: user.role.clone(),
            is_verified: user.is_verified,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

impl TokenResponse {
    pub fn new(pair: TokenPair, user: &User) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: UserSummary::from(user),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Password fields do not match"))]
    pub new_password_confirm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequestPayload {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetConfirmPayload {
    pub token: Uuid,
    #[validate(length(min = 8))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Password fields do not match"))]
    pub new_password_confirm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerificationPayload {
    pub token: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload() -> RegisterPayload {
        RegisterPayload {
            email: "jane@example.com".into(),
            password: "password123".into(),
            password_confirm: "password123".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            role: None,
            phone_number: None,
            company: None,
            job_title: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(register_payload().validate().is_ok());
    }

    #[test]
    fn password_mismatch_is_rejected() {
        let mut payload = register_payload();
        payload.password_confirm = "different123".into();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn short_password_is_rejected() {
        let mut payload = register_payload();
        payload.password = "short".into();
        payload.password_confirm = "short".into();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut payload = register_payload();
        payload.email = "not-an-email".into();
        assert!(payload.validate().is_err());
    }
}
