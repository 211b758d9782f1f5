use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::get_config;
use crate::dto::auth_dto::TokenResponse;
use crate::dto::invitation_dto::{AcceptInvitationPayload, CreateInvitationPayload};
use crate::error::{Error, Result};
use crate::models::invitation::Invitation;
use crate::models::user::{User, UserRole};
use crate::utils::crypto::hash_password;
use crate::utils::text::normalize_email;
use crate::utils::token::issue_token_pair;

const INVITATION_COLUMNS: &str =
    "id, email, role, token, invited_by, message, is_accepted, accepted_at, expires_at, created_at";

#[derive(Clone)]
pub struct InvitationService {
    pool: PgPool,
}

impl InvitationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        invited_by: Uuid,
        payload: CreateInvitationPayload,
    ) -> Result<Invitation> {
        let email = normalize_email(&payload.email);
        let role = UserRole::parse(&payload.role)
            .ok_or_else(|| Error::BadRequest(format!("Unknown role: {}", payload.role)))?;
        if role == UserRole::Candidate {
            return Err(Error::BadRequest(
                "Candidates register directly and are not invited".to_string(),
            ));
        }

        let registered = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if registered.is_some() {
            return Err(Error::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }

        let pending = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM invitations \
             WHERE email = $1 AND is_accepted = FALSE AND expires_at > NOW()",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;
        if pending.is_some() {
            return Err(Error::Conflict(
                "A pending invitation already exists for this email".to_string(),
            ));
        }

        let ttl_days = payload
            .expires_in_days
            .unwrap_or(get_config().invitation_ttl_days);
        let expires_at = Utc::now() + Duration::days(ttl_days);

        let invitation = sqlx::query_as::<_, Invitation>(&format!(
            "INSERT INTO invitations (email, role, invited_by, message, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(&email)
        .bind(role.as_str())
        .bind(invited_by)
        .bind(&payload.message)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(invitation)
    }

    pub async fn list(&self) -> Result<Vec<Invitation>> {
        let invitations = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    pub async fn get_by_token(&self, token: Uuid) -> Result<Invitation> {
        let invitation = sqlx::query_as::<_, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE token = $1"
        ))
        .bind(token)
        .fetch_one(&self.pool)
        .await?;
        Ok(invitation)
    }

    /// Accepts an invitation and creates the invited account in one step. The
    /// accept transition is guarded in SQL so two concurrent accepts of the
    /// same token cannot both succeed.
    pub async fn accept(&self, payload: AcceptInvitationPayload) -> Result<TokenResponse> {
        let invitation = self.get_by_token(payload.token).await?;

        if invitation.is_accepted {
            return Err(Error::Conflict(
                "This invitation has already been accepted".to_string(),
            ));
        }
        if invitation.is_expired(Utc::now()) {
            return Err(Error::BadRequest("This invitation has expired".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query_scalar::<_, Uuid>(
            "UPDATE invitations \
             SET is_accepted = TRUE, accepted_at = NOW() \
             WHERE token = $1 AND is_accepted = FALSE AND expires_at > NOW() \
             RETURNING id",
        )
        .bind(payload.token)
        .fetch_optional(&mut *tx)
        .await?;
        if claimed.is_none() {
            return Err(Error::Conflict(
                "This invitation is no longer valid".to_string(),
            ));
        }

        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, first_name, last_name, role, is_verified) \
             VALUES ($1, $2, $3, $4, $5, TRUE) \
             RETURNING id, email, password_hash, first_name, last_name, role, phone_number, \
                 date_of_birth, company, job_title, is_active, is_verified, \
                 email_verification_token, email_verification_expires, password_reset_token, \
                 password_reset_expires, last_login_at, created_at, updated_at",
        )
        .bind(&invitation.email)
        .bind(&password_hash)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&invitation.role)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let pair = issue_token_pair(user.id, &user.role)?;
        Ok(TokenResponse::new(pair, &user))
    }

    pub async fn revoke(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1 AND is_accepted = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "Invitation not found or already accepted".to_string(),
            ));
        }
        Ok(())
    }
}
