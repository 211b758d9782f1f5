use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::{ChangePasswordPayload, RegisterPayload, TokenResponse};
use crate::dto::user_dto::{UpdateProfilePayload, UpdateUserPayload, UserListQuery, UserStatsResponse};
use crate::error::{Error, Result};
use crate::models::user::{User, UserProfile, UserRole};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::text::normalize_email;
use crate::utils::token::{decode_token, issue_access_token, issue_token_pair};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, phone_number, \
     date_of_birth, company, job_title, is_active, is_verified, email_verification_token, \
     email_verification_expires, password_reset_token, password_reset_expires, last_login_at, \
     created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, user_id, bio, linkedin_url, github_url, portfolio_url, address, \
     city, state, country, postal_code, years_of_experience, current_salary, expected_salary, \
     resume_url, cover_letter_url, preferred_work_type, willing_to_relocate, created_at, updated_at";

/// Pending password reset, handed back to the caller so the email can be
/// dispatched without this service knowing about notifications.
#[derive(Debug, Clone)]
pub struct PasswordResetIssue {
    pub user_id: Uuid,
    pub email: String,
    pub token: Uuid,
}

#[derive(Debug, Clone)]
pub struct UserList {
    pub items: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<(User, Uuid)> {
        let email = normalize_email(&payload.email);

        if let Some(role) = payload.role.as_deref() {
            if role != UserRole::Candidate.as_str() {
                return Err(Error::Forbidden(
                    "Only candidate accounts can self-register".to_string(),
                ));
            }
        }

        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        let verification_token = Uuid::new_v4();
        let verification_expires = Utc::now() + Duration::hours(24);

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, role, phone_number, \
             company, job_title, email_verification_token, email_verification_expires) \
             VALUES ($1, $2, $3, $4, 'candidate', $5, $6, $7, $8, $9) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.phone_number)
        .bind(&payload.company)
        .bind(&payload.job_title)
        .bind(verification_token)
        .bind(verification_expires)
        .fetch_one(&self.pool)
        .await?;

        Ok((user, verification_token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let email = normalize_email(email);
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("Failed to verify password: {}", e)))?;
        if !valid {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }
        if !user.is_active {
            return Err(Error::Forbidden("Account is deactivated".to_string()));
        }

        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        let pair = issue_token_pair(user.id, &user.role)?;
        Ok(TokenResponse::new(pair, &user))
    }

    /// Exchanges a valid refresh token for a fresh access token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let claims = decode_token(refresh_token)?;
        if claims.token_type.as_deref() != Some("refresh") {
            return Err(Error::Unauthorized("Not a refresh token".to_string()));
        }
        let user_id = claims
            .user_id()
            .ok_or_else(|| Error::Unauthorized("Invalid token subject".to_string()))?;

        let user = self.get_user(user_id).await?;
        if !user.is_active {
            return Err(Error::Forbidden("Account is deactivated".to_string()));
        }

        issue_access_token(user.id, &user.role)
    }

    pub async fn verify_email(&self, token: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET is_verified = TRUE, email_verification_token = NULL, \
                 email_verification_expires = NULL, updated_at = NOW() \
             WHERE email_verification_token = $1 AND email_verification_expires > NOW() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::BadRequest("Invalid or expired verification token".to_string()))?;

        Ok(user)
    }

    /// Issues a reset token when the email belongs to an account. Returns None
    /// for unknown emails; the caller responds identically either way.
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<PasswordResetIssue>> {
        let email = normalize_email(email);
        let token = Uuid::new_v4();
        let expires = Utc::now() + Duration::hours(1);

        let user_id = sqlx::query_scalar::<_, Uuid>(
            "UPDATE users \
             SET password_reset_token = $1, password_reset_expires = $2, updated_at = NOW() \
             WHERE email = $3 AND is_active = TRUE \
             RETURNING id",
        )
        .bind(token)
        .bind(expires)
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id.map(|user_id| PasswordResetIssue {
            user_id,
            email,
            token,
        }))
    }

    pub async fn confirm_password_reset(&self, token: Uuid, new_password: &str) -> Result<User> {
        let password_hash = hash_password(new_password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET password_hash = $1, password_reset_token = NULL, \
                 password_reset_expires = NULL, updated_at = NOW() \
             WHERE password_reset_token = $2 AND password_reset_expires > NOW() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&password_hash)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::BadRequest("Invalid or expired reset token".to_string()))?;

        Ok(user)
    }

    pub async fn change_password(&self, user_id: Uuid, payload: ChangePasswordPayload) -> Result<()> {
        let user = self.get_user(user_id).await?;

        let valid = verify_password(&payload.old_password, &user.password_hash)
            .map_err(|e| Error::Internal(format!("Failed to verify password: {}", e)))?;
        if !valid {
            return Err(Error::BadRequest("Current password is incorrect".to_string()));
        }

        let password_hash = hash_password(&payload.new_password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list_users(&self, query: UserListQuery) -> Result<UserList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        let search = query.search.map(|s| format!("%{}%", s.trim().to_lowercase()));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users \
             WHERE ($1::text IS NULL OR role = $1) \
               AND ($2::text IS NULL OR lower(email) LIKE $2 \
                    OR lower(first_name || ' ' || last_name) LIKE $2)",
        )
        .bind(&query.role)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::text IS NULL OR role = $1) \
               AND ($2::text IS NULL OR lower(email) LIKE $2 \
                    OR lower(first_name || ' ' || last_name) LIKE $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(&query.role)
        .bind(&search)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserList {
            items,
            total,
            page,
            per_page,
            total_pages: (total + per_page - 1) / per_page,
        })
    }

    pub async fn update_user(&self, id: Uuid, payload: UpdateUserPayload) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                 first_name = COALESCE($1, first_name), \
                 last_name = COALESCE($2, last_name), \
                 phone_number = COALESCE($3, phone_number), \
                 date_of_birth = COALESCE($4, date_of_birth), \
                 company = COALESCE($5, company), \
                 job_title = COALESCE($6, job_title), \
                 updated_at = NOW() \
             WHERE id = $7 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.phone_number)
        .bind(payload.date_of_birth)
        .bind(&payload.company)
        .bind(&payload.job_title)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Profiles are created lazily on first access.
    pub async fn get_or_create_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let existing = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(profile) = existing {
            return Ok(profile);
        }

        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "INSERT INTO user_profiles (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET updated_at = user_profiles.updated_at \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<UserProfile> {
        self.get_or_create_profile(user_id).await?;

        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "UPDATE user_profiles SET \
                 bio = COALESCE($1, bio), \
                 linkedin_url = COALESCE($2, linkedin_url), \
                 github_url = COALESCE($3, github_url), \
                 portfolio_url = COALESCE($4, portfolio_url), \
                 address = COALESCE($5, address), \
                 city = COALESCE($6, city), \
                 state = COALESCE($7, state), \
                 country = COALESCE($8, country), \
                 postal_code = COALESCE($9, postal_code), \
                 years_of_experience = COALESCE($10, years_of_experience), \
                 current_salary = COALESCE($11, current_salary), \
                 expected_salary = COALESCE($12, expected_salary), \
                 resume_url = COALESCE($13, resume_url), \
                 cover_letter_url = COALESCE($14, cover_letter_url), \
                 preferred_work_type = COALESCE($15, preferred_work_type), \
                 willing_to_relocate = COALESCE($16, willing_to_relocate), \
                 updated_at = NOW() \
             WHERE user_id = $17 \
             RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(&payload.bio)
        .bind(&payload.linkedin_url)
        .bind(&payload.github_url)
        .bind(&payload.portfolio_url)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.country)
        .bind(&payload.postal_code)
        .bind(payload.years_of_experience)
        .bind(payload.current_salary)
        .bind(payload.expected_salary)
        .bind(&payload.resume_url)
        .bind(&payload.cover_letter_url)
        .bind(&payload.preferred_work_type)
        .bind(payload.willing_to_relocate)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn profile_completion(&self, user_id: Uuid) -> Result<f64> {
        let user = self.get_user(user_id).await?;
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        let skill_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_skills WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile_completion(&user, profile.as_ref(), skill_count))
    }

    pub async fn user_stats(&self, user_id: Uuid) -> Result<UserStatsResponse> {
        let user = self.get_user(user_id).await?;

        if user.is_candidate() {
            let applications = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM job_applications WHERE candidate_id = $1",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            let screening_sessions = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM chat_sessions WHERE candidate_id = $1",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            let skills = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM user_skills WHERE user_id = $1",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            let profile_completion = self.profile_completion(user_id).await?;

            Ok(UserStatsResponse::Candidate {
                applications,
                screening_sessions,
                skills,
                profile_completion,
            })
        } else {
            let jobs_posted = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM jobs WHERE created_by = $1",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            let total_applications = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM job_applications a \
                 JOIN jobs j ON j.id = a.job_id WHERE j.created_by = $1",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
            let active_jobs = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM jobs \
                 WHERE created_by = $1 AND status = 'published' AND is_active = TRUE",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

            Ok(UserStatsResponse::Staff {
                jobs_posted,
                total_applications,
                active_jobs,
            })
        }
    }
}

/// Nine-item completion checklist over account, profile and skills, rounded to
/// two decimal places.
pub fn profile_completion(user: &User, profile: Option<&UserProfile>, skill_count: i64) -> f64 {
    let has_text = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    let mut filled = 0;
    if !user.first_name.trim().is_empty() {
        filled += 1;
    }
    if !user.last_name.trim().is_empty() {
        filled += 1;
    }
    if has_text(&user.phone_number) {
        filled += 1;
    }
    if user.date_of_birth.is_some() {
        filled += 1;
    }
    if let Some(profile) = profile {
        if has_text(&profile.bio) {
            filled += 1;
        }
        if has_text(&profile.linkedin_url) {
            filled += 1;
        }
        if profile.years_of_experience.is_some() {
            filled += 1;
        }
        if has_text(&profile.resume_url) {
            filled += 1;
        }
    }
    if skill_count > 0 {
        filled += 1;
    }

    (filled as f64 / 9.0 * 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bare_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".into(),
            password_hash: "hash".into(),
            first_name: "".into(),
            last_name: "".into(),
            role: "candidate".into(),
            phone_number: None,
            date_of_birth: None,
            company: None,
            job_title: None,
            is_active: true,
            is_verified: false,
            email_verification_token: None,
            email_verification_expires: None,
            password_reset_token: None,
            password_reset_expires: None,
            last_login_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn full_profile(user_id: Uuid) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            user_id,
            bio: Some("bio".into()),
            linkedin_url: Some("https://linkedin.com/in/jane".into()),
            github_url: None,
            portfolio_url: None,
            address: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            years_of_experience: Some(5),
            current_salary: None,
            expected_salary: None,
            resume_url: Some("https://cdn.example.com/jane.pdf".into()),
            cover_letter_url: None,
            preferred_work_type: None,
            willing_to_relocate: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn empty_everything_is_zero() {
        let user = bare_user();
        assert_eq!(profile_completion(&user, None, 0), 0.0);
    }

    #[test]
    fn all_nine_items_reach_one_hundred() {
        let mut user = bare_user();
        user.first_name = "Jane".into();
        user.last_name = "Doe".into();
        user.phone_number = Some("+1-555-0100".into());
        user.date_of_birth = NaiveDate::from_ymd_opt(1990, 1, 1);
        let profile = full_profile(user.id);
        assert_eq!(profile_completion(&user, Some(&profile), 3), 100.0);
    }

    #[test]
    fn partial_checklist_rounds_to_two_decimals() {
        let mut user = bare_user();
        user.first_name = "Jane".into();
        user.last_name = "Doe".into();
        // 2 of 9 items.
        assert_eq!(profile_completion(&user, None, 0), 22.22);
    }

    #[test]
    fn whitespace_only_fields_do_not_count() {
        let mut user = bare_user();
        user.first_name = "   ".into();
        user.phone_number = Some("  ".into());
        assert_eq!(profile_completion(&user, None, 0), 0.0);
    }
}
