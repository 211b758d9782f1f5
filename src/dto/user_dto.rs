use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{User, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let full_name = value.full_name();
        Self {
            id: value.id,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            full_name,
            role: value.role,
            phone_number: value.phone_number,
            date_of_birth: value.date_of_birth,
            company: value.company,
            job_title: value.job_title,
            is_active: value.is_active,
            is_verified: value.is_verified,
            last_login_at: value.last_login_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub company: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub years_of_experience: Option<i32>,
    pub current_salary: Option<Decimal>,
    pub expected_salary: Option<Decimal>,
    pub resume_url: Option<String>,
    pub cover_letter_url: Option<String>,
    pub preferred_work_type: Option<String>,
    pub willing_to_relocate: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            bio: value.bio,
            linkedin_url: value.linkedin_url,
            github_url: value.github_url,
            portfolio_url: value.portfolio_url,
            address: value.address,
            city: value.city,
            state: value.state,
            country: value.country,
            postal_code: value.postal_code,
            years_of_experience: value.years_of_experience,
            current_salary: value.current_salary,
            expected_salary: value.expected_salary,
            resume_url: value.resume_url,
            cover_letter_url: value.cover_letter_url,
            preferred_work_type: value.preferred_work_type,
            willing_to_relocate: value.willing_to_relocate,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(url)]
    pub linkedin_url: Option<String>,
    #[validate(url)]
    pub github_url: Option<String>,
    #[validate(url)]
    pub portfolio_url: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    #[validate(range(min = 0, max = 80))]
    pub years_of_experience: Option<i32>,
    pub current_salary: Option<Decimal>,
    pub expected_salary: Option<Decimal>,
    pub resume_url: Option<String>,
    pub cover_letter_url: Option<String>,
    pub preferred_work_type: Option<String>,
    pub willing_to_relocate: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub role: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserStatsResponse {
    Candidate {
        applications: i64,
        screening_sessions: i64,
        skills: i64,
        profile_completion: f64,
    },
    Staff {
        jobs_posted: i64,
        total_applications: i64,
        active_jobs: i64,
    },
}
