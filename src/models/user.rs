use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Hr,
    Interviewer,
    Candidate,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Hr => "hr",
            UserRole::Interviewer => "interviewer",
            UserRole::Candidate => "candidate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "hr" => Some(UserRole::Hr),
            "interviewer" => Some(UserRole::Interviewer),
            "candidate" => Some(UserRole::Candidate),
            _ => None,
        }
    }

    pub fn is_hr_or_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Hr)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub email_verification_token: Option<Uuid>,
    #[serde(skip_serializing)]
    pub email_verification_expires: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<Uuid>,
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn role(&self) -> UserRole {
        UserRole::parse(&self.role).unwrap_or(UserRole::Candidate)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn is_hr_or_admin(&self) -> bool {
        self.role().is_hr_or_admin()
    }

    pub fn is_candidate(&self) -> bool {
        self.role() == UserRole::Candidate
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
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

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSkill {
    pub id: Uuid,
    pub user_id: Uuid,
    pub skill_id: Uuid,
    pub level: String,
    pub years_of_experience: Option<i32>,
    pub is_primary: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_parse() {
        for role in ["admin", "hr", "interviewer", "candidate"] {
            assert_eq!(UserRole::parse(role).unwrap().as_str(), role);
        }
        assert!(UserRole::parse("superuser").is_none());
    }

    #[test]
    fn hr_and_admin_are_privileged() {
        assert!(UserRole::Admin.is_hr_or_admin());
        assert!(UserRole::Hr.is_hr_or_admin());
        assert!(!UserRole::Interviewer.is_hr_or_admin());
        assert!(!UserRole::Candidate.is_hr_or_admin());
    }
}
