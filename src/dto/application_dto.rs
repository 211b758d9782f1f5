use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{ApplicationStatusHistory, JobApplication};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyPayload {
    pub job_id: Uuid,
    pub cover_letter: Option<String>,
    #[validate(url)]
    pub portfolio_url: Option<String>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStatusPayload {
    #[validate(length(min = 1))]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub cover_letter: Option<String>,
    pub portfolio_url: Option<String>,
    pub additional_info: Option<String>,
    pub status: String,
    pub ai_screening_completed: bool,
    pub ai_screening_score: Option<f64>,
    pub ai_screening_summary: Option<String>,
    pub hr_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<JobApplication> for ApplicationResponse {
    fn from(value: JobApplication) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            candidate_id: value.candidate_id,
            cover_letter: value.cover_letter,
            portfolio_url: value.portfolio_url,
            additional_info: value.additional_info,
            status: value.status,
            ai_screening_completed: value.ai_screening_completed,
            ai_screening_score: value.ai_screening_score,
            ai_screening_summary: value.ai_screening_summary,
            hr_notes: value.hr_notes,
            rejection_reason: value.rejection_reason,
            applied_at: value.applied_at,
            reviewed_at: value.reviewed_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryResponse {
    pub id: Uuid,
    pub application_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub notes: Option<String>,
    pub changed_by: Option<Uuid>,
    pub changed_at: Option<DateTime<Utc>>,
}

impl From<ApplicationStatusHistory> for StatusHistoryResponse {
    fn from(value: ApplicationStatusHistory) -> Self {
        Self {
            id: value.id,
            application_id: value.application_id,
            old_status: value.old_status,
            new_status: value.new_status,
            notes: value.notes,
            changed_by: value.changed_by,
            changed_at: value.changed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub job_id: Option<Uuid>,
}
