use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::job::Job;
use crate::services::job_service::JobList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub benefits: Option<String>,
    pub department_id: Option<Uuid>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub work_model: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_applications: Option<i32>,
    pub enable_ai_screening: Option<bool>,
    pub screening_questions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub benefits: Option<String>,
    pub department_id: Option<Uuid>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    pub work_model: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_applications: Option<i32>,
    pub enable_ai_screening: Option<bool>,
    pub screening_questions: Option<Vec<String>>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub created_by: Uuid,
    pub department_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub benefits: Option<String>,
    pub employment_type: String,
    pub experience_level: String,
    pub work_model: String,
    pub location: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    pub application_deadline: Option<DateTime<Utc>>,
    pub max_applications: Option<i32>,
    pub enable_ai_screening: bool,
    pub screening_questions: JsonValue,
    pub status: String,
    pub is_active: bool,
    pub view_count: i32,
    pub application_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            created_by: value.created_by,
            department_id: value.department_id,
            title: value.title,
            slug: value.slug,
            description: value.description,
            requirements: value.requirements,
            responsibilities: value.responsibilities,
            benefits: value.benefits,
            employment_type: value.employment_type,
            experience_level: value.experience_level,
            work_model: value.work_model,
            location: value.location,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            salary_currency: value.salary_currency,
            application_deadline: value.application_deadline,
            max_applications: value.max_applications,
            enable_ai_screening: value.enable_ai_screening,
            screening_questions: value.screening_questions,
            status: value.status,
            is_active: value.is_active,
            view_count: value.view_count,
            application_count: value.application_count,
            published_at: value.published_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicJobSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub employment_type: String,
    pub experience_level: String,
    pub work_model: String,
    pub location: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Job> for PublicJobSummary {
    fn from(value: Job) -> Self {
        let summary = {
            let trimmed = value.description.trim();
            if trimmed.is_empty() {
                None
            } else if trimmed.chars().count() > 320 {
                Some(format!("{}…", trimmed.chars().take(320).collect::<String>()))
            } else {
                Some(trimmed.to_string())
            }
        };

        Self {
            id: value.id,
            title: value.title,
            slug: value.slug,
            employment_type: value.employment_type,
            experience_level: value.experience_level,
            work_model: value.work_model,
            location: value.location,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            salary_currency: value.salary_currency,
            summary,
            published_at: value.published_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<JobList> for JobListResponse {
    fn from(value: JobList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub department_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublicJobQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachSkillPayload {
    pub skill_id: Uuid,
    pub importance: Option<String>,
    #[validate(range(min = 0, max = 80))]
    pub min_experience_years: Option<i32>,
}
