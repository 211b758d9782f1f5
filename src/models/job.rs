use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Published => "published",
            JobStatus::Closed => "closed",
            JobStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(JobStatus::Draft),
            "published" => Some(JobStatus::Published),
            "closed" => Some(JobStatus::Closed),
            "archived" => Some(JobStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
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

impl Job {
    pub fn status(&self) -> JobStatus {
        JobStatus::parse(&self.status).unwrap_or(JobStatus::Draft)
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some() && self.status() == JobStatus::Published
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.application_deadline
            .map(|deadline| now > deadline)
            .unwrap_or(false)
    }

    pub fn is_open_for_applications(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.status() != JobStatus::Published || self.is_expired(now) {
            return false;
        }
        match self.max_applications {
            Some(max) => self.application_count < max,
            None => true,
        }
    }

    /// Screening questions as plain strings, skipping malformed entries.
    pub fn screening_question_list(&self) -> Vec<String> {
        self.screening_questions
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|q| q.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSkill {
    pub id: Uuid,
    pub job_id: Uuid,
    pub skill_id: Uuid,
    pub importance: String,
    pub min_experience_years: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_job() -> Job {
        Job {
            id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            department_id: None,
            title: "Backend Engineer".into(),
            slug: "backend-engineer".into(),
            description: "desc".into(),
            requirements: None,
            responsibilities: None,
            benefits: None,
            employment_type: "full_time".into(),
            experience_level: "mid".into(),
            work_model: "remote".into(),
            location: None,
            salary_min: None,
            salary_max: None,
            salary_currency: "USD".into(),
            application_deadline: None,
            max_applications: None,
            enable_ai_screening: true,
            screening_questions: serde_json::json!(["Tell me about yourself"]),
            status: "published".into(),
            is_active: true,
            view_count: 0,
            application_count: 0,
            published_at: Some(Utc::now()),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn published_active_job_is_open() {
        let job = sample_job();
        assert!(job.is_open_for_applications(Utc::now()));
    }

    #[test]
    fn deadline_in_the_past_closes_applications() {
        let mut job = sample_job();
        let now = Utc::now();
        job.application_deadline = Some(now - Duration::hours(1));
        assert!(job.is_expired(now));
        assert!(!job.is_open_for_applications(now));
    }

    #[test]
    fn application_cap_closes_applications() {
        let mut job = sample_job();
        job.max_applications = Some(2);
        job.application_count = 2;
        assert!(!job.is_open_for_applications(Utc::now()));
    }

    #[test]
    fn draft_job_is_not_open() {
        let mut job = sample_job();
        job.status = "draft".into();
        assert!(!job.is_open_for_applications(Utc::now()));
    }

    #[test]
    fn screening_questions_skip_non_strings() {
        let mut job = sample_job();
        job.screening_questions = serde_json::json!(["one", 2, "three"]);
        assert_eq!(job.screening_question_list(), vec!["one", "three"]);
    }
}
