use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::{ApplicationListQuery, ApplyPayload};
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationStatus, ApplicationStatusHistory, JobApplication, StatusChange,
};
use crate::models::job::Job;

const APPLICATION_COLUMNS: &str = "id, job_id, candidate_id, cover_letter, portfolio_url, \
     additional_info, status, ai_screening_completed, ai_screening_score, ai_screening_summary, \
     hr_notes, rejection_reason, applied_at, reviewed_at, updated_at";

const HISTORY_COLUMNS: &str =
    "id, application_id, old_status, new_status, notes, changed_by, changed_at";

#[derive(Debug, Clone)]
pub struct ApplicationList {
    pub items: Vec<JobApplication>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn apply(&self, candidate_id: Uuid, payload: ApplyPayload) -> Result<JobApplication> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(
            "SELECT id, created_by, department_id, title, slug, description, requirements, \
                 responsibilities, benefits, employment_type, experience_level, work_model, \
                 location, salary_min, salary_max, salary_currency, application_deadline, \
                 max_applications, enable_ai_screening, screening_questions, status, is_active, \
                 view_count, application_count, published_at, created_at, updated_at \
             FROM jobs WHERE id = $1 FOR UPDATE",
        )
        .bind(payload.job_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".to_string()))?;

        if !job.is_open_for_applications(Utc::now()) {
            return Err(Error::BadRequest(
                "This job is not accepting applications".to_string(),
            ));
        }

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM job_applications WHERE job_id = $1 AND candidate_id = $2",
        )
        .bind(payload.job_id)
        .bind(candidate_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "You have already applied to this job".to_string(),
            ));
        }

        let application = sqlx::query_as::<_, JobApplication>(&format!(
            "INSERT INTO job_applications (job_id, candidate_id, cover_letter, portfolio_url, \
                 additional_info) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(payload.job_id)
        .bind(candidate_id)
        .bind(&payload.cover_letter)
        .bind(&payload.portfolio_url)
        .bind(&payload.additional_info)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE jobs SET application_count = application_count + 1 WHERE id = $1")
            .bind(payload.job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(application)
    }

    pub async fn get_application(&self, id: Uuid) -> Result<JobApplication> {
        let application = sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(application)
    }

    /// Applies a status change and records one history row, atomically. Any
    /// old to new transition is accepted.
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: &str,
        notes: Option<&str>,
        changed_by: Option<Uuid>,
    ) -> Result<(JobApplication, StatusChange)> {
        self.transition(id, new_status, notes, changed_by, |_| Ok(()))
            .await
    }

    /// Candidates may withdraw only while the application is still early in
    /// the pipeline. Ownership and pipeline-stage checks run under the same
    /// row lock as the update.
    pub async fn withdraw(
        &self,
        id: Uuid,
        candidate_id: Uuid,
    ) -> Result<(JobApplication, StatusChange)> {
        self.transition(
            id,
            ApplicationStatus::Withdrawn.as_str(),
            None,
            Some(candidate_id),
            |application| {
                if application.candidate_id != candidate_id {
                    return Err(Error::Forbidden(
                        "This application belongs to another candidate".to_string(),
                    ));
                }
                if !application.can_withdraw() {
                    return Err(Error::BadRequest(
                        "This application can no longer be withdrawn".to_string(),
                    ));
                }
                Ok(())
            },
        )
        .await
    }

    async fn transition<F>(
        &self,
        id: Uuid,
        new_status: &str,
        notes: Option<&str>,
        changed_by: Option<Uuid>,
        guard: F,
    ) -> Result<(JobApplication, StatusChange)>
    where
        F: FnOnce(&JobApplication) -> Result<()>,
    {
        let new_status = ApplicationStatus::parse(new_status)
            .ok_or_else(|| Error::BadRequest(format!("Unknown application status: {}", new_status)))?;

        let mut tx = self.pool.begin().await?;

        let mut application = sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;

        guard(&application)?;

        let now = Utc::now();
        let notes = notes.unwrap_or("").trim();
        let change = application.apply_status_change(new_status, notes, now);

        let application = sqlx::query_as::<_, JobApplication>(&format!(
            "UPDATE job_applications \
             SET status = $1, hr_notes = $2, reviewed_at = $3, updated_at = $4 \
             WHERE id = $5 \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(&application.status)
        .bind(&application.hr_notes)
        .bind(application.reviewed_at)
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO application_status_history \
                 (application_id, old_status, new_status, notes, changed_by) \
             VALUES ($1, $2, $3, NULLIF($4, ''), $5)",
        )
        .bind(id)
        .bind(change.old_status.as_str())
        .bind(change.new_status.as_str())
        .bind(notes)
        .bind(changed_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((application, change))
    }

    pub async fn list_for_candidate(
        &self,
        candidate_id: Uuid,
        query: ApplicationListQuery,
    ) -> Result<ApplicationList> {
        self.list(query, Some(candidate_id)).await
    }

    pub async fn list_all(&self, query: ApplicationListQuery) -> Result<ApplicationList> {
        self.list(query, None).await
    }

    async fn list(
        &self,
        query: ApplicationListQuery,
        candidate_id: Option<Uuid>,
    ) -> Result<ApplicationList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM job_applications \
             WHERE ($1::uuid IS NULL OR candidate_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::uuid IS NULL OR job_id = $3)",
        )
        .bind(candidate_id)
        .bind(&query.status)
        .bind(query.job_id)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications \
             WHERE ($1::uuid IS NULL OR candidate_id = $1) \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::uuid IS NULL OR job_id = $3) \
             ORDER BY applied_at DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(candidate_id)
        .bind(&query.status)
        .bind(query.job_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(ApplicationList {
            items,
            total,
            page,
            per_page,
            total_pages: (total + per_page - 1) / per_page,
        })
    }

    pub async fn status_history(&self, application_id: Uuid) -> Result<Vec<ApplicationStatusHistory>> {
        let history = sqlx::query_as::<_, ApplicationStatusHistory>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM application_status_history \
             WHERE application_id = $1 ORDER BY changed_at DESC"
        ))
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(history)
    }
}
