use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{AttachSkillPayload, CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobSkill, JobStatus};
use crate::utils::text::slugify;

const JOB_COLUMNS: &str = "id, created_by, department_id, title, slug, description, requirements, \
     responsibilities, benefits, employment_type, experience_level, work_model, location, \
     salary_min, salary_max, salary_currency, application_deadline, max_applications, \
     enable_ai_screening, screening_questions, status, is_active, view_count, application_count, \
     published_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_job(&self, created_by: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let slug = self.unique_slug(&payload.title).await?;
        let questions = json!(payload.screening_questions.unwrap_or_default());

        let job = sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs (created_by, department_id, title, slug, description, requirements, \
                 responsibilities, benefits, employment_type, experience_level, work_model, \
                 location, salary_min, salary_max, salary_currency, application_deadline, \
                 max_applications, enable_ai_screening, screening_questions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                 COALESCE($9, 'full_time'), COALESCE($10, 'mid'), COALESCE($11, 'onsite'), \
                 $12, $13, $14, COALESCE($15, 'USD'), $16, $17, COALESCE($18, TRUE), $19) \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(created_by)
        .bind(payload.department_id)
        .bind(&payload.title)
        .bind(&slug)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(&payload.responsibilities)
        .bind(&payload.benefits)
        .bind(&payload.employment_type)
        .bind(&payload.experience_level)
        .bind(&payload.work_model)
        .bind(&payload.location)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(&payload.salary_currency)
        .bind(payload.application_deadline)
        .bind(payload.max_applications)
        .bind(payload.enable_ai_screening)
        .bind(&questions)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn unique_slug(&self, title: &str) -> Result<String> {
        let base = slugify(title);
        let base = if base.is_empty() { "job".to_string() } else { base };

        let mut candidate = base.clone();
        let mut suffix = 2;
        loop {
            let taken = sqlx::query_scalar::<_, Uuid>("SELECT id FROM jobs WHERE slug = $1")
                .bind(&candidate)
                .fetch_optional(&self.pool)
                .await?;
            if taken.is_none() {
                return Ok(candidate);
            }
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(job)
    }

    pub async fn get_job_by_slug(&self, slug: &str) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn increment_view_count(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE jobs SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_jobs(&self, query: JobListQuery) -> Result<JobList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        let search = query.search.map(|s| format!("%{}%", s.trim().to_lowercase()));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM jobs \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR department_id = $2) \
               AND ($3::text IS NULL OR lower(title) LIKE $3)",
        )
        .bind(&query.status)
        .bind(query.department_id)
        .bind(&search)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR department_id = $2) \
               AND ($3::text IS NULL OR lower(title) LIKE $3) \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(&query.status)
        .bind(query.department_id)
        .bind(&search)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(JobList {
            items,
            total,
            page,
            per_page,
            total_pages: (total + per_page - 1) / per_page,
        })
    }

    /// Published, active jobs with open deadlines, newest first.
    pub async fn list_public_jobs(&self, limit: i64) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE status = 'published' AND is_active = TRUE \
               AND (application_deadline IS NULL OR application_deadline > NOW()) \
             ORDER BY published_at DESC \
             LIMIT $1"
        ))
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn update_job(&self, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        if let Some(status) = payload.status.as_deref() {
            if JobStatus::parse(status).is_none() {
                return Err(Error::BadRequest(format!("Unknown job status: {}", status)));
            }
        }
        let questions = payload.screening_questions.map(|q| json!(q));

        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET \
                 title = COALESCE($1, title), \
                 description = COALESCE($2, description), \
                 requirements = COALESCE($3, requirements), \
                 responsibilities = COALESCE($4, responsibilities), \
                 benefits = COALESCE($5, benefits), \
                 department_id = COALESCE($6, department_id), \
                 employment_type = COALESCE($7, employment_type), \
                 experience_level = COALESCE($8, experience_level), \
                 work_model = COALESCE($9, work_model), \
                 location = COALESCE($10, location), \
                 salary_min = COALESCE($11, salary_min), \
                 salary_max = COALESCE($12, salary_max), \
                 salary_currency = COALESCE($13, salary_currency), \
                 application_deadline = COALESCE($14, application_deadline), \
                 max_applications = COALESCE($15, max_applications), \
                 enable_ai_screening = COALESCE($16, enable_ai_screening), \
                 screening_questions = COALESCE($17, screening_questions), \
                 status = COALESCE($18, status), \
                 is_active = COALESCE($19, is_active), \
                 updated_at = NOW() \
             WHERE id = $20 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.requirements)
        .bind(&payload.responsibilities)
        .bind(&payload.benefits)
        .bind(payload.department_id)
        .bind(&payload.employment_type)
        .bind(&payload.experience_level)
        .bind(&payload.work_model)
        .bind(&payload.location)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(&payload.salary_currency)
        .bind(payload.application_deadline)
        .bind(payload.max_applications)
        .bind(payload.enable_ai_screening)
        .bind(&questions)
        .bind(&payload.status)
        .bind(payload.is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    /// Publishing is idempotent for `published_at`: the timestamp is set on the
    /// first publish and never overwritten.
    pub async fn publish_job(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET \
                 status = 'published', \
                 is_active = TRUE, \
                 published_at = COALESCE(published_at, NOW()), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn close_job(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET status = 'closed', updated_at = NOW() WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn archive_job(&self, id: Uuid) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET status = 'archived', is_active = FALSE, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn delete_job(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Job not found".to_string()));
        }
        Ok(())
    }

    pub async fn attach_skill(&self, job_id: Uuid, payload: AttachSkillPayload) -> Result<JobSkill> {
        self.get_job(job_id).await?;

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM job_skills WHERE job_id = $1 AND skill_id = $2",
        )
        .bind(job_id)
        .bind(payload.skill_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "This skill is already attached to the job".to_string(),
            ));
        }

        let job_skill = sqlx::query_as::<_, JobSkill>(
            "INSERT INTO job_skills (job_id, skill_id, importance, min_experience_years) \
             VALUES ($1, $2, COALESCE($3, 'required'), $4) \
             RETURNING id, job_id, skill_id, importance, min_experience_years, created_at",
        )
        .bind(job_id)
        .bind(payload.skill_id)
        .bind(&payload.importance)
        .bind(payload.min_experience_years)
        .fetch_one(&self.pool)
        .await?;
        Ok(job_skill)
    }

    pub async fn detach_skill(&self, job_id: Uuid, skill_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM job_skills WHERE job_id = $1 AND skill_id = $2")
            .bind(job_id)
            .bind(skill_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Job skill not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_job_skills(&self, job_id: Uuid) -> Result<Vec<JobSkill>> {
        let skills = sqlx::query_as::<_, JobSkill>(
            "SELECT id, job_id, skill_id, importance, min_experience_years, created_at \
             FROM job_skills WHERE job_id = $1 ORDER BY created_at",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    /// Closes published jobs whose application deadline has passed. Returns the
    /// number of jobs closed; used by the background sweep.
    pub async fn close_expired_jobs(&self) -> Result<u64> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE jobs SET status = 'closed', updated_at = NOW() \
             WHERE status = 'published' AND application_deadline IS NOT NULL \
               AND application_deadline < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
