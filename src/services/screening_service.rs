use chrono::Utc;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::screening_dto::CompleteSessionPayload;
use crate::error::{Error, Result};
use crate::models::application::{ApplicationStatus, JobApplication};
use crate::models::job::Job;
use crate::models::screening::{
    ChatMessage, ChatSession, MessageType, Recommendation, ScreeningResult,
};

const SESSION_COLUMNS: &str = "id, application_id, job_id, candidate_id, status, ai_model, \
     language, current_question_index, total_questions, questions_answered, overall_score, \
     technical_score, communication_score, culture_fit_score, summary, recommendations, \
     started_at, completed_at, last_activity, duration_minutes";

const MESSAGE_COLUMNS: &str = "id, session_id, message_type, content, sentiment_score, \
     confidence_score, response_time_seconds, created_at";

const RESULT_COLUMNS: &str = "id, session_id, application_id, recommendation, confidence_level, \
     strengths, weaknesses, red_flags, executive_summary, detailed_analysis, created_at";

#[derive(Clone)]
pub struct ScreeningService {
    pool: PgPool,
}

impl ScreeningService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a session for the candidate's own application. The job must have
    /// AI screening enabled and the application may hold at most one active
    /// session at a time.
    pub async fn start_session(
        &self,
        candidate_id: Uuid,
        application_id: Uuid,
    ) -> Result<(ChatSession, Option<String>)> {
        let mut tx = self.pool.begin().await?;

        let application = sqlx::query_as::<_, JobApplication>(
            "SELECT id, job_id, candidate_id, cover_letter, portfolio_url, additional_info, \
                 status, ai_screening_completed, ai_screening_score, ai_screening_summary, \
                 hr_notes, rejection_reason, applied_at, reviewed_at, updated_at \
             FROM job_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;

        if application.candidate_id != candidate_id {
            return Err(Error::Forbidden(
                "This application belongs to another candidate".to_string(),
            ));
        }
        if !application.is_open() {
            return Err(Error::BadRequest(
                "This application is no longer open".to_string(),
            ));
        }
        if application.ai_screening_completed {
            return Err(Error::Conflict(
                "Screening has already been completed for this application".to_string(),
            ));
        }

        let job = sqlx::query_as::<_, Job>(
            "SELECT id, created_by, department_id, title, slug, description, requirements, \
                 responsibilities, benefits, employment_type, experience_level, work_model, \
                 location, salary_min, salary_max, salary_currency, application_deadline, \
                 max_applications, enable_ai_screening, screening_questions, status, is_active, \
                 view_count, application_count, published_at, created_at, updated_at \
             FROM jobs WHERE id = $1",
        )
        .bind(application.job_id)
        .fetch_one(&mut *tx)
        .await?;

        if !job.enable_ai_screening {
            return Err(Error::BadRequest(
                "AI screening is not enabled for this job".to_string(),
            ));
        }

        let active = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM chat_sessions WHERE application_id = $1 AND status = 'active'",
        )
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?;
        if active.is_some() {
            return Err(Error::Conflict(
                "An active screening session already exists".to_string(),
            ));
        }

        let questions = job.screening_question_list();
        let session = sqlx::query_as::<_, ChatSession>(&format!(
            "INSERT INTO chat_sessions (application_id, job_id, candidate_id, total_questions) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(application_id)
        .bind(job.id)
        .bind(candidate_id)
        .bind(questions.len() as i32)
        .fetch_one(&mut *tx)
        .await?;

        self.insert_message(
            &mut tx,
            session.id,
            MessageType::System,
            &format!("Screening interview for {}", job.title),
            None,
        )
        .await?;

        let first_question = questions.first().cloned();
        if let Some(question) = &first_question {
            self.insert_message(&mut tx, session.id, MessageType::AiQuestion, question, None)
                .await?;
        }

        // Move the application into screening the first time a session opens.
        if application.status() == ApplicationStatus::Pending {
            sqlx::query(
                "UPDATE job_applications SET status = 'screening', updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(application_id)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "INSERT INTO application_status_history \
                     (application_id, old_status, new_status, changed_by) \
                 VALUES ($1, 'pending', 'screening', $2)",
            )
            .bind(application_id)
            .bind(candidate_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok((session, first_question))
    }

    pub async fn get_session(&self, id: Uuid) -> Result<ChatSession> {
        let session = sqlx::query_as::<_, ChatSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn list_sessions_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<ChatSession>> {
        let sessions = sqlx::query_as::<_, ChatSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions \
             WHERE candidate_id = $1 ORDER BY started_at DESC"
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    /// Records a candidate answer and serves the next question, if any.
    pub async fn record_answer(
        &self,
        session_id: Uuid,
        candidate_id: Uuid,
        content: &str,
        response_time_seconds: Option<i32>,
    ) -> Result<(ChatSession, Option<String>)> {
        let mut tx = self.pool.begin().await?;

        let mut session = self
            .lock_active_session(&mut tx, session_id, Some(candidate_id))
            .await?;

        self.insert_message(
            &mut tx,
            session_id,
            MessageType::UserResponse,
            content,
            response_time_seconds,
        )
        .await?;

        session.record_answer(Utc::now());

        let questions = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT screening_questions FROM jobs WHERE id = $1",
        )
        .bind(session.job_id)
        .fetch_one(&mut *tx)
        .await?;
        let next_question = questions
            .as_array()
            .and_then(|items| items.get(session.current_question_index as usize))
            .and_then(|q| q.as_str())
            .map(str::to_string);

        if let Some(question) = &next_question {
            self.insert_message(&mut tx, session_id, MessageType::AiQuestion, question, None)
                .await?;
        }

        let session = sqlx::query_as::<_, ChatSession>(&format!(
            "UPDATE chat_sessions \
             SET questions_answered = $1, current_question_index = $2, last_activity = NOW() \
             WHERE id = $3 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.questions_answered)
        .bind(session.current_question_index)
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((session, next_question))
    }

    /// Finalizes the session: stamps completion and duration, stores supplied
    /// scores, writes the result record, and marks screening done on the
    /// application. Staff callers may complete any session; candidates only
    /// their own, and the route rejects candidate payloads that carry scores.
    pub async fn complete_session(
        &self,
        session_id: Uuid,
        caller_id: Uuid,
        caller_is_staff: bool,
        payload: CompleteSessionPayload,
    ) -> Result<(ChatSession, ScreeningResult)> {
        let owner = if caller_is_staff { None } else { Some(caller_id) };

        let mut tx = self.pool.begin().await?;

        let mut session = self.lock_active_session(&mut tx, session_id, owner).await?;

        let now = Utc::now();
        session.complete(now);

        let session = sqlx::query_as::<_, ChatSession>(&format!(
            "UPDATE chat_sessions SET \
                 status = 'completed', completed_at = $1, last_activity = $1, \
                 duration_minutes = $2, overall_score = $3, technical_score = $4, \
                 communication_score = $5, culture_fit_score = $6, summary = $7, \
                 recommendations = $8 \
             WHERE id = $9 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(now)
        .bind(session.duration_minutes)
        .bind(payload.overall_score)
        .bind(payload.technical_score)
        .bind(payload.communication_score)
        .bind(payload.culture_fit_score)
        .bind(&payload.summary)
        .bind(&payload.recommendations)
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        let recommendation = payload
            .overall_score
            .map(|score| Recommendation::from_score(score).as_str().to_string());

        let result = sqlx::query_as::<_, ScreeningResult>(&format!(
            "INSERT INTO screening_results (session_id, application_id, recommendation, \
                 confidence_level, strengths, weaknesses, red_flags, executive_summary) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {RESULT_COLUMNS}"
        ))
        .bind(session_id)
        .bind(session.application_id)
        .bind(&recommendation)
        .bind(payload.confidence_level)
        .bind(json!(payload.strengths.unwrap_or_default()))
        .bind(json!(payload.weaknesses.unwrap_or_default()))
        .bind(json!(payload.red_flags.unwrap_or_default()))
        .bind(&payload.summary)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE job_applications SET \
                 ai_screening_completed = TRUE, ai_screening_score = $1, \
                 ai_screening_summary = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(payload.overall_score)
        .bind(&payload.summary)
        .bind(session.application_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((session, result))
    }

    pub async fn abandon_session(&self, session_id: Uuid, candidate_id: Uuid) -> Result<ChatSession> {
        let mut tx = self.pool.begin().await?;

        let mut session = self
            .lock_active_session(&mut tx, session_id, Some(candidate_id))
            .await?;
        session.abandon(Utc::now());

        let session = sqlx::query_as::<_, ChatSession>(&format!(
            "UPDATE chat_sessions SET status = 'abandoned', last_activity = NOW() \
             WHERE id = $1 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(session)
    }

    pub async fn list_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM chat_messages \
             WHERE session_id = $1 ORDER BY created_at"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    pub async fn get_result(&self, session_id: Uuid) -> Result<ScreeningResult> {
        let result = sqlx::query_as::<_, ScreeningResult>(&format!(
            "SELECT {RESULT_COLUMNS} FROM screening_results WHERE session_id = $1"
        ))
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(result)
    }

    async fn lock_active_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session_id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<ChatSession> {
        let session = sqlx::query_as::<_, ChatSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE id = $1 FOR UPDATE"
        ))
        .bind(session_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

        if owner.is_some_and(|candidate_id| session.candidate_id != candidate_id) {
            return Err(Error::Forbidden(
                "This session belongs to another candidate".to_string(),
            ));
        }
        if !session.is_active() {
            return Err(Error::BadRequest("Session is not active".to_string()));
        }
        Ok(session)
    }

    async fn insert_message(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        session_id: Uuid,
        message_type: MessageType,
        content: &str,
        response_time_seconds: Option<i32>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO chat_messages (session_id, message_type, content, response_time_seconds) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(session_id)
        .bind(message_type.as_str())
        .bind(content)
        .bind(response_time_seconds)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
