use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::screening::{ChatMessage, ChatSession, ScreeningResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionPayload {
    pub application_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerPayload {
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(range(min = 0))]
    pub response_time_seconds: Option<i32>,
}

/// Scores are clamped to [0,100] here at the validation layer; business logic
/// does not re-check them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteSessionPayload {
    #[validate(range(min = 0.0, max = 100.0))]
    pub overall_score: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub technical_score: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub communication_score: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub culture_fit_score: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence_level: Option<f64>,
    pub summary: Option<String>,
    pub recommendations: Option<String>,
    pub strengths: Option<Vec<String>>,
    pub weaknesses: Option<Vec<String>>,
    pub red_flags: Option<Vec<String>>,
}

impl CompleteSessionPayload {
    /// True when the payload assigns any evaluation score. Only staff callers
    /// may submit such payloads.
    pub fn carries_scores(&self) -> bool {
        self.overall_score.is_some()
            || self.technical_score.is_some()
            || self.communication_score.is_some()
            || self.culture_fit_score.is_some()
            || self.confidence_level.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub application_id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: String,
    pub ai_model: String,
    pub language: String,
    pub current_question_index: i32,
    pub total_questions: i32,
    pub questions_answered: i32,
    pub progress_percentage: f64,
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub culture_fit_score: Option<f64>,
    pub summary: Option<String>,
    pub recommendations: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
}

impl From<ChatSession> for SessionResponse {
    fn from(value: ChatSession) -> Self {
        let progress_percentage = value.progress_percentage();
        Self {
            id: value.id,
            application_id: value.application_id,
            job_id: value.job_id,
            candidate_id: value.candidate_id,
            status: value.status,
            ai_model: value.ai_model,
            language: value.language,
            current_question_index: value.current_question_index,
            total_questions: value.total_questions,
            questions_answered: value.questions_answered,
            progress_percentage,
            overall_score: value.overall_score,
            technical_score: value.technical_score,
            communication_score: value.communication_score,
            culture_fit_score: value.culture_fit_score,
            summary: value.summary,
            recommendations: value.recommendations,
            started_at: value.started_at,
            completed_at: value.completed_at,
            duration_minutes: value.duration_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub message_type: String,
    pub content: String,
    pub sentiment_score: Option<f64>,
    pub confidence_score: Option<f64>,
    pub response_time_seconds: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(value: ChatMessage) -> Self {
        Self {
            id: value.id,
            session_id: value.session_id,
            message_type: value.message_type,
            content: value.content,
            sentiment_score: value.sentiment_score,
            confidence_score: value.confidence_score,
            response_time_seconds: value.response_time_seconds,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub session: SessionResponse,
    pub next_question: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResultResponse {
    pub id: Uuid,
    pub session_id: Uuid,
    pub application_id: Uuid,
    pub recommendation: Option<String>,
    pub confidence_level: Option<f64>,
    pub strengths: JsonValue,
    pub weaknesses: JsonValue,
    pub red_flags: JsonValue,
    pub executive_summary: Option<String>,
    pub detailed_analysis: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ScreeningResult> for ScreeningResultResponse {
    fn from(value: ScreeningResult) -> Self {
        Self {
            id: value.id,
            session_id: value.session_id,
            application_id: value.application_id,
            recommendation: value.recommendation,
            confidence_level: value.confidence_level,
            strengths: value.strengths,
            weaknesses: value.weaknesses,
            red_flags: value.red_flags,
            executive_summary: value.executive_summary,
            detailed_analysis: value.detailed_analysis,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_scores_are_rejected() {
        let payload = CompleteSessionPayload {
            overall_score: Some(140.0),
            technical_score: None,
            communication_score: None,
            culture_fit_score: None,
            confidence_level: None,
            summary: None,
            recommendations: None,
            strengths: None,
            weaknesses: None,
            red_flags: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn boundary_scores_are_accepted() {
        let payload = CompleteSessionPayload {
            overall_score: Some(100.0),
            technical_score: Some(0.0),
            communication_score: None,
            culture_fit_score: None,
            confidence_level: Some(1.0),
            summary: None,
            recommendations: None,
            strengths: None,
            weaknesses: None,
            red_flags: None,
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn score_bearing_payloads_are_flagged() {
        let mut payload = CompleteSessionPayload {
            overall_score: None,
            technical_score: None,
            communication_score: None,
            culture_fit_score: None,
            confidence_level: None,
            summary: Some("Good conversation".into()),
            recommendations: None,
            strengths: Some(vec!["communication".into()]),
            weaknesses: None,
            red_flags: None,
        };
        assert!(!payload.carries_scores());

        payload.confidence_level = Some(0.8);
        assert!(payload.carries_scores());

        payload.confidence_level = None;
        payload.technical_score = Some(70.0);
        assert!(payload.carries_scores());
    }
}
