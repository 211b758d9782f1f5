use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
            SessionStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            "abandoned" => Some(SessionStatus::Abandoned),
            "error" => Some(SessionStatus::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    System,
    AiQuestion,
    UserResponse,
    AiFollowup,
    Clarification,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::System => "system",
            MessageType::AiQuestion => "ai_question",
            MessageType::UserResponse => "user_response",
            MessageType::AiFollowup => "ai_followup",
            MessageType::Clarification => "clarification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StrongPass,
    Pass,
    ConditionalPass,
    Fail,
    StrongFail,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongPass => "strong_pass",
            Recommendation::Pass => "pass",
            Recommendation::ConditionalPass => "conditional_pass",
            Recommendation::Fail => "fail",
            Recommendation::StrongFail => "strong_fail",
        }
    }

    /// Maps an overall score in [0,100] onto a recommendation band.
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Recommendation::StrongPass
        } else if score >= 70.0 {
            Recommendation::Pass
        } else if score >= 55.0 {
            Recommendation::ConditionalPass
        } else if score >= 35.0 {
            Recommendation::Fail
        } else {
            Recommendation::StrongFail
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
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
    pub overall_score: Option<f64>,
    pub technical_score: Option<f64>,
    pub communication_score: Option<f64>,
    pub culture_fit_score: Option<f64>,
    pub summary: Option<String>,
    pub recommendations: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
}

impl ChatSession {
    pub fn status(&self) -> SessionStatus {
        SessionStatus::parse(&self.status).unwrap_or(SessionStatus::Error)
    }

    pub fn is_active(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    pub fn progress_percentage(&self) -> f64 {
        progress_percentage(self.total_questions, self.questions_answered)
    }

    /// Marks the session completed and derives `duration_minutes` from elapsed
    /// wall-clock time.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Completed.as_str().to_string();
        self.completed_at = Some(now);
        self.last_activity = Some(now);
        if let Some(started) = self.started_at {
            self.duration_minutes = Some(((now - started).num_seconds() / 60) as i32);
        }
    }

    pub fn abandon(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Abandoned.as_str().to_string();
        self.last_activity = Some(now);
    }

    /// Counts one answered question, capped at `total_questions`.
    pub fn record_answer(&mut self, now: DateTime<Utc>) {
        if self.questions_answered < self.total_questions {
            self.questions_answered += 1;
        }
        self.current_question_index = self.questions_answered;
        self.last_activity = Some(now);
    }

    pub fn all_questions_answered(&self) -> bool {
        self.total_questions > 0 && self.questions_answered >= self.total_questions
    }
}

pub fn progress_percentage(total_questions: i32, questions_answered: i32) -> f64 {
    if total_questions <= 0 {
        return 0.0;
    }
    (questions_answered as f64 / total_questions as f64) * 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub message_type: String,
    pub content: String,
    pub sentiment_score: Option<f64>,
    pub confidence_score: Option<f64>,
    pub response_time_seconds: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningResult {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_session(total: i32) -> ChatSession {
        ChatSession {
            id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            status: "active".into(),
            ai_model: "gpt-4".into(),
            language: "en".into(),
            current_question_index: 0,
            total_questions: total,
            questions_answered: 0,
            overall_score: None,
            technical_score: None,
            communication_score: None,
            culture_fit_score: None,
            summary: None,
            recommendations: None,
            started_at: Some(Utc::now()),
            completed_at: None,
            last_activity: Some(Utc::now()),
            duration_minutes: None,
        }
    }

    #[test]
    fn progress_is_a_simple_ratio() {
        assert_eq!(progress_percentage(10, 4), 40.0);
        assert_eq!(progress_percentage(0, 0), 0.0);
        assert_eq!(progress_percentage(0, 5), 0.0);
        assert_eq!(progress_percentage(3, 3), 100.0);
    }

    #[test]
    fn complete_derives_duration_from_wall_clock() {
        let started = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut session = sample_session(5);
        session.started_at = Some(started);

        session.complete(started + Duration::minutes(15));
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.duration_minutes, Some(15));
        assert!(session.completed_at.is_some());
    }

    #[test]
    fn abandon_is_terminal_without_duration() {
        let mut session = sample_session(5);
        session.abandon(Utc::now());
        assert_eq!(session.status(), SessionStatus::Abandoned);
        assert!(session.status().is_terminal());
        assert!(session.duration_minutes.is_none());
    }

    #[test]
    fn answers_never_exceed_total_questions() {
        let mut session = sample_session(2);
        let now = Utc::now();
        session.record_answer(now);
        session.record_answer(now);
        session.record_answer(now);
        assert_eq!(session.questions_answered, 2);
        assert!(session.all_questions_answered());
    }

    #[test]
    fn recommendation_bands() {
        assert_eq!(Recommendation::from_score(92.0), Recommendation::StrongPass);
        assert_eq!(Recommendation::from_score(70.0), Recommendation::Pass);
        assert_eq!(
            Recommendation::from_score(60.0),
            Recommendation::ConditionalPass
        );
        assert_eq!(Recommendation::from_score(40.0), Recommendation::Fail);
        assert_eq!(Recommendation::from_score(10.0), Recommendation::StrongFail);
    }
}
