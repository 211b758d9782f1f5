use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Screening,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Interviewed,
    Offered,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Interviewed => "interviewed",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ApplicationStatus::Pending),
            "screening" => Some(ApplicationStatus::Screening),
            "under_review" => Some(ApplicationStatus::UnderReview),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "interview_scheduled" => Some(ApplicationStatus::InterviewScheduled),
            "interviewed" => Some(ApplicationStatus::Interviewed),
            "offered" => Some(ApplicationStatus::Offered),
            "hired" => Some(ApplicationStatus::Hired),
            "rejected" => Some(ApplicationStatus::Rejected),
            "withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }

    /// Statuses that stamp `reviewed_at` on first entry.
    pub fn is_reviewed_state(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::UnderReview | ApplicationStatus::Shortlisted
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobApplication {
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

/// Outcome of a status change, persisted as one history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub old_status: ApplicationStatus,
    pub new_status: ApplicationStatus,
}

impl JobApplication {
    pub fn status(&self) -> ApplicationStatus {
        ApplicationStatus::parse(&self.status).unwrap_or(ApplicationStatus::Pending)
    }

    pub fn can_withdraw(&self) -> bool {
        matches!(
            self.status(),
            ApplicationStatus::Pending
                | ApplicationStatus::Screening
                | ApplicationStatus::UnderReview
        )
    }

    pub fn is_open(&self) -> bool {
        !matches!(
            self.status(),
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn | ApplicationStatus::Hired
        )
    }

    /// Applies a status transition in place and returns the old→new pair for the
    /// history log. Any transition is accepted; `reviewed_at` is stamped only on
    /// the first entry into a reviewed state, and a non-empty note is appended to
    /// `hr_notes` with a timestamp prefix.
    pub fn apply_status_change(
        &mut self,
        new_status: ApplicationStatus,
        notes: &str,
        now: DateTime<Utc>,
    ) -> StatusChange {
        let old_status = self.status();
        self.status = new_status.as_str().to_string();
        self.updated_at = Some(now);

        if new_status.is_reviewed_state() && self.reviewed_at.is_none() {
            self.reviewed_at = Some(now);
        }

        if !notes.is_empty() {
            let existing = self.hr_notes.take().unwrap_or_default();
            let stamped = format!("{}\n\n{}: {}", existing, now.format("%Y-%m-%d %H:%M"), notes);
            self.hr_notes = Some(stamped.trim().to_string());
        }

        StatusChange {
            old_status,
            new_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationStatusHistory {
    pub id: Uuid,
    pub application_id: Uuid,
    pub old_status: String,
    pub new_status: String,
    pub notes: Option<String>,
    pub changed_by: Option<Uuid>,
    pub changed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_application() -> JobApplication {
        JobApplication {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            cover_letter: None,
            portfolio_url: None,
            additional_info: None,
            status: "pending".into(),
            ai_screening_completed: false,
            ai_screening_score: None,
            ai_screening_summary: None,
            hr_notes: None,
            rejection_reason: None,
            applied_at: Some(Utc::now()),
            reviewed_at: None,
            updated_at: Some(Utc::now()),
        }
    }

    #[test]
    fn status_change_records_old_and_new() {
        let mut app = sample_application();
        let change = app.apply_status_change(ApplicationStatus::UnderReview, "", Utc::now());
        assert_eq!(change.old_status, ApplicationStatus::Pending);
        assert_eq!(change.new_status, ApplicationStatus::UnderReview);
        assert_eq!(app.status(), ApplicationStatus::UnderReview);
    }

    #[test]
    fn reviewed_at_stamped_once() {
        let mut app = sample_application();
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();

        app.apply_status_change(ApplicationStatus::UnderReview, "", first);
        assert_eq!(app.reviewed_at, Some(first));

        app.apply_status_change(ApplicationStatus::Shortlisted, "", second);
        assert_eq!(app.reviewed_at, Some(first));
    }

    #[test]
    fn reviewed_at_not_stamped_for_other_states() {
        let mut app = sample_application();
        app.apply_status_change(ApplicationStatus::Screening, "", Utc::now());
        assert!(app.reviewed_at.is_none());
    }

    #[test]
    fn notes_appended_with_timestamp_prefix() {
        let mut app = sample_application();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        app.apply_status_change(ApplicationStatus::Shortlisted, "strong portfolio", now);
        assert_eq!(
            app.hr_notes.as_deref(),
            Some("2024-03-01 09:30: strong portfolio")
        );

        let later = Utc.with_ymd_and_hms(2024, 3, 2, 14, 0, 0).unwrap();
        app.apply_status_change(ApplicationStatus::Offered, "verbal offer made", later);
        assert_eq!(
            app.hr_notes.as_deref(),
            Some("2024-03-01 09:30: strong portfolio\n\n2024-03-02 14:00: verbal offer made")
        );
    }

    #[test]
    fn empty_notes_leave_hr_notes_untouched() {
        let mut app = sample_application();
        app.apply_status_change(ApplicationStatus::Rejected, "", Utc::now());
        assert!(app.hr_notes.is_none());
    }

    #[test]
    fn arbitrary_transitions_are_accepted() {
        // No transition validation: hired back to pending is allowed.
        let mut app = sample_application();
        app.apply_status_change(ApplicationStatus::Hired, "", Utc::now());
        let change = app.apply_status_change(ApplicationStatus::Pending, "", Utc::now());
        assert_eq!(change.old_status, ApplicationStatus::Hired);
        assert_eq!(app.status(), ApplicationStatus::Pending);
    }

    #[test]
    fn withdraw_allowed_only_early_in_the_pipeline() {
        let mut app = sample_application();
        assert!(app.can_withdraw());
        app.apply_status_change(ApplicationStatus::Offered, "", Utc::now());
        assert!(!app.can_withdraw());
    }
}
