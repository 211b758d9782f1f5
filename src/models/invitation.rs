use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub token: Uuid,
    pub invited_by: Uuid,
    pub message: Option<String>,
    pub is_accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Expiry is computed, not stored; acceptance of an expired invitation is
    /// blocked by the caller, not here.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_invitation(expires_at: DateTime<Utc>) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            email: "invitee@example.com".into(),
            role: "interviewer".into(),
            token: Uuid::new_v4(),
            invited_by: Uuid::new_v4(),
            message: None,
            is_accepted: false,
            accepted_at: None,
            expires_at,
            created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn past_expiry_reports_expired() {
        let now = Utc::now();
        let invitation = sample_invitation(now - Duration::hours(1));
        assert!(invitation.is_expired(now));
    }

    #[test]
    fn future_expiry_is_not_expired() {
        let now = Utc::now();
        let invitation = sample_invitation(now + Duration::days(3));
        assert!(!invitation.is_expired(now));
    }
}
