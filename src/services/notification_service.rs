use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::models::notification::Notification;

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, recipient_email, notification_type, title, \
     message, template, context, status, attempts, max_attempts, next_retry_at, is_read, sent_at, \
     created_at, updated_at";

#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    client: Client,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            client: Client::new(),
        }
    }

    /// Queues an email for the background sender; delivery is asynchronous.
    pub async fn queue_email(
        &self,
        recipient_id: Option<Uuid>,
        recipient_email: &str,
        title: &str,
        message: &str,
        template: Option<&str>,
        context: JsonValue,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (recipient_id, recipient_email, notification_type, title, \
                 message, template, context, status) \
             VALUES ($1, $2, 'email', $3, $4, $5, $6, 'pending') \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(recipient_id)
        .bind(recipient_email)
        .bind(title)
        .bind(message)
        .bind(template)
        .bind(&context)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    /// In-app notifications are delivered by being listed; they skip the
    /// outbox entirely.
    pub async fn create_in_app(
        &self,
        recipient_id: Uuid,
        title: &str,
        message: &str,
        context: JsonValue,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (recipient_id, notification_type, title, message, context, \
                 status, sent_at) \
             VALUES ($1, 'in_app', $2, $3, $4, 'sent', NOW()) \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(recipient_id)
        .bind(title)
        .bind(message)
        .bind(&context)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    pub async fn list_for_user(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE recipient_id = $1 AND notification_type = 'in_app' \
               AND (NOT $2 OR is_read = FALSE) \
             ORDER BY created_at DESC \
             LIMIT $3"
        ))
        .bind(recipient_id)
        .bind(unread_only)
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() \
             WHERE id = $1 AND recipient_id = $2 \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Notification not found".to_string()))?;
        Ok(notification)
    }

    pub async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() \
             WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn deliver_once(&self, id: Uuid) -> Result<()> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let config = get_config();
        let Some(gateway_url) = config.email_gateway_url.as_deref() else {
            // No gateway configured: mark sent so the queue drains in
            // development environments.
            sqlx::query(
                "UPDATE notifications SET status = 'sent', sent_at = NOW(), \
                     attempts = attempts + 1, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .execute(&self.pool)
            .await?;
            return Ok(());
        };

        let body = json!({
            "from": config.default_from_email,
            "to": notification.recipient_email,
            "subject": notification.title,
            "body": notification.message,
            "template": notification.template,
            "context": notification.context,
        });

        let outcome = self.client.post(gateway_url).json(&body).send().await;
        match outcome {
            Ok(resp) if resp.status().is_success() => {
                sqlx::query(
                    "UPDATE notifications SET status = 'sent', sent_at = NOW(), \
                         attempts = attempts + 1, updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(id)
                .execute(&self.pool)
                .await?;
            }
            Ok(resp) => {
                tracing::warn!(notification_id = %id, status = %resp.status(), "email gateway rejected notification");
                sqlx::query(
                    "UPDATE notifications SET status = 'failed', attempts = attempts + 1, \
                         updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(id)
                .execute(&self.pool)
                .await?;
            }
            Err(err) => {
                tracing::warn!(notification_id = %id, error = %err, "email delivery failed");
                sqlx::query(
                    "UPDATE notifications SET status = 'failed', attempts = attempts + 1, \
                         updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(id)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    /// Drains one pending email from the outbox. Returns false when the queue
    /// is empty; failed deliveries are rescheduled with exponential backoff
    /// until max_attempts.
    pub async fn run_once(&self) -> Result<bool> {
        let row_opt = sqlx::query(
            "SELECT id FROM notifications \
             WHERE status = 'pending' AND notification_type = 'email' \
               AND (next_retry_at IS NULL OR next_retry_at <= NOW()) \
             ORDER BY created_at ASC \
             FOR UPDATE SKIP LOCKED \
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row_opt else { return Ok(false) };
        let id: Uuid = row.try_get("id")?;

        let _ = self.deliver_once(id).await;

        let row = sqlx::query("SELECT attempts, max_attempts, status FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        let attempts: i32 = row.try_get("attempts")?;
        let max_attempts: i32 = row.try_get("max_attempts")?;
        let status: String = row.try_get("status")?;

        if status == "failed" && attempts < max_attempts {
            sqlx::query(
                "UPDATE notifications \
                 SET status = 'pending', \
                     next_retry_at = NOW() + make_interval(secs => LEAST(3600, 30 * power(2::float, GREATEST(0, attempts - 1))::int)) \
                 WHERE id = $1",
            )
            .bind(id)
            .execute(&self.pool)
            .await?;
        }

        Ok(true)
    }
}
