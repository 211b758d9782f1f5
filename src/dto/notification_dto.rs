use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::audit_log::AuditLog;
use crate::models::notification::Notification;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id,
            notification_type: value.notification_type,
            title: value.title,
            message: value.message,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotificationListQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub details: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(value: AuditLog) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            action: value.action,
            entity_type: value.entity_type,
            entity_id: value.entity_id,
            details: value.details,
            ip_address: value.ip_address.map(|ip| ip.to_string()),
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub user_id: Option<Uuid>,
    pub entity_type: Option<String>,
    pub action: Option<String>,
}
