use serde_json::Value as JsonValue;
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::notification_dto::AuditListQuery;
use crate::error::Result;
use crate::models::audit_log::AuditLog;

const AUDIT_COLUMNS: &str =
    "id, user_id, action, entity_type, entity_id, details, ip_address, created_at";

#[derive(Clone)]
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        details: Option<JsonValue>,
        ip_address: Option<IpNetwork>,
    ) -> Result<AuditLog> {
        let log = sqlx::query_as::<_, AuditLog>(&format!(
            "INSERT INTO audit_logs (user_id, action, entity_type, entity_id, details, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {AUDIT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(&details)
        .bind(ip_address)
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    pub async fn list(&self, query: AuditListQuery) -> Result<Vec<AuditLog>> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * per_page;

        let logs = sqlx::query_as::<_, AuditLog>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
               AND ($2::text IS NULL OR entity_type = $2) \
               AND ($3::text IS NULL OR action = $3) \
             ORDER BY created_at DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(query.user_id)
        .bind(&query.entity_type)
        .bind(&query.action)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
