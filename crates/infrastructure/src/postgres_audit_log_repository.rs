use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stratum_application::AuditLogRepository;
use stratum_core::{AppError, AppResult, TenantId};
use stratum_domain::AuditLogEntry;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for reading audit chains.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditLogRow {
    id: Uuid,
    sequence: i64,
    resource_type: String,
    resource_id: String,
    action: String,
    actor: String,
    tenant_id: Option<Uuid>,
    detail: Option<String>,
    created_at: DateTime<Utc>,
    hash: String,
    prev_hash: Option<String>,
}

impl From<AuditLogRow> for AuditLogEntry {
    fn from(row: AuditLogRow) -> Self {
        Self {
            id: row.id,
            sequence: row.sequence,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            action: row.action,
            actor: row.actor,
            tenant_id: row.tenant_id.map(TenantId::from_uuid),
            detail: row.detail,
            created_at: row.created_at,
            hash: row.hash,
            prev_hash: row.prev_hash,
        }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn list_resource_entries(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT
                id,
                sequence,
                resource_type,
                resource_id,
                action,
                actor,
                tenant_id,
                detail,
                created_at,
                hash,
                prev_hash
            FROM audit_logs
            WHERE resource_type = $1
                AND resource_id = $2
            ORDER BY created_at ASC, sequence ASC
            "#,
        )
        .bind(resource_type)
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!(
                "failed to list audit entries of {resource_type} '{resource_id}': {error}"
            ))
        })?;

        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }
}
