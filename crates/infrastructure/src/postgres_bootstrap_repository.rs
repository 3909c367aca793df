use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use stratum_application::{BootstrapOutcome, BootstrapRepository, bootstrap_audit_event};
use stratum_core::{AppError, AppResult, TenantId, UserId};
use stratum_domain::{RoleId, RoleKey, SystemRole, UserRole};

use crate::postgres_audit_chain::append_chained_event;

/// PostgreSQL-backed single-use bootstrap state.
#[derive(Clone)]
pub struct PostgresBootstrapRepository {
    pool: PgPool,
}

impl PostgresBootstrapRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn privileged_assignment_exists(
    transaction: &mut Transaction<'_, Postgres>,
) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            WHERE roles.key = ANY($1)
        )
        "#,
    )
    .bind(SystemRole::reserved_keys())
    .fetch_one(&mut **transaction)
    .await
    .map_err(|error| {
        AppError::Store(format!("failed to check privileged assignments: {error}"))
    })
}

#[async_trait]
impl BootstrapRepository for PostgresBootstrapRepository {
    async fn consume(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        role_key: &RoleKey,
    ) -> AppResult<BootstrapOutcome> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Store(format!("failed to begin bootstrap transaction: {error}"))
        })?;

        let consumed_at = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT consumed_at FROM bootstrap_state WHERE id = TRUE FOR UPDATE",
        )
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Store(format!("failed to lock bootstrap state: {error}")))?;

        if consumed_at.is_some() {
            return Ok(BootstrapOutcome::AlreadyConsumed);
        }

        if privileged_assignment_exists(&mut transaction).await? {
            return Ok(BootstrapOutcome::PrivilegedRoleExists);
        }

        let role_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE key = $1")
            .bind(role_key.as_str())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to resolve role '{role_key}': {error}"))
            })?
            .map(RoleId::from_uuid)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_key}' does not exist")))?;

        let assignment = UserRole::new(user_id, tenant_id, role_id);
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, tenant_id, role_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Store(format!("failed to grant bootstrap role: {error}")))?;

        sqlx::query(
            r#"
            UPDATE bootstrap_state
            SET consumed_at = now(), consumed_by = $1
            WHERE id = TRUE
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Store(format!("failed to consume bootstrap state: {error}")))?;

        append_chained_event(&mut transaction, bootstrap_audit_event(&assignment, role_key))
            .await?;
        transaction.commit().await.map_err(|error| {
            AppError::Store(format!("failed to commit bootstrap transaction: {error}"))
        })?;

        Ok(BootstrapOutcome::Granted(assignment))
    }

    async fn is_available(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT
                state.consumed_at IS NULL
                AND NOT EXISTS (
                    SELECT 1
                    FROM user_roles
                    INNER JOIN roles
                        ON roles.id = user_roles.role_id
                    WHERE roles.key = ANY($1)
                )
            FROM bootstrap_state AS state
            WHERE state.id = TRUE
            "#,
        )
        .bind(SystemRole::reserved_keys())
        .fetch_optional(&self.pool)
        .await
        .map(|available| available.unwrap_or(false))
        .map_err(|error| AppError::Store(format!("failed to read bootstrap state: {error}")))
    }
}
