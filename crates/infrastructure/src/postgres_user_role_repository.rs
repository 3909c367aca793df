use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stratum_application::{AuditEvent, UserRoleAssignment, UserRoleRepository};
use stratum_core::{AppError, AppResult, TenantId, UserId};
use stratum_domain::{RoleId, RoleKey, RoleLabel, UserRole};

use crate::postgres_audit_chain::append_chained_event;
use crate::postgres_errors::{is_foreign_key_violation, is_unique_violation};

/// PostgreSQL-backed repository for user-role assignments.
///
/// Assign and revoke commit together with their chained audit entry.
#[derive(Clone)]
pub struct PostgresUserRoleRepository {
    pool: PgPool,
}

impl PostgresUserRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    user_id: Uuid,
    tenant_id: Uuid,
    role_id: Uuid,
    role_key: String,
    role_label: String,
    assigned_at: DateTime<Utc>,
}

impl AssignmentRow {
    fn into_assignment(self) -> AppResult<UserRoleAssignment> {
        let role_key = RoleKey::new(self.role_key)
            .map_err(|error| AppError::Store(format!("stored role key is invalid: {error}")))?;
        let role_label = RoleLabel::new(self.role_label)
            .map_err(|error| AppError::Store(format!("stored role label is invalid: {error}")))?;

        Ok(UserRoleAssignment {
            assignment: UserRole::new(
                UserId::from_uuid(self.user_id),
                TenantId::from_uuid(self.tenant_id),
                RoleId::from_uuid(self.role_id),
            ),
            role_key,
            role_label,
            assigned_at: self.assigned_at,
        })
    }
}

#[async_trait]
impl UserRoleRepository for PostgresUserRoleRepository {
    async fn assign(&self, assignment: UserRole, audit: AuditEvent) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Store(format!("failed to begin assignment transaction: {error}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, tenant_id, role_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.tenant_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!(
                    "user '{}' already holds role '{}' in tenant '{}'",
                    assignment.user_id, assignment.role_id, assignment.tenant_id
                ));
            }
            if is_foreign_key_violation(&error) {
                return AppError::NotFound(format!(
                    "role '{}' does not exist",
                    assignment.role_id
                ));
            }
            AppError::Store(format!("failed to assign role: {error}"))
        })?;

        append_chained_event(&mut transaction, audit).await?;
        transaction.commit().await.map_err(|error| {
            AppError::Store(format!("failed to commit assignment: {error}"))
        })
    }

    async fn revoke(&self, assignment: UserRole, audit: AuditEvent) -> AppResult<bool> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Store(format!("failed to begin revocation transaction: {error}"))
        })?;

        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1
                AND tenant_id = $2
                AND role_id = $3
            "#,
        )
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.tenant_id.as_uuid())
        .bind(assignment.role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Store(format!("failed to revoke role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Ok(false);
        }

        append_chained_event(&mut transaction, audit).await?;
        transaction.commit().await.map_err(|error| {
            AppError::Store(format!("failed to commit revocation: {error}"))
        })?;

        Ok(true)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT
                user_roles.user_id,
                user_roles.tenant_id,
                user_roles.role_id,
                roles.key AS role_key,
                roles.label AS role_label,
                user_roles.created_at AS assigned_at
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
                AND ($2::UUID IS NULL OR user_roles.tenant_id = $2)
            ORDER BY user_roles.tenant_id, roles.key
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!(
                "failed to list role assignments of user '{user_id}': {error}"
            ))
        })?;

        rows.into_iter().map(AssignmentRow::into_assignment).collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use sqlx::migrate::Migrator;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    use stratum_application::{
        AuditEvent, AuditLogRepository, USER_ROLE_RESOURCE_TYPE, UserRoleRepository,
    };
    use stratum_core::{AppError, TenantId, UserId};
    use stratum_domain::{AuditAction, RoleId, UserRole};

    use crate::PostgresAuditLogRepository;

    use super::PostgresUserRoleRepository;

    static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

    async fn test_pool() -> Option<PgPool> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
        {
            Ok(pool) => pool,
            Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
        };

        if let Err(error) = MIGRATOR.run(&pool).await {
            panic!("failed to run migrations for postgres assignment tests: {error}");
        }

        Some(pool)
    }

    async fn seeded_role(pool: &PgPool, key: &str) -> RoleId {
        let Ok(role_id) = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE key = $1")
            .bind(key)
            .fetch_one(pool)
            .await
        else {
            panic!("role '{key}' should be seeded");
        };
        RoleId::from_uuid(role_id)
    }

    fn audit(assignment: UserRole, action: AuditAction, actor: &str) -> AuditEvent {
        AuditEvent {
            tenant_id: Some(assignment.tenant_id),
            actor: actor.to_owned(),
            action,
            resource_type: USER_ROLE_RESOURCE_TYPE.to_owned(),
            resource_id: assignment.resource_id(),
            detail: None,
        }
    }

    fn assigned(assignment: UserRole) -> AuditEvent {
        audit(assignment, AuditAction::UserRoleAssigned, "operator")
    }

    fn revoked(assignment: UserRole) -> AuditEvent {
        audit(assignment, AuditAction::UserRoleRevoked, "operator")
    }

    #[tokio::test]
    async fn revoke_matches_the_full_triple() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let repository = PostgresUserRoleRepository::new(pool.clone());
        let role_id = seeded_role(&pool, "admin").await;
        let user_id = UserId::new();
        let first = UserRole::new(user_id, TenantId::new(), role_id);
        let second = UserRole::new(user_id, TenantId::new(), role_id);

        assert!(repository.assign(first, assigned(first)).await.is_ok());
        assert!(repository.assign(second, assigned(second)).await.is_ok());
        let duplicate = repository.assign(first, assigned(first)).await;
        let removed = repository.revoke(first, revoked(first)).await;
        let removed_again = repository.revoke(first, revoked(first)).await;
        let Ok(remaining) = repository.list_for_user(user_id, None).await else {
            panic!("assignments should list");
        };
        let Ok(history) = PostgresAuditLogRepository::new(pool.clone())
            .list_resource_entries(USER_ROLE_RESOURCE_TYPE, &first.resource_id())
            .await
        else {
            panic!("history should list");
        };

        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
        assert_eq!(removed.ok(), Some(true));
        assert_eq!(removed_again.ok(), Some(false));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].assignment, second);
        assert_eq!(remaining[0].role_key.as_str(), "admin");
        assert_eq!(history.len(), 2);

        let _ = repository.revoke(second, revoked(second)).await;
    }

    #[tokio::test]
    async fn assigning_unknown_role_is_not_found() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let repository = PostgresUserRoleRepository::new(pool);

        let assignment = UserRole::new(UserId::new(), TenantId::new(), RoleId::new());

        let result = repository.assign(assignment, assigned(assignment)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn failed_audit_append_keeps_the_assignment_out() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let repository = PostgresUserRoleRepository::new(pool.clone());
        let user_id = UserId::new();
        let assignment = UserRole::new(user_id, TenantId::new(), seeded_role(&pool, "admin").await);

        let failed = repository
            .assign(assignment, audit(assignment, AuditAction::UserRoleAssigned, ""))
            .await;
        let Ok(after_failure) = repository.list_for_user(user_id, None).await else {
            panic!("assignments should list");
        };
        let retried = repository.assign(assignment, assigned(assignment)).await;

        assert!(matches!(failed, Err(AppError::Store(_))));
        assert!(after_failure.is_empty());
        assert!(retried.is_ok(), "{retried:?}");

        let _ = repository.revoke(assignment, revoked(assignment)).await;
    }
}
