use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use stratum_application::AuthorizationRepository;
use stratum_core::{AppError, AppResult, UserId};
use stratum_domain::RoleId;

/// PostgreSQL-backed repository for principal role lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        let role_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT role_id
            FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!("failed to load roles of user '{user_id}': {error}"))
        })?;

        Ok(role_ids.into_iter().map(RoleId::from_uuid).collect())
    }

    async fn list_role_keys(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>> {
        let role_ids: Vec<Uuid> = role_ids.iter().map(RoleId::as_uuid).collect();

        sqlx::query_scalar::<_, String>(
            r#"
            SELECT key
            FROM roles
            WHERE id = ANY($1)
            ORDER BY key
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to resolve role keys: {error}")))
    }
}
