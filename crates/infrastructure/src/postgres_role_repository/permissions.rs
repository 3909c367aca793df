use super::roles::map_binding_error;
use super::*;

impl PostgresRoleRepository {
    pub(super) async fn list_role_permissions_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.key, permissions.description
            FROM role_permissions
            INNER JOIN permissions
                ON permissions.id = role_permissions.permission_id
            WHERE role_permissions.role_id = $1
            ORDER BY permissions.key
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!(
                "failed to list permissions of role '{role_id}': {error}"
            ))
        })?;

        rows.into_iter().map(PermissionRow::into_permission).collect()
    }

    pub(super) async fn replace_role_permissions_impl(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
            .bind(role_id.as_uuid())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(|error| AppError::Store(format!("failed to lock role '{role_id}': {error}")))?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Store(format!(
                    "failed to clear permissions of role '{role_id}': {error}"
                ))
            })?;

        if !permission_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, permission_id
                FROM UNNEST($2::UUID[]) AS requested(permission_id)
                ON CONFLICT (role_id, permission_id) DO NOTHING
                "#,
            )
            .bind(role_id.as_uuid())
            .bind(permission_uuids(permission_ids))
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_binding_error(error, role_id))?;
        }

        append_chained_event(&mut transaction, audit).await?;
        transaction.commit().await.map_err(commit_error)
    }

    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            "SELECT id, key, description FROM permissions ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_permission).collect()
    }

    pub(super) async fn find_permissions_impl(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, key, description
            FROM permissions
            WHERE id = ANY($1)
            ORDER BY key
            "#,
        )
        .bind(permission_uuids(permission_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to load permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_permission).collect()
    }
}
