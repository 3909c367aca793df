use super::*;

impl PostgresRoleRepository {
    pub(super) async fn save_module_permissions_impl(
        &self,
        role_id: RoleId,
        entries: &[ModulePermission],
        audit: AuditEvent,
    ) -> AppResult<Vec<ModulePermission>> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO role_module_permissions (role_id, module, action, allowed)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (role_id, module, action) DO UPDATE
                SET allowed = EXCLUDED.allowed, updated_at = now()
                "#,
            )
            .bind(role_id.as_uuid())
            .bind(entry.module())
            .bind(entry.action())
            .bind(entry.allowed())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                if is_foreign_key_violation(&error) {
                    return AppError::NotFound(format!("role '{role_id}' does not exist"));
                }
                AppError::Store(format!(
                    "failed to save module permission '{}:{}' for role '{role_id}': {error}",
                    entry.module(),
                    entry.action()
                ))
            })?;
        }

        append_chained_event(&mut transaction, audit).await?;
        let rows = select_module_permissions(&mut *transaction, role_id).await?;
        transaction.commit().await.map_err(commit_error)?;

        rows.into_iter().map(into_module_permission).collect()
    }

    pub(super) async fn list_module_permissions_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<ModulePermission>> {
        let rows = select_module_permissions(&self.pool, role_id).await?;
        rows.into_iter().map(into_module_permission).collect()
    }
}

async fn select_module_permissions<'e, E>(
    executor: E,
    role_id: RoleId,
) -> AppResult<Vec<ModulePermissionRow>>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, ModulePermissionRow>(
        r#"
        SELECT module, action, allowed
        FROM role_module_permissions
        WHERE role_id = $1
        ORDER BY module, action
        "#,
    )
    .bind(role_id.as_uuid())
    .fetch_all(executor)
    .await
    .map_err(|error| {
        AppError::Store(format!(
            "failed to list module permissions of role '{role_id}': {error}"
        ))
    })
}

fn into_module_permission(row: ModulePermissionRow) -> AppResult<ModulePermission> {
    ModulePermission::new(row.module.as_str(), row.action.as_str(), row.allowed).map_err(|error| {
        AppError::Store(format!("stored module permission is invalid: {error}"))
    })
}
