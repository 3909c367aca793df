use super::*;

impl PostgresRoleRepository {
    pub(super) async fn list_roles_impl(
        &self,
        query: &RoleListQuery,
    ) -> AppResult<Vec<RoleSummary>> {
        let search_pattern = query
            .normalized_search()
            .map(|term| format!("%{}%", escape_like(term.as_str())));

        let statement = format!(
            r#"
            SELECT
                roles.id,
                roles.key,
                roles.label,
                roles.description,
                COUNT(role_permissions.permission_id) AS permission_count
            FROM roles
            LEFT JOIN role_permissions
                ON role_permissions.role_id = roles.id
            WHERE $1::TEXT IS NULL
                OR roles.key ILIKE $1 ESCAPE '\'
                OR roles.label ILIKE $1 ESCAPE '\'
            GROUP BY roles.id
            ORDER BY {}
            "#,
            order_clause(query.sort_by, query.sort_order)
        );

        let rows = sqlx::query_as::<_, RoleSummaryRow>(statement.as_str())
            .bind(search_pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Store(format!("failed to list roles: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(RoleSummary {
                    permission_count: u64::try_from(row.permission_count).unwrap_or(0),
                    role: row.role.into_role()?,
                })
            })
            .collect()
    }

    pub(super) async fn find_role_impl(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, key, label, description
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to load role '{role_id}': {error}")))?
        .map(RoleRow::into_role)
        .transpose()
    }

    pub(super) async fn find_roles_impl(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, key, label, description
            FROM roles
            WHERE id = ANY($1)
            ORDER BY key
            "#,
        )
        .bind(role_uuids(role_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to load roles: {error}")))?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    pub(super) async fn count_role_assignments_impl(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<BTreeMap<RoleId, u64>> {
        let rows = sqlx::query_as::<_, AssignmentCountRow>(
            r#"
            SELECT role_id, COUNT(*) AS assignment_count
            FROM user_roles
            WHERE role_id = ANY($1)
            GROUP BY role_id
            "#,
        )
        .bind(role_uuids(role_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to count role assignments: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    RoleId::from_uuid(row.role_id),
                    u64::try_from(row.assignment_count).unwrap_or(0),
                )
            })
            .collect())
    }

    pub(super) async fn create_role_impl(
        &self,
        role: &Role,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        sqlx::query(
            r#"
            INSERT INTO roles (id, key, label, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.key().as_str())
        .bind(role.label().as_str())
        .bind(role.description())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if is_unique_violation(&error) {
                return AppError::Conflict(format!("role key '{}' already exists", role.key()));
            }
            AppError::Store(format!("failed to create role '{}': {error}", role.key()))
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
            .bind(role.id().as_uuid())
            .bind(permission_uuids(permission_ids))
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_binding_error(error, role.id()))?;
        }

        append_chained_event(&mut transaction, audit).await?;
        transaction.commit().await.map_err(commit_error)
    }

    pub(super) async fn update_role_impl(&self, role: &Role, audit: AuditEvent) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE roles
            SET label = $2, description = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.label().as_str())
        .bind(role.description())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Store(format!("failed to update role '{}': {error}", role.id()))
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id()
            )));
        }

        append_chained_event(&mut transaction, audit).await?;
        transaction.commit().await.map_err(commit_error)
    }

    pub(super) async fn delete_roles_impl(
        &self,
        role_ids: &[RoleId],
        audit: Vec<AuditEvent>,
    ) -> AppResult<u64> {
        let requested = role_ids.len() as u64;
        let mut transaction = self.pool.begin().await.map_err(begin_error)?;

        let removed = sqlx::query(
            r#"
            DELETE FROM roles
            WHERE id = ANY($1)
                AND key <> ALL($2)
                AND NOT EXISTS (
                    SELECT 1
                    FROM user_roles
                    WHERE user_roles.role_id = roles.id
                )
            "#,
        )
        .bind(role_uuids(role_ids))
        .bind(SystemRole::reserved_keys())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if is_foreign_key_violation(&error) {
                return AppError::Conflict(
                    "a role was assigned while it was being deleted".to_owned(),
                );
            }
            AppError::Store(format!("failed to delete roles: {error}"))
        })?
        .rows_affected();

        // Dropping the transaction rolls back the partial delete.
        if removed != requested {
            return Err(AppError::Conflict(format!(
                "only {removed} of {requested} role(s) were deletable; nothing was deleted"
            )));
        }

        append_chained_events(&mut transaction, audit).await?;
        transaction.commit().await.map_err(commit_error)?;
        Ok(removed)
    }
}

fn order_clause(sort_by: RoleSortField, sort_order: SortOrder) -> String {
    let column = match sort_by {
        RoleSortField::Key => "roles.key",
        RoleSortField::Label => "roles.label",
        RoleSortField::PermissionCount => "permission_count",
    };
    let direction = match sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    format!("{column} {direction}, roles.key ASC")
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub(super) fn map_binding_error(error: sqlx::Error, role_id: RoleId) -> AppError {
    if is_foreign_key_violation(&error) {
        return AppError::NotFound(format!(
            "role '{role_id}' or one of the requested permissions no longer exists"
        ));
    }

    AppError::Store(format!(
        "failed to bind permissions to role '{role_id}': {error}"
    ))
}
