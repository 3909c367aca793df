use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use stratum_application::{AuditEvent, RoleRepository, RoleSummary};
use stratum_core::{AppError, AppResult};
use stratum_domain::{
    ModulePermission, Permission, PermissionId, Role, RoleId, RoleKey, RoleLabel, RoleListQuery,
    RoleSortField, SortOrder, SystemRole,
};

use crate::postgres_audit_chain::{append_chained_event, append_chained_events};
use crate::postgres_errors::{is_foreign_key_violation, is_unique_violation};

mod module_permissions;
mod permissions;
mod roles;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for roles, permissions and their bindings.
///
/// Each write runs in one transaction together with its chained audit entry.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    key: String,
    label: String,
    description: Option<String>,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        let key = RoleKey::new(self.key).map_err(|error| {
            AppError::Store(format!("stored role '{}' has an invalid key: {error}", self.id))
        })?;
        let label = RoleLabel::new(self.label).map_err(|error| {
            AppError::Store(format!("stored role '{}' has an invalid label: {error}", self.id))
        })?;

        Ok(Role::new(
            RoleId::from_uuid(self.id),
            key,
            label,
            self.description,
        ))
    }
}

#[derive(Debug, FromRow)]
struct RoleSummaryRow {
    #[sqlx(flatten)]
    role: RoleRow,
    permission_count: i64,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    key: String,
    description: Option<String>,
}

impl PermissionRow {
    fn into_permission(self) -> AppResult<Permission> {
        Permission::new(PermissionId::from_uuid(self.id), self.key, self.description).map_err(
            |error| AppError::Store(format!("stored permission '{}' is invalid: {error}", self.id)),
        )
    }
}

#[derive(Debug, FromRow)]
struct ModulePermissionRow {
    module: String,
    action: String,
    allowed: bool,
}

#[derive(Debug, FromRow)]
struct AssignmentCountRow {
    role_id: Uuid,
    assignment_count: i64,
}

fn role_uuids(role_ids: &[RoleId]) -> Vec<Uuid> {
    role_ids.iter().map(RoleId::as_uuid).collect()
}

fn permission_uuids(permission_ids: &[PermissionId]) -> Vec<Uuid> {
    permission_ids.iter().map(PermissionId::as_uuid).collect()
}

fn begin_error(error: sqlx::Error) -> AppError {
    AppError::Store(format!("failed to begin transaction: {error}"))
}

fn commit_error(error: sqlx::Error) -> AppError {
    AppError::Store(format!("failed to commit transaction: {error}"))
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, query: &RoleListQuery) -> AppResult<Vec<RoleSummary>> {
        self.list_roles_impl(query).await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_role_impl(role_id).await
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        self.find_roles_impl(role_ids).await
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        self.list_role_permissions_impl(role_id).await
    }

    async fn count_role_assignments(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<BTreeMap<RoleId, u64>> {
        self.count_role_assignments_impl(role_ids).await
    }

    async fn create_role(
        &self,
        role: &Role,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()> {
        self.create_role_impl(role, permission_ids, audit).await
    }

    async fn update_role(&self, role: &Role, audit: AuditEvent) -> AppResult<()> {
        self.update_role_impl(role, audit).await
    }

    async fn delete_roles(&self, role_ids: &[RoleId], audit: Vec<AuditEvent>) -> AppResult<u64> {
        self.delete_roles_impl(role_ids, audit).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()> {
        self.replace_role_permissions_impl(role_id, permission_ids, audit)
            .await
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl().await
    }

    async fn find_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        self.find_permissions_impl(permission_ids).await
    }

    async fn save_module_permissions(
        &self,
        role_id: RoleId,
        entries: &[ModulePermission],
        audit: AuditEvent,
    ) -> AppResult<Vec<ModulePermission>> {
        self.save_module_permissions_impl(role_id, entries, audit)
            .await
    }

    async fn list_module_permissions(&self, role_id: RoleId) -> AppResult<Vec<ModulePermission>> {
        self.list_module_permissions_impl(role_id).await
    }
}
