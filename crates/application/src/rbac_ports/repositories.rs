use std::collections::BTreeMap;

use async_trait::async_trait;

use stratum_core::{AppResult, TenantId, UserId};
use stratum_domain::{
    ModulePermission, Permission, PermissionId, Role, RoleId, RoleListQuery, UserRole,
};

use super::AuditEvent;
use super::roles::{RoleSummary, UserRoleAssignment};

/// Repository port for principal role resolution.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists the distinct role ids assigned to a user across all tenants.
    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>>;

    /// Resolves role ids to their keys. Unknown ids are skipped.
    async fn list_role_keys(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>>;
}

/// Repository port for roles, permissions and role-permission bindings.
///
/// Every mutating call records its audit event in the same unit of work as
/// the change, chained onto the latest entry of the event's resource. A failed
/// append leaves nothing changed.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles with permission counts, filtered and sorted per query.
    async fn list_roles(&self, query: &RoleListQuery) -> AppResult<Vec<RoleSummary>>;

    /// Finds one role.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds all roles among the given ids. Unknown ids are skipped.
    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>>;

    /// Lists permissions bound to a role ordered by key.
    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>>;

    /// Counts user-role assignments per role. Roles without assignments are omitted.
    async fn count_role_assignments(&self, role_ids: &[RoleId]) -> AppResult<BTreeMap<RoleId, u64>>;

    /// Inserts a role and its permission bindings as one unit.
    ///
    /// Fails with `Conflict` when the key is taken.
    async fn create_role(
        &self,
        role: &Role,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()>;

    /// Persists label and description changes. The key column is never written.
    async fn update_role(&self, role: &Role, audit: AuditEvent) -> AppResult<()>;

    /// Deletes the given roles all-or-nothing.
    ///
    /// The delete is conditional: roles that are system-reserved or referenced
    /// by any assignment at execution time are not removed, and if the number
    /// removed differs from the number requested nothing is removed and the
    /// call fails with `Conflict`. Bindings are removed with their roles.
    ///
    /// `audit` holds one event per role, each for a distinct resource.
    async fn delete_roles(&self, role_ids: &[RoleId], audit: Vec<AuditEvent>) -> AppResult<u64>;

    /// Replaces every binding of a role with the given set as one unit.
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()>;

    /// Lists all permission reference rows ordered by key.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    /// Finds permissions among the given ids. Unknown ids are skipped.
    async fn find_permissions(&self, permission_ids: &[PermissionId])
    -> AppResult<Vec<Permission>>;

    /// Upserts legacy per-module grants keyed by `(role, module, action)`.
    async fn save_module_permissions(
        &self,
        role_id: RoleId,
        entries: &[ModulePermission],
        audit: AuditEvent,
    ) -> AppResult<Vec<ModulePermission>>;

    /// Lists legacy per-module grants of a role ordered by module and action.
    async fn list_module_permissions(&self, role_id: RoleId) -> AppResult<Vec<ModulePermission>>;
}

/// Repository port for user-role assignments.
///
/// Mutating calls record their audit event with the change, as in
/// [`RoleRepository`].
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// Inserts exactly one assignment. Fails with `Conflict` when it exists.
    async fn assign(&self, assignment: UserRole, audit: AuditEvent) -> AppResult<()>;

    /// Deletes the assignment matching the full triple.
    ///
    /// Returns whether a row was removed. Nothing is recorded when it was not.
    async fn revoke(&self, assignment: UserRole, audit: AuditEvent) -> AppResult<bool>;

    /// Lists a user's assignments, optionally narrowed to one tenant.
    async fn list_for_user(
        &self,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<UserRoleAssignment>>;
}
