use tracing::info;

use stratum_core::{AppError, AppResult, Principal, TenantId, UserId};
use stratum_domain::{AuditAction, UserRole};

use crate::UserRoleAssignment;
use crate::read_policy::strict;

use super::{RoleRegistryService, USER_ROLE_RESOURCE_TYPE, role_view_path, tenant_view_path};

impl RoleRegistryService {
    /// Grants a role to a user within one tenant.
    ///
    /// Fails with `NotFound` for an unknown role and `Conflict` when the exact
    /// triple is already assigned.
    pub async fn assign_role(
        &self,
        actor: &Principal,
        assignment: UserRole,
    ) -> AppResult<UserRole> {
        let actor = self.authorize(actor, "assign_role", true).await?;

        let role = self.require_role(assignment.role_id).await?;
        let audit = Self::audit_event(
            &actor,
            AuditAction::UserRoleAssigned,
            USER_ROLE_RESOURCE_TYPE,
            assignment.resource_id(),
            Some(assignment.tenant_id),
            format!(
                "assigned role '{}' to user '{}'",
                role.key(),
                assignment.user_id
            ),
        );
        self.user_role_repository.assign(assignment, audit).await?;

        info!(
            user_id = %assignment.user_id,
            tenant_id = %assignment.tenant_id,
            role_id = %assignment.role_id,
            "role assigned"
        );
        self.invalidate(&tenant_view_path(assignment.tenant_id)).await;
        self.invalidate(&role_view_path(assignment.role_id)).await;

        Ok(assignment)
    }

    /// Revokes exactly the assignment matching the full triple.
    ///
    /// Assignments of the same user and role in other tenants are untouched.
    pub async fn revoke_role(&self, actor: &Principal, assignment: UserRole) -> AppResult<()> {
        let actor = self.authorize(actor, "revoke_role", true).await?;

        let audit = Self::audit_event(
            &actor,
            AuditAction::UserRoleRevoked,
            USER_ROLE_RESOURCE_TYPE,
            assignment.resource_id(),
            Some(assignment.tenant_id),
            format!(
                "revoked role '{}' from user '{}'",
                assignment.role_id, assignment.user_id
            ),
        );
        if !self.user_role_repository.revoke(assignment, audit).await? {
            return Err(AppError::NotFound(format!(
                "user '{}' does not hold role '{}' in tenant '{}'",
                assignment.user_id, assignment.role_id, assignment.tenant_id
            )));
        }

        info!(
            user_id = %assignment.user_id,
            tenant_id = %assignment.tenant_id,
            role_id = %assignment.role_id,
            "role revoked"
        );
        self.invalidate(&tenant_view_path(assignment.tenant_id)).await;
        self.invalidate(&role_view_path(assignment.role_id)).await;

        Ok(())
    }

    /// Lists a user's assignments, optionally narrowed to one tenant.
    pub async fn list_user_roles(
        &self,
        actor: &Principal,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        self.authorize(actor, "list_user_roles", false).await?;

        strict(
            "list_user_roles",
            self.user_role_repository.list_for_user(user_id, tenant_id),
        )
        .await
    }
}
