use async_trait::async_trait;
use stratum_core::{AppResult, TenantId, UserId};
use stratum_domain::{AuditAction, RoleKey, UserRole};

use super::AuditEvent;
use crate::USER_ROLE_RESOURCE_TYPE;

/// Outcome of an attempt to consume the one-time bootstrap grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The grant was consumed and the assignment created.
    Granted(UserRole),
    /// The grant was consumed earlier.
    AlreadyConsumed,
    /// A privileged assignment already exists, so bootstrap is not needed.
    PrivilegedRoleExists,
}

/// Builds the audit event recorded with a granted bootstrap assignment.
#[must_use]
pub fn bootstrap_audit_event(assignment: &UserRole, role_key: &RoleKey) -> AuditEvent {
    AuditEvent {
        tenant_id: Some(assignment.tenant_id),
        actor: assignment.user_id.to_string(),
        action: AuditAction::BootstrapConsumed,
        resource_type: USER_ROLE_RESOURCE_TYPE.to_owned(),
        resource_id: assignment.resource_id(),
        detail: Some(format!(
            "bootstrap granted '{role_key}' to user '{}'",
            assignment.user_id
        )),
    }
}

/// Port for the single-use bootstrap state.
#[async_trait]
pub trait BootstrapRepository: Send + Sync {
    /// Atomically assigns `role_key` to the user in the tenant and marks the
    /// bootstrap state consumed, unless it is already consumed or any
    /// privileged assignment exists.
    ///
    /// A granted assignment is recorded together with its
    /// [`bootstrap_audit_event`] entry; a failed append grants nothing.
    async fn consume(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        role_key: &RoleKey,
    ) -> AppResult<BootstrapOutcome>;

    /// Returns whether the bootstrap grant is still available.
    async fn is_available(&self) -> AppResult<bool>;
}
