use serde::{Deserialize, Serialize};
use stratum_core::{TenantId, UserId};

use crate::RoleId;

/// Assignment of a role to a user within one tenant.
///
/// The full triple is the identity: the same user can hold the same role in
/// several tenants independently, and revocation matches all three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRole {
    /// Assigned user.
    pub user_id: UserId,
    /// Tenant scope of the assignment.
    pub tenant_id: TenantId,
    /// Assigned role.
    pub role_id: RoleId,
}

impl UserRole {
    /// Creates an assignment triple.
    #[must_use]
    pub fn new(user_id: UserId, tenant_id: TenantId, role_id: RoleId) -> Self {
        Self {
            user_id,
            tenant_id,
            role_id,
        }
    }

    /// Returns a stable audit resource identifier for the triple.
    #[must_use]
    pub fn resource_id(&self) -> String {
        format!("{}:{}:{}", self.user_id, self.tenant_id, self.role_id)
    }
}
