use serde::{Deserialize, Serialize};
use stratum_application::UserRoleAssignment;
use stratum_core::{AppResult, TenantId, UserId};
use stratum_domain::{RoleId, UserRole};
use ts_rs::TS;

/// Incoming assignment triple for grants and revocations.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-role-request.ts"
)]
pub struct UserRoleRequest {
    pub user_id: String,
    pub tenant_id: String,
    pub role_id: String,
}

impl UserRoleRequest {
    pub fn into_user_role(self) -> AppResult<UserRole> {
        Ok(UserRole::new(
            UserId::parse(&self.user_id)?,
            TenantId::parse(&self.tenant_id)?,
            RoleId::parse(&self.role_id)?,
        ))
    }
}

/// API representation of an assignment triple.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-role-response.ts"
)]
pub struct UserRoleResponse {
    pub user_id: String,
    pub tenant_id: String,
    pub role_id: String,
}

impl From<UserRole> for UserRoleResponse {
    fn from(value: UserRole) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            tenant_id: value.tenant_id.to_string(),
            role_id: value.role_id.to_string(),
        }
    }
}

/// API representation of an assignment with role display data.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-role-assignment-response.ts"
)]
pub struct UserRoleAssignmentResponse {
    pub user_id: String,
    pub tenant_id: String,
    pub role_id: String,
    pub role_key: String,
    pub role_label: String,
    pub assigned_at: String,
}

impl From<UserRoleAssignment> for UserRoleAssignmentResponse {
    fn from(value: UserRoleAssignment) -> Self {
        Self {
            user_id: value.assignment.user_id.to_string(),
            tenant_id: value.assignment.tenant_id.to_string(),
            role_id: value.assignment.role_id.to_string(),
            role_key: value.role_key.as_str().to_owned(),
            role_label: value.role_label.as_str().to_owned(),
            assigned_at: value.assigned_at.to_rfc3339(),
        }
    }
}
