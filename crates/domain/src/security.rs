use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stratum_core::AppError;

/// Role keys reserved by the platform.
///
/// Holding any of them makes a principal an administrator; none of them can
/// ever be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Platform owner.
    MasterAdmin,
    /// Cross-tenant administrator.
    SuperAdmin,
    /// Tenant administrator.
    Admin,
}

impl SystemRole {
    /// Returns the stable role key for this system role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MasterAdmin => "master_admin",
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
        }
    }

    /// Returns all reserved roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[
            SystemRole::MasterAdmin,
            SystemRole::SuperAdmin,
            SystemRole::Admin,
        ];

        ALL
    }

    /// Returns the reserved role keys as storage values.
    #[must_use]
    pub fn reserved_keys() -> Vec<&'static str> {
        Self::all().iter().map(Self::as_str).collect()
    }

    /// Returns whether the given role key is system-reserved.
    #[must_use]
    pub fn is_reserved_key(key: &str) -> bool {
        Self::from_str(key).is_ok()
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "master_admin" => Ok(Self::MasterAdmin),
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!(
                "'{value}' is not a system role"
            ))),
        }
    }
}

/// Stable audit actions emitted by registry use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role label or description changes.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when the permission set of a role is replaced.
    RolePermissionsAssigned,
    /// Emitted when legacy module permissions of a role are saved.
    RoleModulePermissionsSaved,
    /// Emitted on the new role produced by a clone.
    RoleCloned,
    /// Emitted when a role is assigned to a user in a tenant.
    UserRoleAssigned,
    /// Emitted when a role assignment is revoked.
    UserRoleRevoked,
    /// Emitted when the one-time bootstrap token is consumed.
    BootstrapConsumed,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::RoleDeleted => "role.deleted",
            Self::RolePermissionsAssigned => "role.permissions_assigned",
            Self::RoleModulePermissionsSaved => "role.module_permissions_saved",
            Self::RoleCloned => "role.cloned",
            Self::UserRoleAssigned => "user_role.assigned",
            Self::UserRoleRevoked => "user_role.revoked",
            Self::BootstrapConsumed => "bootstrap.consumed",
        }
    }
}
