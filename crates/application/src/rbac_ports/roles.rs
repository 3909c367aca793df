use chrono::{DateTime, Utc};
use stratum_domain::{Permission, PermissionId, Role, RoleId, RoleKey, RoleLabel, UserRole};

/// Role list row enriched with its permission count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    /// Role definition.
    pub role: Role,
    /// Number of bound permissions.
    pub permission_count: u64,
}

/// Role detail projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetails {
    /// Role definition.
    pub role: Role,
    /// Bound permissions ordered by key.
    pub permissions: Vec<Permission>,
    /// Number of user-role assignments referencing the role.
    pub user_count: u64,
}

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role key slug.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Optional description.
    pub description: Option<String>,
    /// Permissions to bind in the same batch.
    pub permission_ids: Vec<PermissionId>,
}

/// Input payload for partial role updates. The key is not updatable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// Role to update.
    pub role_id: RoleId,
    /// New label, when present.
    pub label: Option<String>,
    /// New description, when present; a blank value clears it.
    pub description: Option<String>,
}

/// Input payload for replacing the permission set of a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignPermissionsInput {
    /// Role whose bindings are replaced.
    pub role_id: RoleId,
    /// Complete new permission set; empty clears all bindings.
    pub permission_ids: Vec<PermissionId>,
}

/// Input payload for cloning a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRoleInput {
    /// Role to copy.
    pub source_role_id: RoleId,
    /// Key of the new role.
    pub new_key: String,
    /// Label of the new role.
    pub new_label: String,
}

/// Assignment projection joined with role display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAssignment {
    /// Assignment triple.
    pub assignment: UserRole,
    /// Assigned role key.
    pub role_key: RoleKey,
    /// Assigned role label.
    pub role_label: RoleLabel,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}
