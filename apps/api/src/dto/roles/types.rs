use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<String>,
}

/// Incoming payload for partial role updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Incoming payload for role cloning.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/clone-role-request.ts"
)]
pub struct CloneRoleRequest {
    pub new_key: String,
    pub new_label: String,
}

/// Incoming payload replacing the permission set of a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-permissions-request.ts"
)]
pub struct AssignPermissionsRequest {
    pub permission_ids: Vec<String>,
}

/// Incoming payload for all-or-nothing role deletion.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-delete-roles-request.ts"
)]
pub struct BulkDeleteRolesRequest {
    pub role_ids: Vec<String>,
}

/// Result of a bulk deletion.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-delete-roles-response.ts"
)]
pub struct BulkDeleteRolesResponse {
    #[ts(type = "number")]
    pub deleted: u64,
}

/// One legacy per-module grant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/module-permission.ts"
)]
pub struct ModulePermissionDto {
    pub module: String,
    pub action: String,
    pub allowed: bool,
}

/// Incoming payload for legacy module grants.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-module-permissions-request.ts"
)]
pub struct SaveModulePermissionsRequest {
    pub entries: Vec<ModulePermissionDto>,
}

/// API representation of a permission reference row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub permission_id: String,
    pub key: String,
    pub description: Option<String>,
}

/// API representation of a role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub role_id: String,
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    pub is_system: bool,
}

/// Role list row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-summary-response.ts"
)]
pub struct RoleSummaryResponse {
    #[serde(flatten)]
    pub role: RoleResponse,
    #[ts(type = "number")]
    pub permission_count: u64,
}

/// Role detail view.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-details-response.ts"
)]
pub struct RoleDetailsResponse {
    #[serde(flatten)]
    pub role: RoleResponse,
    pub permissions: Vec<PermissionResponse>,
    #[ts(type = "number")]
    pub user_count: u64,
}
