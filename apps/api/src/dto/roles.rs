mod conversions;
mod types;

pub use types::{
    AssignPermissionsRequest, BulkDeleteRolesRequest, BulkDeleteRolesResponse, CloneRoleRequest,
    CreateRoleRequest, ModulePermissionDto, PermissionResponse, RoleDetailsResponse,
    RoleResponse, RoleSummaryResponse, SaveModulePermissionsRequest, UpdateRoleRequest,
};
