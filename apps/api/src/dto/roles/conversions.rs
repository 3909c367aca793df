use stratum_application::{CreateRoleInput, RoleDetails, RoleSummary};
use stratum_core::AppResult;
use stratum_domain::{ModulePermission, Permission, PermissionId, Role, RoleId};

use super::types::{
    AssignPermissionsRequest, BulkDeleteRolesRequest, CreateRoleRequest, ModulePermissionDto,
    PermissionResponse, RoleDetailsResponse, RoleResponse, RoleSummaryResponse,
};

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id().to_string(),
            key: value.key().as_str().to_owned(),
            label: value.label().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
            is_system: value.is_system_reserved(),
        }
    }
}

impl From<RoleSummary> for RoleSummaryResponse {
    fn from(value: RoleSummary) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            permission_count: value.permission_count,
        }
    }
}

impl From<RoleDetails> for RoleDetailsResponse {
    fn from(value: RoleDetails) -> Self {
        Self {
            role: RoleResponse::from(value.role),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
            user_count: value.user_count,
        }
    }
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission_id: value.id().to_string(),
            key: value.key().to_owned(),
            description: value.description().map(ToOwned::to_owned),
        }
    }
}

impl From<ModulePermission> for ModulePermissionDto {
    fn from(value: ModulePermission) -> Self {
        Self {
            module: value.module().to_owned(),
            action: value.action().to_owned(),
            allowed: value.allowed(),
        }
    }
}

impl ModulePermissionDto {
    pub fn into_module_permission(self) -> AppResult<ModulePermission> {
        ModulePermission::new(&self.module, &self.action, self.allowed)
    }
}

impl CreateRoleRequest {
    pub fn into_input(self) -> AppResult<CreateRoleInput> {
        Ok(CreateRoleInput {
            key: self.key,
            label: self.label,
            description: self.description,
            permission_ids: parse_permission_ids(&self.permission_ids)?,
        })
    }
}

impl AssignPermissionsRequest {
    pub fn parsed_permission_ids(&self) -> AppResult<Vec<PermissionId>> {
        parse_permission_ids(&self.permission_ids)
    }
}

impl BulkDeleteRolesRequest {
    pub fn parsed_role_ids(&self) -> AppResult<Vec<RoleId>> {
        self.role_ids
            .iter()
            .map(|value| RoleId::parse(value))
            .collect()
    }
}

fn parse_permission_ids(values: &[String]) -> AppResult<Vec<PermissionId>> {
    values
        .iter()
        .map(|value| PermissionId::parse(value))
        .collect()
}
