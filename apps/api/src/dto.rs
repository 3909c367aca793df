mod assignments;
mod audit;
mod common;
mod roles;

pub use assignments::{UserRoleAssignmentResponse, UserRoleRequest, UserRoleResponse};
pub use audit::{AuditLogEntryResponse, ChainVerificationResponse};
pub use common::{
    BootstrapRequest, BootstrapStatusResponse, HealthDependencyStatus, HealthResponse,
    PrincipalResponse,
};
pub use roles::{
    AssignPermissionsRequest, BulkDeleteRolesRequest, BulkDeleteRolesResponse, CloneRoleRequest,
    CreateRoleRequest, ModulePermissionDto, PermissionResponse, RoleDetailsResponse,
    RoleResponse, RoleSummaryResponse, SaveModulePermissionsRequest, UpdateRoleRequest,
};

#[cfg(test)]
mod tests {
    use ts_rs::Config;
    use ts_rs::TS;

    use super::{
        AssignPermissionsRequest, AuditLogEntryResponse, BootstrapRequest,
        BootstrapStatusResponse, BulkDeleteRolesRequest, BulkDeleteRolesResponse,
        ChainVerificationResponse, CloneRoleRequest, CreateRoleRequest, HealthResponse,
        ModulePermissionDto, PermissionResponse, PrincipalResponse, RoleDetailsResponse,
        RoleResponse, RoleSummaryResponse, SaveModulePermissionsRequest, UpdateRoleRequest,
        UserRoleAssignmentResponse, UserRoleRequest, UserRoleResponse,
    };
    use crate::error::ErrorResponse;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        HealthResponse::export(&config)?;
        PrincipalResponse::export(&config)?;
        BootstrapRequest::export(&config)?;
        BootstrapStatusResponse::export(&config)?;
        CreateRoleRequest::export(&config)?;
        UpdateRoleRequest::export(&config)?;
        CloneRoleRequest::export(&config)?;
        AssignPermissionsRequest::export(&config)?;
        BulkDeleteRolesRequest::export(&config)?;
        BulkDeleteRolesResponse::export(&config)?;
        SaveModulePermissionsRequest::export(&config)?;
        ModulePermissionDto::export(&config)?;
        PermissionResponse::export(&config)?;
        RoleResponse::export(&config)?;
        RoleSummaryResponse::export(&config)?;
        RoleDetailsResponse::export(&config)?;
        UserRoleRequest::export(&config)?;
        UserRoleResponse::export(&config)?;
        UserRoleAssignmentResponse::export(&config)?;
        AuditLogEntryResponse::export(&config)?;
        ChainVerificationResponse::export(&config)?;
        ErrorResponse::export(&config)?;

        Ok(())
    }

    #[test]
    fn role_summary_flattens_role_fields() -> Result<(), serde_json::Error> {
        let summary = RoleSummaryResponse {
            role: RoleResponse {
                role_id: "00000000-0000-0000-0000-000000000001".to_owned(),
                key: "editor".to_owned(),
                label: "Editor".to_owned(),
                description: None,
                is_system: false,
            },
            permission_count: 2,
        };

        let value = serde_json::to_value(&summary)?;
        assert_eq!(value["key"], "editor");
        assert_eq!(value["permission_count"], 2);
        assert!(value.get("role").is_none());

        Ok(())
    }
}
