use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use stratum_application::{AssignPermissionsInput, CloneRoleInput, UpdateRoleInput};
use stratum_core::{AppResult, Principal};
use stratum_domain::{RoleId, RoleListQuery, RoleSortField, SortOrder};

use crate::dto::{
    AssignPermissionsRequest, BulkDeleteRolesRequest, BulkDeleteRolesResponse, CloneRoleRequest,
    CreateRoleRequest, ModulePermissionDto, PermissionResponse, RoleDetailsResponse,
    RoleResponse, RoleSummaryResponse, SaveModulePermissionsRequest, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod definitions;
mod deletion;
mod grants;

pub use definitions::{
    clone_role_handler, create_role_handler, get_role_handler, list_roles_handler,
    update_role_handler,
};
pub use deletion::{bulk_delete_roles_handler, delete_role_handler};
pub use grants::{
    assign_permissions_handler, list_module_permissions_handler, save_module_permissions_handler,
};

#[derive(Debug, Default, Deserialize)]
pub struct RoleListParams {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl RoleListParams {
    fn into_query(self) -> AppResult<RoleListQuery> {
        Ok(RoleListQuery {
            search: self.search,
            sort_by: self
                .sort_by
                .as_deref()
                .map(str::parse::<RoleSortField>)
                .transpose()?
                .unwrap_or_default(),
            sort_order: self
                .sort_order
                .as_deref()
                .map(str::parse::<SortOrder>)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}
