use super::*;

pub async fn assign_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
    Json(payload): Json<AssignPermissionsRequest>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .role_registry_service
        .assign_permissions(
            &principal,
            AssignPermissionsInput {
                role_id: RoleId::parse(&role_id)?,
                permission_ids: payload.parsed_permission_ids()?,
            },
        )
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn list_module_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<ModulePermissionDto>>> {
    let entries = state
        .role_registry_service
        .list_module_permissions(&principal, RoleId::parse(&role_id)?)
        .await?
        .into_iter()
        .map(ModulePermissionDto::from)
        .collect();

    Ok(Json(entries))
}

pub async fn save_module_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
    Json(payload): Json<SaveModulePermissionsRequest>,
) -> ApiResult<Json<Vec<ModulePermissionDto>>> {
    let entries = payload
        .entries
        .into_iter()
        .map(ModulePermissionDto::into_module_permission)
        .collect::<AppResult<Vec<_>>>()?;

    let saved = state
        .role_registry_service
        .save_module_permissions(&principal, RoleId::parse(&role_id)?, entries)
        .await?
        .into_iter()
        .map(ModulePermissionDto::from)
        .collect();

    Ok(Json(saved))
}
