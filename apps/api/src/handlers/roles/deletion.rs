use super::*;

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .role_registry_service
        .delete_role(&principal, RoleId::parse(&role_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_delete_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<BulkDeleteRolesRequest>,
) -> ApiResult<Json<BulkDeleteRolesResponse>> {
    let deleted = state
        .role_registry_service
        .bulk_delete_roles(&principal, payload.parsed_role_ids()?)
        .await?;

    Ok(Json(BulkDeleteRolesResponse { deleted }))
}
