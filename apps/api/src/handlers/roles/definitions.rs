use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<RoleListParams>,
) -> ApiResult<Json<Vec<RoleSummaryResponse>>> {
    let roles = state
        .role_registry_service
        .list_roles(&principal, params.into_query()?)
        .await?
        .into_iter()
        .map(RoleSummaryResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleDetailsResponse>> {
    let details = state
        .role_registry_service
        .get_role_details(&principal, RoleId::parse(&role_id)?)
        .await?;

    Ok(Json(RoleDetailsResponse::from(details)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_registry_service
        .create_role(&principal, payload.into_input()?)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_registry_service
        .update_role(
            &principal,
            UpdateRoleInput {
                role_id: RoleId::parse(&role_id)?,
                label: payload.label,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn clone_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<String>,
    Json(payload): Json<CloneRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_registry_service
        .clone_role(
            &principal,
            CloneRoleInput {
                source_role_id: RoleId::parse(&role_id)?,
                new_key: payload.new_key,
                new_label: payload.new_label,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}
