use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use stratum_core::{Principal, TenantId, UserId};

use crate::dto::{UserRoleAssignmentResponse, UserRoleRequest, UserRoleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct UserRolesQuery {
    pub tenant_id: Option<String>,
}

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    Query(query): Query<UserRolesQuery>,
) -> ApiResult<Json<Vec<UserRoleAssignmentResponse>>> {
    let tenant_id = query
        .tenant_id
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(TenantId::parse)
        .transpose()?;

    let assignments = state
        .role_registry_service
        .list_user_roles(&principal, UserId::parse(&user_id)?, tenant_id)
        .await?
        .into_iter()
        .map(UserRoleAssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UserRoleRequest>,
) -> ApiResult<(StatusCode, Json<UserRoleResponse>)> {
    let assignment = state
        .role_registry_service
        .assign_role(&principal, payload.into_user_role()?)
        .await?;

    Ok((StatusCode::CREATED, Json(UserRoleResponse::from(assignment))))
}

pub async fn revoke_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UserRoleRequest>,
) -> ApiResult<StatusCode> {
    state
        .role_registry_service
        .revoke_role(&principal, payload.into_user_role()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
