use axum::Json;
use axum::extract::{Extension, State};
use stratum_core::Principal;

use crate::dto::PermissionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .role_registry_service
        .list_permissions(&principal)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}
