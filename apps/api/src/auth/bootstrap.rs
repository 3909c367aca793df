use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use stratum_core::{AppError, Principal, TenantId, UserId};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{BootstrapRequest, BootstrapStatusResponse, UserRoleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_PRINCIPAL_KEY};

pub async fn bootstrap_status_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<BootstrapStatusResponse>> {
    let available = state.bootstrap_service.is_available().await?;

    Ok(Json(BootstrapStatusResponse { available }))
}

/// Consumes the first-operator grant and signs the operator in.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<(StatusCode, Json<UserRoleResponse>)> {
    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::Validation("display_name must not be empty".to_owned()).into());
    }

    let principal = Principal::new(UserId::parse(&payload.user_id)?, display_name);
    let tenant_id = TenantId::parse(&payload.tenant_id)?;

    let assignment = state
        .bootstrap_service
        .bootstrap(payload.token.as_str(), &principal, tenant_id)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_PRINCIPAL_KEY, &principal)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session principal: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(user_id = %principal.user_id(), %tenant_id, "bootstrap session established");

    Ok((StatusCode::CREATED, Json(UserRoleResponse::from(assignment))))
}
