use axum::Json;
use axum::extract::{Extension, Path, State};
use stratum_core::Principal;

use crate::dto::{AuditLogEntryResponse, ChainVerificationResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn resource_history_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .audit_chain_service
        .list_resource_history(&principal, &resource_type, &resource_id)
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn verify_chain_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> ApiResult<Json<ChainVerificationResponse>> {
    let verification = state
        .audit_chain_service
        .verify_chain(&principal, &resource_type, &resource_id)
        .await?;

    Ok(Json(ChainVerificationResponse::from(verification)))
}
