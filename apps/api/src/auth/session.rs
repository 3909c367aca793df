use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use stratum_core::AppError;
use tower_sessions::Session;

use crate::dto::PrincipalResponse;
use crate::error::ApiResult;
use crate::middleware::session_principal;
use crate::state::AppState;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<PrincipalResponse>> {
    let principal = session_principal(&session, state.session_max_age_seconds).await?;

    let is_admin = state.authorization_service.has_admin_role(&principal).await?;

    Ok(Json(PrincipalResponse {
        user_id: principal.user_id().to_string(),
        display_name: principal.display_name().to_owned(),
        is_admin,
    }))
}
