use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use stratum_core::{AppError, AppResult, Principal};
use tower_sessions::Session;
use tracing::info;

use crate::auth::{SESSION_CREATED_AT_KEY, SESSION_PRINCIPAL_KEY};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let principal = session_principal(&session, state.session_max_age_seconds).await?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Reads the signed-in principal, ending the session once it is older than
/// `max_age_seconds` regardless of activity.
pub async fn session_principal(session: &Session, max_age_seconds: i64) -> AppResult<Principal> {
    let principal = session
        .get::<Principal>(SESSION_PRINCIPAL_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session principal: {error}")))?
        .ok_or_else(|| AppError::NotAuthenticated("authentication required".to_owned()))?;

    let created_at = session
        .get::<i64>(SESSION_CREATED_AT_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read session creation time: {error}"))
        })?;

    if session_expired(created_at, chrono::Utc::now().timestamp(), max_age_seconds) {
        session
            .flush()
            .await
            .map_err(|error| AppError::Internal(format!("failed to end session: {error}")))?;
        info!(user_id = %principal.user_id(), "session exceeded its maximum age");
        return Err(AppError::NotAuthenticated("session expired".to_owned()));
    }

    Ok(principal)
}

fn session_expired(created_at: Option<i64>, now: i64, max_age_seconds: i64) -> bool {
    created_at.is_none_or(|created_at| now.saturating_sub(created_at) > max_age_seconds)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if headers.get("sec-fetch-site") == Some(&HeaderValue::from_static("cross-site")) {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !origin_is_allowed(&state.frontend_url, origin, referer) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn origin_is_allowed(allowed_origin: &str, origin: &str, referer: &str) -> bool {
    origin == allowed_origin || referer.starts_with(allowed_origin)
}
