use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::HealthResponse;
use crate::state::AppState;

mod checks;

use checks::{check_redis, check_store};

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = check_store(&state.store).await;
    let redis = check_redis(state.redis.clone(), state.redis_required).await;

    let ready = is_healthy(store.status) && (is_healthy(redis.status) || !state.redis_required);
    let status = if ready { "ok" } else { "degraded" };
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            ready,
            store,
            redis,
        }),
    )
}

fn is_healthy(status: &str) -> bool {
    status == "ok"
}
