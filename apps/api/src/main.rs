//! Stratum API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod rate_limit_cleanup;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use stratum_core::AppError;
use stratum_infrastructure::InMemoryRbacStore;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, StoreBackend, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{
    StoreHandle, build_app_state, build_memory_session_layer, build_postgres_session_layer,
    connect_and_migrate, connect_redis,
};
use crate::rate_limit_cleanup::spawn_rate_limit_cleanup_worker;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = match &config.store_backend {
        StoreBackend::Postgres { database_url } => Some(
            connect_and_migrate(database_url.as_str(), config.database_max_connections).await?,
        ),
        StoreBackend::Memory => None,
    };

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    if config.authz_bypass_enabled {
        warn!("AUTHZ_BYPASS_ENABLED is set; every authenticated principal is treated as admin");
    }

    let redis = match config.redis_url.as_deref() {
        Some(redis_url) if config.requires_redis() => Some(connect_redis(redis_url).await?),
        _ => None,
    };

    let app = match pool {
        Some(pool) => {
            let session_layer =
                build_postgres_session_layer(pool.clone(), config.cookie_secure).await?;
            let app_state = build_app_state(StoreHandle::Postgres(pool), redis, &config)?;
            start_background_workers(&app_state, &config);
            build_router(app_state, session_layer)?
        }
        None => {
            warn!("running with the in-memory store; state is lost on restart");
            let store = Arc::new(InMemoryRbacStore::new()?);
            let session_layer = build_memory_session_layer(config.cookie_secure);
            let app_state = build_app_state(StoreHandle::Memory(store), redis, &config)?;
            start_background_workers(&app_state, &config);
            build_router(app_state, session_layer)?
        }
    };

    serve(app, &config).await
}

fn start_background_workers(app_state: &AppState, config: &ApiConfig) {
    spawn_rate_limit_cleanup_worker(
        app_state.rate_limit_service.clone(),
        Duration::from_secs(config.rate_limit_cleanup_interval_seconds),
    );
}

async fn serve(app: Router, config: &ApiConfig) -> Result<(), AppError> {
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "stratum-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
