use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;
use stratum_application::{
    AuditChainService, AuthorizationPolicy, AuthorizationService, BootstrapService,
    OperationRateLimits, RoleRegistryService,
};
use stratum_core::AppResult;
use stratum_infrastructure::InMemoryRbacStore;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod caches;
mod repositories;

/// Backing store selected at startup.
#[derive(Clone)]
pub enum StoreHandle {
    Postgres(PgPool),
    Memory(Arc<InMemoryRbacStore>),
}

pub fn build_app_state(
    store: StoreHandle,
    redis: Option<ConnectionManager>,
    config: &ApiConfig,
) -> AppResult<AppState> {
    let repositories = repositories::build_repository_set(&store);
    let rate_limit_service = caches::build_rate_limit_service(&store, config, redis.clone())?;
    let view_notifier = caches::build_view_notifier(config, redis.clone())?;

    let authorization_service = AuthorizationService::new(
        repositories.authorization_repository,
        AuthorizationPolicy {
            bypass_enabled: config.authz_bypass_enabled,
        },
    );

    let role_registry_service = RoleRegistryService::new(
        authorization_service.clone(),
        repositories.role_repository,
        repositories.user_role_repository,
        view_notifier,
    )
    .with_rate_limit(
        rate_limit_service.clone(),
        OperationRateLimits {
            mutations_per_minute: config.mutations_per_minute,
            ..OperationRateLimits::default()
        },
    );

    let audit_chain_service =
        AuditChainService::new(authorization_service.clone(), repositories.audit_log_repository);

    let bootstrap_service =
        BootstrapService::new(repositories.bootstrap_repository, config.bootstrap_token.clone());

    Ok(AppState {
        role_registry_service,
        audit_chain_service,
        authorization_service,
        bootstrap_service,
        rate_limit_service,
        store,
        redis,
        redis_required: config.requires_redis(),
        frontend_url: config.frontend_url.clone(),
        session_max_age_seconds: config.session_max_age_seconds,
    })
}
