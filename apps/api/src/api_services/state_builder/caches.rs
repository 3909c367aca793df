use std::sync::Arc;

use redis::aio::ConnectionManager;
use stratum_application::{RateLimitRepository, RateLimitService, ViewInvalidationNotifier};
use stratum_core::{AppError, AppResult};
use stratum_infrastructure::{
    InMemoryRateLimitRepository, PostgresRateLimitRepository, RedisRateLimitRepository,
    RedisViewInvalidationNotifier, TracingViewInvalidationNotifier,
};

use crate::api_config::{ApiConfig, RateLimitStore, ViewInvalidationBackend};

use super::StoreHandle;

pub(super) fn build_rate_limit_service(
    store: &StoreHandle,
    config: &ApiConfig,
    redis: Option<ConnectionManager>,
) -> AppResult<RateLimitService> {
    let rate_limit_repository: Arc<dyn RateLimitRepository> =
        match (config.rate_limit_store, store) {
            (RateLimitStore::Postgres, StoreHandle::Postgres(pool)) => {
                Arc::new(PostgresRateLimitRepository::new(pool.clone()))
            }
            (RateLimitStore::Postgres, StoreHandle::Memory(_)) => {
                return Err(AppError::Validation(
                    "RATE_LIMIT_STORE=postgres requires STORE_BACKEND=postgres".to_owned(),
                ));
            }
            (RateLimitStore::Redis, _) => {
                let connection = redis.ok_or_else(|| {
                    AppError::Validation(
                        "REDIS_URL is required when RATE_LIMIT_STORE=redis".to_owned(),
                    )
                })?;
                Arc::new(RedisRateLimitRepository::new(
                    connection,
                    "stratum:rate_limit",
                ))
            }
            (RateLimitStore::Memory, _) => Arc::new(InMemoryRateLimitRepository::new()),
        };

    Ok(RateLimitService::new(rate_limit_repository))
}

pub(super) fn build_view_notifier(
    config: &ApiConfig,
    redis: Option<ConnectionManager>,
) -> AppResult<Arc<dyn ViewInvalidationNotifier>> {
    match config.view_invalidation_backend {
        ViewInvalidationBackend::Log => Ok(Arc::new(TracingViewInvalidationNotifier)),
        ViewInvalidationBackend::Redis => {
            let connection = redis.ok_or_else(|| {
                AppError::Validation(
                    "REDIS_URL is required when VIEW_INVALIDATION_BACKEND=redis".to_owned(),
                )
            })?;
            Ok(Arc::new(RedisViewInvalidationNotifier::new(
                connection,
                "stratum:view_invalidation",
            )))
        }
    }
}
