use redis::aio::ConnectionManager;
use stratum_core::AppError;

fn build_redis_client(redis_url: &str) -> Result<redis::Client, AppError> {
    redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))
}

pub async fn connect_redis(redis_url: &str) -> Result<ConnectionManager, AppError> {
    build_redis_client(redis_url)?
        .get_connection_manager()
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
}
