use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::api_services::StoreHandle;
use crate::dto::HealthDependencyStatus;

pub(super) async fn check_store(store: &StoreHandle) -> HealthDependencyStatus {
    let StoreHandle::Postgres(pool) = store else {
        return HealthDependencyStatus {
            status: "ok",
            detail: Some("in-memory store".to_owned()),
        };
    };

    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Err(error) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("postgres check failed: {error}")),
        },
    }
}

pub(super) async fn check_redis(
    connection: Option<ConnectionManager>,
    redis_required: bool,
) -> HealthDependencyStatus {
    let Some(mut connection) = connection else {
        return if redis_required {
            HealthDependencyStatus {
                status: "error",
                detail: Some("redis connection is not configured".to_owned()),
            }
        } else {
            HealthDependencyStatus {
                status: "disabled",
                detail: None,
            }
        };
    };

    match connection.ping::<String>().await {
        Ok(value) if value.eq_ignore_ascii_case("pong") => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Ok(value) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("unexpected redis ping response: {value}")),
        },
        Err(error) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("redis ping failed: {error}")),
        },
    }
}
