//! Redis-backed fixed-window counters.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::Script;
use redis::aio::ConnectionManager;

use stratum_application::{AttemptInfo, RateLimitRepository};
use stratum_core::{AppError, AppResult};

// INCR then arm the TTL on the first hit of a window.
const RECORD_ATTEMPT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('TTL', KEYS[1])
local window = tonumber(ARGV[1])

if ttl < 0 then
  redis.call('EXPIRE', KEYS[1], window)
  ttl = window
end

return {count, tonumber(ARGV[2]) - (window - ttl)}
"#;

/// Redis implementation of the rate limit repository port.
#[derive(Clone)]
pub struct RedisRateLimitRepository {
    connection: ConnectionManager,
    key_prefix: String,
}

impl RedisRateLimitRepository {
    /// Creates a repository over a shared connection manager.
    #[must_use]
    pub fn new(connection: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            connection,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &str) -> String {
        format!("{}:{key}", self.key_prefix)
    }
}

#[async_trait]
impl RateLimitRepository for RedisRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let window = i32::try_from(window_duration_seconds)
            .ok()
            .filter(|window| *window > 0)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "rate limit window must be a positive number of seconds, got {window_duration_seconds}"
                ))
            })?;

        let mut connection = self.connection.clone();
        let (attempt_count, window_started_epoch): (i64, i64) = Script::new(RECORD_ATTEMPT_SCRIPT)
            .key(self.key_for(key))
            .arg(window)
            .arg(Utc::now().timestamp())
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to record call for '{key}' in redis: {error}"))
            })?;

        let attempt_count = i32::try_from(attempt_count).unwrap_or(i32::MAX);
        let window_started_at = Utc
            .timestamp_opt(window_started_epoch, 0)
            .single()
            .ok_or_else(|| {
                AppError::Store(format!(
                    "redis returned an invalid window start: {window_started_epoch}"
                ))
            })?;

        Ok(AttemptInfo {
            attempt_count,
            window_started_at,
        })
    }

    async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
        // Keys carry their own TTL.
        Ok(0)
    }
}
