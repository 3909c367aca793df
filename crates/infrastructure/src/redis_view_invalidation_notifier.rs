//! Redis pub/sub view invalidation.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use stratum_application::ViewInvalidationNotifier;
use stratum_core::{AppError, AppResult};

/// Publishes stale view paths on a Redis channel.
#[derive(Clone)]
pub struct RedisViewInvalidationNotifier {
    connection: ConnectionManager,
    channel: String,
}

impl RedisViewInvalidationNotifier {
    /// Creates a notifier publishing on `channel`.
    #[must_use]
    pub fn new(connection: ConnectionManager, channel: impl Into<String>) -> Self {
        Self {
            connection,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl ViewInvalidationNotifier for RedisViewInvalidationNotifier {
    async fn mark_stale(&self, path: &str) -> AppResult<()> {
        let mut connection = self.connection.clone();
        let _subscribers: i64 = connection
            .publish(self.channel.as_str(), path)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to publish stale view '{path}' on '{}': {error}",
                    self.channel
                ))
            })?;

        Ok(())
    }
}
