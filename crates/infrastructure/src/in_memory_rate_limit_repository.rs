//! Process-local fixed-window counters.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use stratum_application::{AttemptInfo, RateLimitRepository};
use stratum_core::AppResult;

/// In-memory implementation of the rate limit repository port.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    windows: Mutex<HashMap<String, AttemptInfo>>,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let now = Utc::now();
        let window = Duration::seconds(window_duration_seconds);
        let mut windows = self.windows.lock().await;

        let info = windows
            .entry(key.to_owned())
            .and_modify(|info| {
                if info.window_started_at + window <= now {
                    info.attempt_count = 1;
                    info.window_started_at = now;
                } else {
                    info.attempt_count = info.attempt_count.saturating_add(1);
                }
            })
            .or_insert(AttemptInfo {
                attempt_count: 1,
                window_started_at: now,
            });

        Ok(info.clone())
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut windows = self.windows.lock().await;
        let before_count = windows.len();
        windows.retain(|_, info| info.window_started_at >= before);

        Ok((before_count - windows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use stratum_application::RateLimitRepository;

    use super::InMemoryRateLimitRepository;

    #[tokio::test]
    async fn counts_attempts_within_the_window() {
        let repository = InMemoryRateLimitRepository::new();

        let _ = repository.record_attempt("create_role:alice", 60).await;
        let second = repository.record_attempt("create_role:alice", 60).await;
        let other = repository.record_attempt("create_role:bob", 60).await;

        assert_eq!(second.ok().map(|info| info.attempt_count), Some(2));
        assert_eq!(other.ok().map(|info| info.attempt_count), Some(1));
    }

    #[tokio::test]
    async fn zero_second_windows_restart_every_call() {
        let repository = InMemoryRateLimitRepository::new();

        let _ = repository.record_attempt("delete_role:alice", 0).await;
        let second = repository.record_attempt("delete_role:alice", 0).await;

        assert_eq!(second.ok().map(|info| info.attempt_count), Some(1));
    }

    #[tokio::test]
    async fn cleanup_drops_stale_windows() {
        let repository = InMemoryRateLimitRepository::new();
        let _ = repository.record_attempt("list_roles:alice", 60).await;

        let removed = repository
            .cleanup_expired(Utc::now() + Duration::seconds(1))
            .await;

        assert_eq!(removed.ok(), Some(1));
    }
}
