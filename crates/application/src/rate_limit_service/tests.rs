use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use stratum_core::{AppError, AppResult};

use super::{AttemptInfo, OperationRateLimits, RateLimitRepository, RateLimitRule, RateLimitService};

#[derive(Default)]
struct FakeRateLimitRepository {
    counters: Mutex<HashMap<String, i32>>,
}

#[async_trait]
impl RateLimitRepository for FakeRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        _window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let mut counters = self.counters.lock().await;
        let count = counters.entry(key.to_owned()).or_insert(0);
        *count += 1;

        Ok(AttemptInfo {
            attempt_count: *count,
            window_started_at: Utc::now(),
        })
    }

    async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
        Ok(0)
    }
}

#[tokio::test]
async fn rejects_attempts_beyond_limit() {
    let service = RateLimitService::new(Arc::new(FakeRateLimitRepository::default()));
    let rule = RateLimitRule::per_minute("delete_role", 2);

    assert!(service.check_rate_limit(&rule, "alice").await.is_ok());
    assert!(service.check_rate_limit(&rule, "alice").await.is_ok());
    let third = service.check_rate_limit(&rule, "alice").await;

    assert!(matches!(third, Err(AppError::RateLimited(_))));
}

#[tokio::test]
async fn counters_are_isolated_per_operation_and_caller() {
    let repository = Arc::new(FakeRateLimitRepository::default());
    let service = RateLimitService::new(repository.clone());
    let create = RateLimitRule::per_minute("create_role", 1);
    let delete = RateLimitRule::per_minute("delete_role", 1);

    assert_eq!(service.is_allowed(&create, "alice").await.ok(), Some(true));
    assert_eq!(service.is_allowed(&delete, "alice").await.ok(), Some(true));
    assert_eq!(service.is_allowed(&create, "bob").await.ok(), Some(true));
    assert_eq!(service.is_allowed(&create, "alice").await.ok(), Some(false));

    let counters = repository.counters.lock().await;
    assert_eq!(counters.get("create_role:alice"), Some(&2));
}

#[test]
fn operation_limits_pick_mutation_or_read_budget() {
    let limits = OperationRateLimits {
        mutations_per_minute: 5,
        reads_per_minute: 50,
    };

    assert_eq!(limits.rule_for("create_role", true).max_attempts, 5);
    assert_eq!(limits.rule_for("list_roles", false).max_attempts, 50);
    assert_eq!(limits.rule_for("list_roles", false).window_seconds, 60);
}
