use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use stratum_core::{AppError, AppResult};

use super::config::RateLimitRule;
use super::ports::RateLimitRepository;

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Records the attempt and returns `Err(AppError::RateLimited)` once the
    /// rule's limit is exceeded within the window.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, key: &str) -> AppResult<()> {
        if !self.is_allowed(rule, key).await? {
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Records the attempt and reports whether it stays within the limit.
    pub async fn is_allowed(&self, rule: &RateLimitRule, key: &str) -> AppResult<bool> {
        let composite_key = format!("{}:{key}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        let allowed = info.attempt_count <= rule.max_attempts;
        if !allowed {
            warn!(
                key = %composite_key,
                attempts = info.attempt_count,
                limit = rule.max_attempts,
                "rate limit exceeded"
            );
        }

        Ok(allowed)
    }

    /// Removes expired rate limit entries.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}
