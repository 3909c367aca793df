//! Periodic pruning of expired rate limit windows.

use std::time::Duration;

use stratum_application::RateLimitService;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Runs [`RateLimitService::cleanup`] once at startup and then every
/// `interval`. A failed pass is logged and retried on the next tick.
pub fn spawn_rate_limit_cleanup_worker(
    service: RateLimitService,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_seconds = interval.as_secs(),
            "rate limit cleanup worker started"
        );

        loop {
            match service.cleanup().await {
                Ok(removed) => debug!(removed, "rate limit cleanup pass finished"),
                Err(error) => warn!(error = %error, "rate limit cleanup pass failed"),
            }

            tokio::time::sleep(interval).await;
        }
    })
}
