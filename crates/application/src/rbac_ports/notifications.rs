use async_trait::async_trait;
use stratum_core::AppResult;

/// Presentation-layer signal that a cached view is stale.
#[async_trait]
pub trait ViewInvalidationNotifier: Send + Sync {
    /// Marks the view rendered at `path` as stale.
    async fn mark_stale(&self, path: &str) -> AppResult<()>;
}
