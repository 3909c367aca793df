use async_trait::async_trait;
use tracing::debug;

use stratum_application::ViewInvalidationNotifier;
use stratum_core::AppResult;

/// Notifier that only records stale view paths in the trace log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingViewInvalidationNotifier;

#[async_trait]
impl ViewInvalidationNotifier for TracingViewInvalidationNotifier {
    async fn mark_stale(&self, path: &str) -> AppResult<()> {
        debug!(path, "view marked stale");
        Ok(())
    }
}
