//! Failure policies for registry reads.
//!
//! List views use [`tolerant`]: a failed store read is logged and replaced by
//! an empty result so dashboards stay up. Single-entity reads use [`strict`]:
//! the failure reaches the caller. Every operation picks one explicitly.

use std::future::Future;

use tracing::{error, warn};

use stratum_core::AppResult;

/// Runs a list read, returning the default value when the read fails.
pub async fn tolerant<T, F>(operation: &'static str, read: F) -> T
where
    T: Default,
    F: Future<Output = AppResult<T>>,
{
    match read.await {
        Ok(value) => value,
        Err(read_error) => {
            warn!(
                operation,
                error = %read_error,
                "list read failed; returning empty result"
            );
            T::default()
        }
    }
}

/// Runs a single-entity read, propagating any failure.
pub async fn strict<T, F>(operation: &'static str, read: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    read.await.inspect_err(|read_error| {
        error!(operation, error = %read_error, "read failed");
    })
}
