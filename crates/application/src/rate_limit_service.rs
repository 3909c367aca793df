//! Rate limiting ports and application service.
//!
//! A fixed-window counter keyed by `"{operation}:{caller}"`, consulted as a
//! gate before registry logic runs.

mod config;
mod ports;
mod service;

pub use config::{OperationRateLimits, RateLimitRule};
pub use ports::{AttemptInfo, RateLimitRepository};
pub use service::RateLimitService;

#[cfg(test)]
mod tests;
