mod bootstrap;
mod session;

pub use bootstrap::{bootstrap_handler, bootstrap_status_handler};
pub use session::{logout_handler, me_handler};

/// Session key holding the authenticated [`stratum_core::Principal`].
pub const SESSION_PRINCIPAL_KEY: &str = "principal";
/// Absolute session creation timestamp.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
