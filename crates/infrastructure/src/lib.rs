//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_rate_limit_repository;
mod in_memory_rbac_store;
mod postgres_audit_chain;
mod postgres_audit_log_repository;
mod postgres_authorization_repository;
mod postgres_bootstrap_repository;
mod postgres_errors;
mod postgres_rate_limit_repository;
mod postgres_role_repository;
mod postgres_user_role_repository;
mod redis_rate_limit_repository;
mod redis_view_invalidation_notifier;
mod tracing_view_invalidation_notifier;

pub use in_memory_rate_limit_repository::InMemoryRateLimitRepository;
pub use in_memory_rbac_store::{InMemoryRbacStore, SEEDED_PERMISSION_KEYS};
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_bootstrap_repository::PostgresBootstrapRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_role_repository::PostgresUserRoleRepository;
pub use redis_rate_limit_repository::RedisRateLimitRepository;
pub use redis_view_invalidation_notifier::RedisViewInvalidationNotifier;
pub use tracing_view_invalidation_notifier::TracingViewInvalidationNotifier;
