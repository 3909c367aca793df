use redis::aio::ConnectionManager;
use stratum_application::{
    AuditChainService, AuthorizationService, BootstrapService, RateLimitService,
    RoleRegistryService,
};

use crate::api_services::StoreHandle;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub role_registry_service: RoleRegistryService,
    pub audit_chain_service: AuditChainService,
    pub authorization_service: AuthorizationService,
    pub bootstrap_service: BootstrapService,
    pub rate_limit_service: RateLimitService,
    pub store: StoreHandle,
    pub redis: Option<ConnectionManager>,
    pub redis_required: bool,
    pub frontend_url: String,
    pub session_max_age_seconds: i64,
}
