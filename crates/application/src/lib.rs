//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_chain_service;
mod authorization_service;
mod bootstrap_service;
mod rate_limit_service;
mod rbac_ports;
pub mod read_policy;
mod role_registry_service;

pub use audit_chain_service::AuditChainService;
pub use authorization_service::{AuthorizationPolicy, AuthorizationService};
pub use bootstrap_service::BootstrapService;
pub use rate_limit_service::{
    AttemptInfo, OperationRateLimits, RateLimitRepository, RateLimitRule, RateLimitService,
};
pub use rbac_ports::{
    AssignPermissionsInput, AuditEvent, AuditLogRepository, AuthorizationRepository,
    BootstrapOutcome, BootstrapRepository, CloneRoleInput, CreateRoleInput, RoleDetails,
    RoleRepository, RoleSummary, UpdateRoleInput, UserRoleAssignment, UserRoleRepository,
    ViewInvalidationNotifier, bootstrap_audit_event,
};
pub use role_registry_service::{
    ROLE_RESOURCE_TYPE, ROLES_VIEW_PATH, RoleRegistryService, USER_ROLE_RESOURCE_TYPE,
};
