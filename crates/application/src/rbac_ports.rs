mod audit;
mod bootstrap;
mod notifications;
mod repositories;
mod roles;

pub use audit::{AuditEvent, AuditLogRepository};
pub use bootstrap::{BootstrapOutcome, BootstrapRepository, bootstrap_audit_event};
pub use notifications::ViewInvalidationNotifier;
pub use repositories::{AuthorizationRepository, RoleRepository, UserRoleRepository};
pub use roles::{
    AssignPermissionsInput, CloneRoleInput, CreateRoleInput, RoleDetails, RoleSummary,
    UpdateRoleInput, UserRoleAssignment,
};
