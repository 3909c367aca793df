//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod audit;
mod permission;
mod query;
mod role;
mod security;

pub use assignment::UserRole;
pub use audit::{
    AuditHashInput, AuditLogEntry, ChainVerification, compute_entry_hash, sort_for_verification,
    verify_chain,
};
pub use permission::{ModulePermission, Permission, PermissionId};
pub use query::{RoleListQuery, RoleSortField, SortOrder};
pub use role::{
    ROLE_DESCRIPTION_MAX_LENGTH, ROLE_KEY_MAX_LENGTH, ROLE_KEY_MIN_LENGTH, ROLE_LABEL_MAX_LENGTH,
    ROLE_LABEL_MIN_LENGTH, Role, RoleId, RoleKey, RoleLabel, normalize_role_description,
};
pub use security::{AuditAction, SystemRole};
