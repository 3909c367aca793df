//! Process-local adapter for every registry port.
//!
//! One lock guards the whole state, so each port call is atomic. Used by the
//! `memory` store backend and by scenario tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use stratum_core::{AppError, AppResult};
use stratum_domain::{
    AuditLogEntry, Permission, PermissionId, Role, RoleId, RoleKey, RoleLabel, SystemRole, UserRole,
};

mod assignments;
mod audit;
mod bootstrap;
mod roles;


/// Permission keys present in a fresh store.
pub const SEEDED_PERMISSION_KEYS: &[&str] = &[
    "roles.read",
    "roles.manage",
    "user_roles.manage",
    "audit.read",
];

#[derive(Debug, Default)]
struct RbacState {
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    bindings: HashMap<RoleId, BTreeSet<PermissionId>>,
    module_permissions: HashMap<RoleId, BTreeMap<(String, String), bool>>,
    assignments: HashMap<UserRole, DateTime<Utc>>,
    audit_logs: Vec<AuditLogEntry>,
    next_sequence: i64,
    bootstrap_consumed_at: Option<DateTime<Utc>>,
}

impl RbacState {
    fn seeded() -> AppResult<Self> {
        let mut state = Self::default();

        for system_role in SystemRole::all() {
            let label = system_role
                .as_str()
                .split('_')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" ");
            let role = Role::new(
                RoleId::new(),
                RoleKey::new(system_role.as_str())?,
                RoleLabel::new(label)?,
                None,
            );
            state.roles.insert(role.id(), role);
        }

        for key in SEEDED_PERMISSION_KEYS {
            let permission = Permission::new(PermissionId::new(), *key, None)?;
            state.permissions.insert(permission.id(), permission);
        }

        Ok(state)
    }

    fn role_by_key(&self, key: &str) -> Option<&Role> {
        self.roles.values().find(|role| role.key().as_str() == key)
    }

    fn assignment_count(&self, role_id: RoleId) -> u64 {
        self.assignments
            .keys()
            .filter(|assignment| assignment.role_id == role_id)
            .count() as u64
    }

    fn privileged_assignment_exists(&self) -> bool {
        self.assignments.keys().any(|assignment| {
            self.roles
                .get(&assignment.role_id)
                .is_some_and(Role::is_system_reserved)
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut characters = word.chars();
    characters
        .next()
        .map(|first| first.to_uppercase().chain(characters).collect())
        .unwrap_or_default()
}

/// In-memory implementation of the registry, authorization, audit and
/// bootstrap ports.
#[derive(Debug)]
pub struct InMemoryRbacStore {
    state: RwLock<RbacState>,
}

impl InMemoryRbacStore {
    /// Creates a store seeded with the system roles and default permissions.
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            state: RwLock::new(RbacState::seeded()?),
        })
    }

    /// Adds one permission reference row.
    pub async fn insert_permission(
        &self,
        key: &str,
        description: Option<String>,
    ) -> AppResult<PermissionId> {
        let mut state = self.state.write().await;
        if state
            .permissions
            .values()
            .any(|permission| permission.key() == key.trim())
        {
            return Err(AppError::Conflict(format!(
                "permission '{key}' already exists"
            )));
        }

        let permission = Permission::new(PermissionId::new(), key, description)?;
        let permission_id = permission.id();
        state.permissions.insert(permission_id, permission);

        Ok(permission_id)
    }

    /// Returns the id of the role with the given key.
    pub async fn role_id_by_key(&self, key: &str) -> Option<RoleId> {
        self.state.read().await.role_by_key(key).map(Role::id)
    }
}
