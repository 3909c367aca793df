use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use stratum_core::{AppError, AppResult, Principal};
use stratum_domain::{AuditAction, Role, RoleId};

use crate::AuditEvent;

use super::{ROLE_RESOURCE_TYPE, ROLES_VIEW_PATH, RoleRegistryService, role_view_path};

impl RoleRegistryService {
    /// Deletes one role.
    ///
    /// Fails with `Conflict` while any user holds the role or when the role is
    /// system-reserved. Nothing is removed on failure.
    pub async fn delete_role(&self, actor: &Principal, role_id: RoleId) -> AppResult<()> {
        let actor = self.authorize(actor, "delete_role", true).await?;

        let role = self.require_role(role_id).await?;
        let assignment_counts = self
            .role_repository
            .count_role_assignments(&[role_id])
            .await?;

        if let Some(blocker) = deletion_blocker(&role, &assignment_counts) {
            return Err(AppError::Conflict(blocker));
        }

        self.role_repository
            .delete_roles(&[role_id], vec![deletion_event(&actor, &role)])
            .await?;

        info!(role_id = %role_id, role_key = %role.key(), "role deleted");
        self.invalidate(ROLES_VIEW_PATH).await;
        self.invalidate(&role_view_path(role_id)).await;

        Ok(())
    }

    /// Deletes several roles all-or-nothing.
    ///
    /// Every role is checked before anything is removed; a single blocked or
    /// unknown role fails the whole batch. The batch and one audit entry per
    /// role are stored together. Returns the number removed.
    pub async fn bulk_delete_roles(
        &self,
        actor: &Principal,
        role_ids: Vec<RoleId>,
    ) -> AppResult<u64> {
        let actor = self.authorize(actor, "bulk_delete_roles", true).await?;

        let requested: Vec<RoleId> = role_ids
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if requested.is_empty() {
            return Err(AppError::Validation(
                "at least one role id is required".to_owned(),
            ));
        }

        let roles = self.role_repository.find_roles(&requested).await?;
        let found: BTreeSet<RoleId> = roles.iter().map(Role::id).collect();
        let missing: Vec<String> = requested
            .iter()
            .filter(|role_id| !found.contains(role_id))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!(
                "unknown role id(s): {}",
                missing.join(", ")
            )));
        }

        let assignment_counts = self
            .role_repository
            .count_role_assignments(&requested)
            .await?;
        let blockers: Vec<String> = roles
            .iter()
            .filter_map(|role| deletion_blocker(role, &assignment_counts))
            .collect();
        if !blockers.is_empty() {
            return Err(AppError::Conflict(blockers.join("; ")));
        }

        let audit = roles
            .iter()
            .map(|role| deletion_event(&actor, role))
            .collect();
        let removed = self.role_repository.delete_roles(&requested, audit).await?;

        info!(count = removed, "roles deleted");
        self.invalidate(ROLES_VIEW_PATH).await;
        for role_id in &requested {
            self.invalidate(&role_view_path(role_id)).await;
        }

        Ok(removed)
    }
}

fn deletion_event(actor: &Principal, role: &Role) -> AuditEvent {
    RoleRegistryService::audit_event(
        actor,
        AuditAction::RoleDeleted,
        ROLE_RESOURCE_TYPE,
        role.id().to_string(),
        None,
        format!("deleted role '{}'", role.key()),
    )
}

/// Returns why a role cannot be deleted; assignments are checked first.
fn deletion_blocker(role: &Role, assignment_counts: &BTreeMap<RoleId, u64>) -> Option<String> {
    let assigned = assignment_counts.get(&role.id()).copied().unwrap_or(0);
    if assigned > 0 {
        return Some(format!(
            "role '{}' is assigned to {assigned} user(s) and cannot be deleted",
            role.key()
        ));
    }

    if role.is_system_reserved() {
        return Some(format!(
            "role '{}' is system-reserved and cannot be deleted",
            role.key()
        ));
    }

    None
}
