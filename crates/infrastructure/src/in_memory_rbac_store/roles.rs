use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use stratum_application::{AuditEvent, RoleRepository, RoleSummary};
use stratum_core::{AppError, AppResult};
use stratum_domain::{
    ModulePermission, Permission, PermissionId, Role, RoleId, RoleListQuery, RoleSortField,
    SortOrder,
};

use super::{InMemoryRbacStore, RbacState};

fn sorted_permissions(
    state: &RbacState,
    permission_ids: &BTreeSet<PermissionId>,
) -> Vec<Permission> {
    let mut permissions: Vec<Permission> = permission_ids
        .iter()
        .filter_map(|permission_id| state.permissions.get(permission_id).cloned())
        .collect();
    permissions.sort_by(|left, right| left.key().cmp(right.key()));
    permissions
}

fn require_permissions(state: &RbacState, permission_ids: &[PermissionId]) -> AppResult<()> {
    match permission_ids
        .iter()
        .find(|permission_id| !state.permissions.contains_key(permission_id))
    {
        Some(missing) => Err(AppError::NotFound(format!(
            "permission '{missing}' does not exist"
        ))),
        None => Ok(()),
    }
}

fn compare_summaries(left: &RoleSummary, right: &RoleSummary, sort_by: RoleSortField) -> Ordering {
    match sort_by {
        RoleSortField::Key => left.role.key().cmp(right.role.key()),
        RoleSortField::Label => left.role.label().as_str().cmp(right.role.label().as_str()),
        RoleSortField::PermissionCount => left.permission_count.cmp(&right.permission_count),
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacStore {
    async fn list_roles(&self, query: &RoleListQuery) -> AppResult<Vec<RoleSummary>> {
        let state = self.state.read().await;
        let search = query.normalized_search();

        let mut summaries: Vec<RoleSummary> = state
            .roles
            .values()
            .filter(|role| {
                search.as_deref().is_none_or(|term| {
                    role.key().as_str().contains(term)
                        || role.label().as_str().to_lowercase().contains(term)
                })
            })
            .map(|role| RoleSummary {
                role: role.clone(),
                permission_count: state
                    .bindings
                    .get(&role.id())
                    .map_or(0, |bindings| bindings.len() as u64),
            })
            .collect();

        summaries.sort_by(|left, right| {
            let primary = compare_summaries(left, right, query.sort_by);
            let primary = match query.sort_order {
                SortOrder::Asc => primary,
                SortOrder::Desc => primary.reverse(),
            };
            primary.then_with(|| left.role.key().cmp(right.role.key()))
        });

        Ok(summaries)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn find_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let mut roles: Vec<Role> = role_ids
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|role_id| state.roles.get(role_id).cloned())
            .collect();
        roles.sort_by(|left, right| left.key().cmp(right.key()));
        Ok(roles)
    }

    async fn list_role_permissions(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(state
            .bindings
            .get(&role_id)
            .map(|bindings| sorted_permissions(&state, bindings))
            .unwrap_or_default())
    }

    async fn count_role_assignments(
        &self,
        role_ids: &[RoleId],
    ) -> AppResult<BTreeMap<RoleId, u64>> {
        let state = self.state.read().await;
        Ok(role_ids
            .iter()
            .map(|role_id| (*role_id, state.assignment_count(*role_id)))
            .filter(|(_, count)| *count > 0)
            .collect())
    }

    async fn create_role(
        &self,
        role: &Role,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state.role_by_key(role.key().as_str()).is_some() {
            return Err(AppError::Conflict(format!(
                "role key '{}' already exists",
                role.key()
            )));
        }
        require_permissions(&state, permission_ids)?;
        let entries = state.chain_audit(vec![audit])?;

        state.roles.insert(role.id(), role.clone());
        state
            .bindings
            .insert(role.id(), permission_ids.iter().copied().collect());
        state.record_audit(entries);
        Ok(())
    }

    async fn update_role(&self, role: &Role, audit: AuditEvent) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(existing) = state.roles.get(&role.id()) else {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id()
            )));
        };
        let updated = existing.with_updates(
            Some(role.label().clone()),
            Some(role.description().map(ToOwned::to_owned)),
        );
        let entries = state.chain_audit(vec![audit])?;

        state.roles.insert(role.id(), updated);
        state.record_audit(entries);
        Ok(())
    }

    async fn delete_roles(&self, role_ids: &[RoleId], audit: Vec<AuditEvent>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let requested: BTreeSet<RoleId> = role_ids.iter().copied().collect();

        let deletable = requested
            .iter()
            .filter(|role_id| {
                state.roles.get(role_id).is_some_and(|role| {
                    !role.is_system_reserved() && state.assignment_count(role.id()) == 0
                })
            })
            .count();
        if deletable != requested.len() {
            return Err(AppError::Conflict(format!(
                "only {deletable} of {} role(s) were deletable; nothing was deleted",
                requested.len()
            )));
        }
        let entries = state.chain_audit(audit)?;

        for role_id in &requested {
            state.roles.remove(role_id);
            state.bindings.remove(role_id);
            state.module_permissions.remove(role_id);
        }
        state.record_audit(entries);

        Ok(requested.len() as u64)
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
        audit: AuditEvent,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }
        require_permissions(&state, permission_ids)?;
        let entries = state.chain_audit(vec![audit])?;

        state
            .bindings
            .insert(role_id, permission_ids.iter().copied().collect());
        state.record_audit(entries);
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let mut permissions: Vec<Permission> = state.permissions.values().cloned().collect();
        permissions.sort_by(|left, right| left.key().cmp(right.key()));
        Ok(permissions)
    }

    async fn find_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(sorted_permissions(
            &state,
            &permission_ids.iter().copied().collect(),
        ))
    }

    async fn save_module_permissions(
        &self,
        role_id: RoleId,
        entries: &[ModulePermission],
        audit: AuditEvent,
    ) -> AppResult<Vec<ModulePermission>> {
        {
            let mut state = self.state.write().await;
            if !state.roles.contains_key(&role_id) {
                return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
            }
            let audit_entries = state.chain_audit(vec![audit])?;

            let saved = state.module_permissions.entry(role_id).or_default();
            for entry in entries {
                saved.insert(
                    (entry.module().to_owned(), entry.action().to_owned()),
                    entry.allowed(),
                );
            }
            state.record_audit(audit_entries);
        }

        self.list_module_permissions(role_id).await
    }

    async fn list_module_permissions(&self, role_id: RoleId) -> AppResult<Vec<ModulePermission>> {
        let state = self.state.read().await;
        state
            .module_permissions
            .get(&role_id)
            .into_iter()
            .flatten()
            .map(|((module, action), allowed)| {
                ModulePermission::new(module.as_str(), action.as_str(), *allowed)
            })
            .collect()
    }
}
