use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;

use stratum_application::{
    AuditEvent, AuthorizationRepository, UserRoleAssignment, UserRoleRepository,
};
use stratum_core::{AppError, AppResult, TenantId, UserId};
use stratum_domain::{RoleId, UserRole};

use super::InMemoryRbacStore;

#[async_trait]
impl UserRoleRepository for InMemoryRbacStore {
    async fn assign(&self, assignment: UserRole, audit: AuditEvent) -> AppResult<()> {
        let mut state = self.state.write().await;

        if !state.roles.contains_key(&assignment.role_id) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                assignment.role_id
            )));
        }
        if state.assignments.contains_key(&assignment) {
            return Err(AppError::Conflict(format!(
                "user '{}' already holds role '{}' in tenant '{}'",
                assignment.user_id, assignment.role_id, assignment.tenant_id
            )));
        }

        let entries = state.chain_audit(vec![audit])?;

        state.assignments.insert(assignment, Utc::now());
        state.record_audit(entries);
        Ok(())
    }

    async fn revoke(&self, assignment: UserRole, audit: AuditEvent) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !state.assignments.contains_key(&assignment) {
            return Ok(false);
        }
        let entries = state.chain_audit(vec![audit])?;

        state.assignments.remove(&assignment);
        state.record_audit(entries);
        Ok(true)
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let state = self.state.read().await;

        let mut assignments: Vec<UserRoleAssignment> = state
            .assignments
            .iter()
            .filter(|(assignment, _)| {
                assignment.user_id == user_id
                    && tenant_id.is_none_or(|tenant_id| assignment.tenant_id == tenant_id)
            })
            .filter_map(|(assignment, assigned_at)| {
                state
                    .roles
                    .get(&assignment.role_id)
                    .map(|role| UserRoleAssignment {
                        assignment: *assignment,
                        role_key: role.key().clone(),
                        role_label: role.label().clone(),
                        assigned_at: *assigned_at,
                    })
            })
            .collect();
        assignments.sort_by(|left, right| {
            left.assignment
                .tenant_id
                .cmp(&right.assignment.tenant_id)
                .then_with(|| left.role_key.cmp(&right.role_key))
        });

        Ok(assignments)
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryRbacStore {
    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        let state = self.state.read().await;
        let role_ids: BTreeSet<RoleId> = state
            .assignments
            .keys()
            .filter(|assignment| assignment.user_id == user_id)
            .map(|assignment| assignment.role_id)
            .collect();

        Ok(role_ids.into_iter().collect())
    }

    async fn list_role_keys(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let mut keys: Vec<String> = role_ids
            .iter()
            .filter_map(|role_id| state.roles.get(role_id))
            .map(|role| role.key().as_str().to_owned())
            .collect();
        keys.sort();
        keys.dedup();

        Ok(keys)
    }
}
