use async_trait::async_trait;
use chrono::Utc;

use stratum_application::{BootstrapOutcome, BootstrapRepository, bootstrap_audit_event};
use stratum_core::{AppError, AppResult, TenantId, UserId};
use stratum_domain::{Role, RoleKey, UserRole};

use super::InMemoryRbacStore;

#[async_trait]
impl BootstrapRepository for InMemoryRbacStore {
    async fn consume(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        role_key: &RoleKey,
    ) -> AppResult<BootstrapOutcome> {
        let mut state = self.state.write().await;

        if state.bootstrap_consumed_at.is_some() {
            return Ok(BootstrapOutcome::AlreadyConsumed);
        }
        if state.privileged_assignment_exists() {
            return Ok(BootstrapOutcome::PrivilegedRoleExists);
        }

        let role_id = state
            .role_by_key(role_key.as_str())
            .map(Role::id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_key}' does not exist")))?;

        let assignment = UserRole::new(user_id, tenant_id, role_id);
        let entries = state.chain_audit(vec![bootstrap_audit_event(&assignment, role_key)])?;

        let now = Utc::now();
        state.assignments.insert(assignment, now);
        state.bootstrap_consumed_at = Some(now);
        state.record_audit(entries);

        Ok(BootstrapOutcome::Granted(assignment))
    }

    async fn is_available(&self) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.bootstrap_consumed_at.is_none() && !state.privileged_assignment_exists())
    }
}
