use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use stratum_core::{AppError, AppResult, Principal, TenantId};
use stratum_domain::{AuditAction, Permission, PermissionId};

use crate::{
    AuditEvent, AuthorizationService, OperationRateLimits, RateLimitService, RoleRepository,
    UserRoleRepository, ViewInvalidationNotifier,
};

mod assignments;
mod deletion;
mod permissions;
mod roles;


/// Audit resource type of role records.
pub const ROLE_RESOURCE_TYPE: &str = "role";
/// Audit resource type of user-role assignments.
pub const USER_ROLE_RESOURCE_TYPE: &str = "user_role";
/// View path of the role list.
pub const ROLES_VIEW_PATH: &str = "/admin/roles";

/// Application service for the role and permission registry.
///
/// Every operation authorizes the caller first, then passes the optional
/// rate-limit gate, and only then touches the store. Mutations hand their
/// audit event to the store call so the change and its chained entry commit
/// together.
#[derive(Clone)]
pub struct RoleRegistryService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    view_notifier: Arc<dyn ViewInvalidationNotifier>,
    rate_limit: Option<(RateLimitService, OperationRateLimits)>,
}

impl RoleRegistryService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_repository: Arc<dyn RoleRepository>,
        user_role_repository: Arc<dyn UserRoleRepository>,
        view_notifier: Arc<dyn ViewInvalidationNotifier>,
    ) -> Self {
        Self {
            authorization_service,
            role_repository,
            user_role_repository,
            view_notifier,
            rate_limit: None,
        }
    }

    /// Gates every operation behind per-operation call limits.
    #[must_use]
    pub fn with_rate_limit(
        mut self,
        rate_limit_service: RateLimitService,
        limits: OperationRateLimits,
    ) -> Self {
        self.rate_limit = Some((rate_limit_service, limits));
        self
    }

    async fn authorize(
        &self,
        actor: &Principal,
        operation: &'static str,
        is_mutation: bool,
    ) -> AppResult<Principal> {
        let principal = self.authorization_service.require_admin(actor).await?;

        if let Some((rate_limit_service, limits)) = &self.rate_limit {
            rate_limit_service
                .check_rate_limit(
                    &limits.rule_for(operation, is_mutation),
                    principal.user_id().to_string().as_str(),
                )
                .await?;
        }

        Ok(principal)
    }

    fn audit_event(
        actor: &Principal,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        tenant_id: Option<TenantId>,
        detail: String,
    ) -> AuditEvent {
        AuditEvent {
            tenant_id,
            actor: actor.user_id().to_string(),
            action,
            resource_type: resource_type.to_owned(),
            resource_id,
            detail: Some(detail),
        }
    }

    async fn invalidate(&self, path: &str) {
        if let Err(error) = self.view_notifier.mark_stale(path).await {
            warn!(path, %error, "failed to signal stale view");
        }
    }

    /// Deduplicates the requested ids and fails with `NotFound` when any of
    /// them is not a known permission.
    async fn resolve_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let requested: BTreeSet<PermissionId> = permission_ids.iter().copied().collect();
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let requested: Vec<PermissionId> = requested.into_iter().collect();
        let found = self.role_repository.find_permissions(&requested).await?;
        let found_ids: BTreeSet<PermissionId> =
            found.iter().map(Permission::id).collect();

        let missing: Vec<String> = requested
            .iter()
            .filter(|permission_id| !found_ids.contains(permission_id))
            .map(ToString::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::NotFound(format!(
                "unknown permission id(s): {}",
                missing.join(", ")
            )));
        }

        Ok(found)
    }
}

fn role_view_path(role_id: impl std::fmt::Display) -> String {
    format!("{ROLES_VIEW_PATH}/{role_id}")
}

fn tenant_view_path(tenant_id: TenantId) -> String {
    format!("/admin/tenants/{tenant_id}")
}
