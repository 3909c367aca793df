use tracing::info;

use stratum_core::{AppError, AppResult, Principal};
use stratum_domain::{
    AuditAction, PermissionId, Role, RoleId, RoleKey, RoleLabel, RoleListQuery,
    normalize_role_description,
};

use crate::read_policy::{strict, tolerant};
use crate::{CloneRoleInput, CreateRoleInput, RoleDetails, RoleSummary, UpdateRoleInput};

use super::{ROLE_RESOURCE_TYPE, ROLES_VIEW_PATH, RoleRegistryService, role_view_path};

impl RoleRegistryService {
    /// Lists roles with permission counts.
    ///
    /// A failing store read yields an empty list.
    pub async fn list_roles(
        &self,
        actor: &Principal,
        query: RoleListQuery,
    ) -> AppResult<Vec<RoleSummary>> {
        self.authorize(actor, "list_roles", false).await?;

        Ok(tolerant("list_roles", self.role_repository.list_roles(&query)).await)
    }

    /// Returns one role with its permissions and assignment count.
    pub async fn get_role_details(
        &self,
        actor: &Principal,
        role_id: RoleId,
    ) -> AppResult<RoleDetails> {
        self.authorize(actor, "get_role_details", false).await?;

        strict("get_role_details", async {
            let role = self.require_role(role_id).await?;
            let permissions = self.role_repository.list_role_permissions(role_id).await?;
            let user_count = self
                .role_repository
                .count_role_assignments(&[role_id])
                .await?
                .get(&role_id)
                .copied()
                .unwrap_or(0);

            Ok(RoleDetails {
                role,
                permissions,
                user_count,
            })
        })
        .await
    }

    /// Creates a role and binds the requested permissions as one unit.
    pub async fn create_role(&self, actor: &Principal, input: CreateRoleInput) -> AppResult<Role> {
        let actor = self.authorize(actor, "create_role", true).await?;

        let key = RoleKey::new(input.key)?;
        let label = RoleLabel::new(input.label)?;
        let description = normalize_role_description(input.description)?;
        let permissions = self.resolve_permissions(&input.permission_ids).await?;
        let permission_ids: Vec<PermissionId> =
            permissions.iter().map(|permission| permission.id()).collect();

        let role = Role::new(RoleId::new(), key, label, description);
        let audit = Self::audit_event(
            &actor,
            AuditAction::RoleCreated,
            ROLE_RESOURCE_TYPE,
            role.id().to_string(),
            None,
            format!(
                "created role '{}' with {} permission(s)",
                role.key(),
                permission_ids.len()
            ),
        );
        self.role_repository
            .create_role(&role, &permission_ids, audit)
            .await?;

        info!(role_id = %role.id(), role_key = %role.key(), "role created");
        self.invalidate(ROLES_VIEW_PATH).await;

        Ok(role)
    }

    /// Applies label and description changes. The key never changes.
    pub async fn update_role(&self, actor: &Principal, input: UpdateRoleInput) -> AppResult<Role> {
        let actor = self.authorize(actor, "update_role", true).await?;

        let label = input.label.map(RoleLabel::new).transpose()?;
        let description = input
            .description
            .map(|description| normalize_role_description(Some(description)))
            .transpose()?;

        if label.is_none() && description.is_none() {
            return Err(AppError::Validation(
                "at least one of label or description is required".to_owned(),
            ));
        }

        let existing = self.require_role(input.role_id).await?;
        let updated = existing.with_updates(label, description);
        let audit = Self::audit_event(
            &actor,
            AuditAction::RoleUpdated,
            ROLE_RESOURCE_TYPE,
            updated.id().to_string(),
            None,
            format!(
                "updated role '{}' (label '{}' -> '{}')",
                updated.key(),
                existing.label(),
                updated.label()
            ),
        );
        self.role_repository.update_role(&updated, audit).await?;

        info!(role_id = %updated.id(), "role updated");
        self.invalidate(ROLES_VIEW_PATH).await;
        self.invalidate(&role_view_path(updated.id())).await;

        Ok(updated)
    }

    /// Copies a role and its permission bindings under a new key and label.
    pub async fn clone_role(&self, actor: &Principal, input: CloneRoleInput) -> AppResult<Role> {
        let actor = self.authorize(actor, "clone_role", true).await?;

        let key = RoleKey::new(input.new_key)?;
        let label = RoleLabel::new(input.new_label)?;
        let source = self.require_role(input.source_role_id).await?;
        let permission_ids: Vec<PermissionId> = self
            .role_repository
            .list_role_permissions(source.id())
            .await?
            .iter()
            .map(|permission| permission.id())
            .collect();

        let role = Role::new(
            RoleId::new(),
            key,
            label,
            Some(format!("Cloned from {}", source.label())),
        );
        let audit = Self::audit_event(
            &actor,
            AuditAction::RoleCloned,
            ROLE_RESOURCE_TYPE,
            role.id().to_string(),
            None,
            format!(
                "cloned role '{}' from '{}' ({}) with {} permission(s)",
                role.key(),
                source.key(),
                source.id(),
                permission_ids.len()
            ),
        );
        self.role_repository
            .create_role(&role, &permission_ids, audit)
            .await?;

        info!(
            role_id = %role.id(),
            source_role_id = %source.id(),
            "role cloned"
        );
        self.invalidate(ROLES_VIEW_PATH).await;

        Ok(role)
    }

    pub(super) async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}
