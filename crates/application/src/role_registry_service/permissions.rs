use std::collections::BTreeSet;

use tracing::info;

use stratum_core::{AppError, AppResult, Principal};
use stratum_domain::{AuditAction, ModulePermission, Permission, PermissionId, RoleId};

use crate::AssignPermissionsInput;
use crate::read_policy::{strict, tolerant};

use super::{ROLE_RESOURCE_TYPE, ROLES_VIEW_PATH, RoleRegistryService, role_view_path};

impl RoleRegistryService {
    /// Replaces the complete permission set of a role.
    ///
    /// An empty set removes every binding. Returns the new set ordered by key.
    pub async fn assign_permissions(
        &self,
        actor: &Principal,
        input: AssignPermissionsInput,
    ) -> AppResult<Vec<Permission>> {
        let actor = self.authorize(actor, "assign_permissions", true).await?;

        let role = self.require_role(input.role_id).await?;
        let mut permissions = self.resolve_permissions(&input.permission_ids).await?;
        permissions.sort_by(|left, right| left.key().cmp(right.key()));
        let permission_ids: Vec<PermissionId> =
            permissions.iter().map(Permission::id).collect();

        let keys: Vec<&str> = permissions.iter().map(Permission::key).collect();
        let audit = Self::audit_event(
            &actor,
            AuditAction::RolePermissionsAssigned,
            ROLE_RESOURCE_TYPE,
            role.id().to_string(),
            None,
            format!(
                "replaced permissions of role '{}' with [{}]",
                role.key(),
                keys.join(", ")
            ),
        );
        self.role_repository
            .replace_role_permissions(role.id(), &permission_ids, audit)
            .await?;

        info!(
            role_id = %role.id(),
            count = permission_ids.len(),
            "role permissions replaced"
        );
        self.invalidate(ROLES_VIEW_PATH).await;
        self.invalidate(&role_view_path(role.id())).await;

        Ok(permissions)
    }

    /// Lists every permission reference row.
    ///
    /// A failing store read yields an empty list.
    pub async fn list_permissions(&self, actor: &Principal) -> AppResult<Vec<Permission>> {
        self.authorize(actor, "list_permissions", false).await?;

        Ok(tolerant("list_permissions", self.role_repository.list_permissions()).await)
    }

    /// Upserts legacy per-module grants of a role.
    pub async fn save_module_permissions(
        &self,
        actor: &Principal,
        role_id: RoleId,
        entries: Vec<ModulePermission>,
    ) -> AppResult<Vec<ModulePermission>> {
        let actor = self.authorize(actor, "save_module_permissions", true).await?;

        if entries.is_empty() {
            return Err(AppError::Validation(
                "at least one module permission entry is required".to_owned(),
            ));
        }

        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert((entry.module(), entry.action())) {
                return Err(AppError::Validation(format!(
                    "duplicate module permission entry '{}:{}'",
                    entry.module(),
                    entry.action()
                )));
            }
        }

        let role = self.require_role(role_id).await?;
        let audit = Self::audit_event(
            &actor,
            AuditAction::RoleModulePermissionsSaved,
            ROLE_RESOURCE_TYPE,
            role.id().to_string(),
            None,
            format!(
                "saved {} module permission entr(ies) for role '{}'",
                entries.len(),
                role.key()
            ),
        );
        let saved = self
            .role_repository
            .save_module_permissions(role.id(), &entries, audit)
            .await?;

        info!(role_id = %role.id(), count = entries.len(), "module permissions saved");
        self.invalidate(&role_view_path(role.id())).await;

        Ok(saved)
    }

    /// Lists legacy per-module grants of a role.
    pub async fn list_module_permissions(
        &self,
        actor: &Principal,
        role_id: RoleId,
    ) -> AppResult<Vec<ModulePermission>> {
        self.authorize(actor, "list_module_permissions", false).await?;

        strict("list_module_permissions", async {
            let role = self.require_role(role_id).await?;
            self.role_repository.list_module_permissions(role.id()).await
        })
        .await
    }
}
