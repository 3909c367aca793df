use std::sync::Arc;

use tracing::warn;

use stratum_core::{AppError, AppResult, Principal};
use stratum_domain::SystemRole;

use crate::AuthorizationRepository;

/// Operator-controlled authorization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthorizationPolicy {
    /// Break-glass switch that skips the role checks for every authenticated
    /// principal. Leaving it enabled disables authorization entirely.
    pub bypass_enabled: bool,
}

/// Application service resolving whether a principal is an administrator.
///
/// Decisions are never cached: role membership can change between calls.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
    policy: AuthorizationPolicy,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>, policy: AuthorizationPolicy) -> Self {
        Self { repository, policy }
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> AuthorizationPolicy {
        self.policy
    }

    /// Ensures the principal holds one of the system-reserved roles.
    ///
    /// Returns the principal unchanged on success.
    pub async fn verify_admin(&self, principal: Option<&Principal>) -> AppResult<Principal> {
        let principal = principal.ok_or_else(|| {
            AppError::NotAuthenticated("an authenticated principal is required".to_owned())
        })?;

        if self.policy.bypass_enabled {
            warn!(
                user_id = %principal.user_id(),
                "authorization bypass flag is enabled; skipping role checks"
            );
            return Ok(principal.clone());
        }

        if self.resolve_admin_role(principal).await?.is_none() {
            return Err(AppError::Unauthorized(format!(
                "user '{}' does not hold an administrative role",
                principal.user_id()
            )));
        }

        Ok(principal.clone())
    }

    /// Shorthand for [`Self::verify_admin`] with a resolved principal.
    pub async fn require_admin(&self, principal: &Principal) -> AppResult<Principal> {
        self.verify_admin(Some(principal)).await
    }

    /// Returns whether the principal currently passes [`Self::verify_admin`].
    pub async fn has_admin_role(&self, principal: &Principal) -> AppResult<bool> {
        match self.verify_admin(Some(principal)).await {
            Ok(_) => Ok(true),
            Err(AppError::Unauthorized(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    async fn resolve_admin_role(&self, principal: &Principal) -> AppResult<Option<SystemRole>> {
        let role_ids = self
            .repository
            .list_role_ids_for_user(principal.user_id())
            .await?;

        if role_ids.is_empty() {
            return Ok(None);
        }

        let role_keys = self.repository.list_role_keys(&role_ids).await?;

        Ok(role_keys
            .iter()
            .find_map(|key| key.parse::<SystemRole>().ok()))
    }
}

#[cfg(test)]
mod tests;
