use std::sync::Arc;

use tracing::{info, warn};

use stratum_core::{AppError, AppResult, Principal, TenantId};
use stratum_domain::{RoleKey, SystemRole, UserRole};

use crate::{BootstrapOutcome, BootstrapRepository};

#[cfg(test)]
mod tests;

/// Application service for the one-time first-operator grant.
///
/// A configured token lets one principal obtain `master_admin` in a tenant
/// while no privileged assignment exists. The grant is single use.
#[derive(Clone)]
pub struct BootstrapService {
    repository: Arc<dyn BootstrapRepository>,
    token: Option<String>,
}

impl BootstrapService {
    /// Creates a new bootstrap service. `None` disables bootstrap entirely.
    #[must_use]
    pub fn new(repository: Arc<dyn BootstrapRepository>, token: Option<String>) -> Self {
        Self { repository, token }
    }

    /// Returns whether a token is configured and the grant is unconsumed.
    pub async fn is_available(&self) -> AppResult<bool> {
        if self.token.is_none() {
            return Ok(false);
        }

        self.repository.is_available().await
    }

    /// Consumes the grant, assigning `master_admin` to the principal.
    ///
    /// The assignment and its audit entry are stored as one unit.
    pub async fn bootstrap(
        &self,
        presented_token: &str,
        principal: &Principal,
        tenant_id: TenantId,
    ) -> AppResult<UserRole> {
        let Some(expected) = self.token.as_deref() else {
            return Err(AppError::Unauthorized(
                "bootstrap is not enabled".to_owned(),
            ));
        };

        if presented_token != expected {
            warn!(user_id = %principal.user_id(), "rejected bootstrap attempt with invalid token");
            return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()));
        }

        let role_key = RoleKey::new(SystemRole::MasterAdmin.as_str())?;
        let assignment = match self
            .repository
            .consume(principal.user_id(), tenant_id, &role_key)
            .await?
        {
            BootstrapOutcome::Granted(assignment) => assignment,
            BootstrapOutcome::AlreadyConsumed => {
                return Err(AppError::Conflict(
                    "bootstrap token has already been used".to_owned(),
                ));
            }
            BootstrapOutcome::PrivilegedRoleExists => {
                return Err(AppError::Conflict(
                    "an administrative assignment already exists; bootstrap is closed".to_owned(),
                ));
            }
        };

        info!(
            user_id = %principal.user_id(),
            tenant_id = %tenant_id,
            "bootstrap grant consumed"
        );

        Ok(assignment)
    }
}
