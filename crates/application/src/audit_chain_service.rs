use std::sync::Arc;

use tracing::{info, warn};

use stratum_core::{AppError, AppResult, Principal};
use stratum_domain::{AuditLogEntry, ChainVerification, sort_for_verification, verify_chain};

use crate::read_policy::strict;
use crate::{AuditLogRepository, AuthorizationService};

#[cfg(test)]
mod tests;

/// Application service for reading and verifying per-resource audit chains.
#[derive(Clone)]
pub struct AuditChainService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn AuditLogRepository>,
}

impl AuditChainService {
    /// Creates a new audit chain service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Checks the stored linkage of one resource's audit history.
    ///
    /// Entries are compared by their stored hashes only; nothing is recomputed.
    pub async fn verify_chain(
        &self,
        actor: &Principal,
        resource_type: &str,
        resource_id: &str,
    ) -> AppResult<ChainVerification> {
        self.authorization_service.require_admin(actor).await?;
        let (resource_type, resource_id) = normalize_resource(resource_type, resource_id)?;

        let entries = self.load_entries(resource_type, resource_id).await?;
        let verification = verify_chain(&entries);

        if verification.valid {
            info!(
                resource_type,
                resource_id,
                total = verification.total_logs,
                "audit chain verified"
            );
        } else {
            warn!(
                resource_type,
                resource_id,
                broken_at = verification.broken_at,
                "audit chain broken"
            );
        }

        Ok(verification)
    }

    /// Lists one resource's audit history in chain order.
    pub async fn list_resource_history(
        &self,
        actor: &Principal,
        resource_type: &str,
        resource_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.authorization_service.require_admin(actor).await?;
        let (resource_type, resource_id) = normalize_resource(resource_type, resource_id)?;

        self.load_entries(resource_type, resource_id).await
    }

    async fn load_entries(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let mut entries = strict(
            "list_resource_entries",
            self.repository
                .list_resource_entries(resource_type, resource_id),
        )
        .await?;
        sort_for_verification(&mut entries);

        Ok(entries)
    }
}

fn normalize_resource<'a>(
    resource_type: &'a str,
    resource_id: &'a str,
) -> AppResult<(&'a str, &'a str)> {
    let resource_type = resource_type.trim();
    let resource_id = resource_id.trim();

    if resource_type.is_empty() || resource_id.is_empty() {
        return Err(AppError::Validation(
            "resource_type and resource_id are required".to_owned(),
        ));
    }

    Ok((resource_type, resource_id))
}
