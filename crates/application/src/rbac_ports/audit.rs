use async_trait::async_trait;
use stratum_core::{AppResult, TenantId};
use stratum_domain::{AuditAction, AuditLogEntry};

/// Audit event payload emitted by registry use-cases before it is chained.
///
/// Mutating repository calls take the event with the change they describe and
/// record both as one unit: either the change and its chained entry are
/// stored together or neither is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Optional tenant scope for the event.
    pub tenant_id: Option<TenantId>,
    /// Actor that performed the action.
    pub actor: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for reading recorded audit entries.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Lists every entry of one resource ordered by `created_at`, then sequence.
    async fn list_resource_entries(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>>;
}
