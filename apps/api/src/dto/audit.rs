use serde::Serialize;
use stratum_domain::{AuditLogEntry, ChainVerification};
use ts_rs::TS;

/// API representation of one audit chain entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub id: String,
    #[ts(type = "number")]
    pub sequence: i64,
    pub resource_type: String,
    pub resource_id: String,
    pub action: String,
    pub actor: String,
    pub tenant_id: Option<String>,
    pub detail: Option<String>,
    pub created_at: String,
    pub hash: String,
    pub prev_hash: Option<String>,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            id: value.id.to_string(),
            sequence: value.sequence,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            action: value.action,
            actor: value.actor,
            tenant_id: value.tenant_id.map(|tenant_id| tenant_id.to_string()),
            detail: value.detail,
            created_at: value.created_at.to_rfc3339(),
            hash: value.hash,
            prev_hash: value.prev_hash,
        }
    }
}

/// Result of checking one resource's audit chain.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/chain-verification-response.ts"
)]
pub struct ChainVerificationResponse {
    pub valid: bool,
    #[ts(type = "number")]
    pub total_logs: usize,
    #[ts(type = "number | null")]
    pub broken_at: Option<usize>,
    pub message: String,
}

impl From<ChainVerification> for ChainVerificationResponse {
    fn from(value: ChainVerification) -> Self {
        Self {
            valid: value.valid,
            total_logs: value.total_logs,
            broken_at: value.broken_at,
            message: value.message,
        }
    }
}
