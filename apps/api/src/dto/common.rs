use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Status of one backing dependency.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub store: HealthDependencyStatus,
    pub redis: HealthDependencyStatus,
}

/// API representation of the session principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/principal-response.ts"
)]
pub struct PrincipalResponse {
    pub user_id: String,
    pub display_name: String,
    pub is_admin: bool,
}

/// Incoming payload for the one-time first-operator grant.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub token: String,
    pub user_id: String,
    pub display_name: String,
    pub tenant_id: String,
}

/// Whether the first-operator grant can still be used.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bootstrap-status-response.ts"
)]
pub struct BootstrapStatusResponse {
    pub available: bool,
}
