use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use stratum_core::{AppError, AppResult, Principal, UserId};
use stratum_domain::{AuditLogEntry, RoleId, compute_entry_hash};

use crate::{AuditLogRepository, AuthorizationPolicy, AuthorizationRepository, AuthorizationService};

use super::AuditChainService;

struct AdminOnlyRepository {
    admin: UserId,
    admin_role: RoleId,
}

#[async_trait]
impl AuthorizationRepository for AdminOnlyRepository {
    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        if user_id == self.admin {
            return Ok(vec![self.admin_role]);
        }

        Ok(Vec::new())
    }

    async fn list_role_keys(&self, _role_ids: &[RoleId]) -> AppResult<Vec<String>> {
        Ok(vec!["super_admin".to_owned()])
    }
}

struct FakeAuditLogRepository {
    entries: Vec<AuditLogEntry>,
}

#[async_trait]
impl AuditLogRepository for FakeAuditLogRepository {
    async fn list_resource_entries(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| {
                entry.resource_type == resource_type && entry.resource_id == resource_id
            })
            .cloned()
            .collect())
    }
}

fn chained_entries(count: usize) -> Vec<AuditLogEntry> {
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().unwrap_or_default();
    let mut entries: Vec<AuditLogEntry> = Vec::with_capacity(count);

    for index in 0..count {
        let prev_hash = entries.last().map(|entry| entry.hash.clone());
        let mut entry = AuditLogEntry {
            id: Uuid::new_v4(),
            sequence: index as i64 + 1,
            resource_type: "role".to_owned(),
            resource_id: "editor".to_owned(),
            action: "role.updated".to_owned(),
            actor: "alice".to_owned(),
            tenant_id: None,
            detail: Some(format!("change {index}")),
            created_at: base + Duration::seconds(index as i64),
            hash: String::new(),
            prev_hash,
        };
        entry.hash = compute_entry_hash(&entry.hash_input());
        entries.push(entry);
    }

    entries
}

fn service(entries: Vec<AuditLogEntry>) -> (AuditChainService, Principal) {
    let admin = Principal::new(UserId::new(), "alice");
    let authorization = AuthorizationService::new(
        Arc::new(AdminOnlyRepository {
            admin: admin.user_id(),
            admin_role: RoleId::new(),
        }),
        AuthorizationPolicy::default(),
    );

    (
        AuditChainService::new(authorization, Arc::new(FakeAuditLogRepository { entries })),
        admin,
    )
}

#[tokio::test]
async fn intact_chain_verifies_regardless_of_storage_order() {
    let mut entries = chained_entries(4);
    entries.reverse();
    let (service, admin) = service(entries);

    let Ok(result) = service.verify_chain(&admin, "role", "editor").await else {
        panic!("verification should run");
    };

    assert!(result.valid);
    assert_eq!(result.total_logs, 4);
    assert_eq!(result.broken_at, None);
}

#[tokio::test]
async fn tampered_link_reports_first_break() {
    let mut entries = chained_entries(4);
    entries[2].prev_hash = Some("0".repeat(64));
    let (service, admin) = service(entries);

    let Ok(result) = service.verify_chain(&admin, "role", "editor").await else {
        panic!("verification should run");
    };

    assert!(!result.valid);
    assert_eq!(result.broken_at, Some(2));
    assert_eq!(result.total_logs, 4);
}

#[tokio::test]
async fn missing_history_is_reported_valid_and_empty() {
    let (service, admin) = service(chained_entries(2));

    let Ok(result) = service.verify_chain(&admin, "role", "viewer").await else {
        panic!("verification should run");
    };

    assert!(result.valid);
    assert_eq!(result.total_logs, 0);
}

#[tokio::test]
async fn verification_requires_admin_and_resource() {
    let (service, admin) = service(chained_entries(1));
    let outsider = Principal::new(UserId::new(), "mallory");

    let denied = service.verify_chain(&outsider, "role", "editor").await;
    let blank = service.verify_chain(&admin, " ", "editor").await;

    assert!(matches!(denied, Err(AppError::Unauthorized(_))));
    assert!(matches!(blank, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn history_is_listed_in_chain_order() {
    let mut entries = chained_entries(3);
    entries.swap(0, 2);
    let (service, admin) = service(entries);

    let Ok(history) = service.list_resource_history(&admin, "role", "editor").await else {
        panic!("history should list");
    };

    let sequences: Vec<i64> = history.iter().map(|entry| entry.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}
