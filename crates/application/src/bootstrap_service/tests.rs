use std::sync::Arc;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use stratum_core::{AppError, AppResult, Principal, TenantId, UserId};
use stratum_domain::{AuditAction, RoleId, RoleKey, UserRole};

use crate::{AuditEvent, BootstrapOutcome, BootstrapRepository, bootstrap_audit_event};

use super::BootstrapService;

#[derive(Default)]
struct FakeBootstrapRepository {
    consumed: Mutex<bool>,
    events: Mutex<Vec<AuditEvent>>,
    privileged_exists: bool,
    fail_audit: AtomicBool,
    master_admin_role: RoleId,
}

#[async_trait]
impl BootstrapRepository for FakeBootstrapRepository {
    async fn consume(
        &self,
        user_id: UserId,
        tenant_id: TenantId,
        role_key: &RoleKey,
    ) -> AppResult<BootstrapOutcome> {
        assert_eq!(role_key.as_str(), "master_admin");
        let mut consumed = self.consumed.lock().await;
        if *consumed {
            return Ok(BootstrapOutcome::AlreadyConsumed);
        }
        if self.privileged_exists {
            return Ok(BootstrapOutcome::PrivilegedRoleExists);
        }

        let assignment = UserRole::new(user_id, tenant_id, self.master_admin_role);
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(AppError::Store("audit append failed".to_owned()));
        }

        *consumed = true;
        self.events
            .lock()
            .await
            .push(bootstrap_audit_event(&assignment, role_key));
        Ok(BootstrapOutcome::Granted(assignment))
    }

    async fn is_available(&self) -> AppResult<bool> {
        Ok(!*self.consumed.lock().await && !self.privileged_exists)
    }
}

const TOKEN: &str = "0123456789abcdef0123456789abcdef";

fn service(
    repository: FakeBootstrapRepository,
    token: Option<&str>,
) -> (BootstrapService, Arc<FakeBootstrapRepository>) {
    let repository = Arc::new(repository);
    (
        BootstrapService::new(repository.clone(), token.map(ToOwned::to_owned)),
        repository,
    )
}

#[tokio::test]
async fn bootstrap_grants_master_admin_once() {
    let (service, audit) = service(FakeBootstrapRepository::default(), Some(TOKEN));
    let principal = Principal::new(UserId::new(), "alice");
    let tenant_id = TenantId::new();

    let first = service.bootstrap(TOKEN, &principal, tenant_id).await;
    let second = service.bootstrap(TOKEN, &principal, tenant_id).await;

    let Ok(assignment) = first else {
        panic!("first bootstrap should succeed");
    };
    assert_eq!(assignment.user_id, principal.user_id());
    assert_eq!(assignment.tenant_id, tenant_id);
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(service.is_available().await.ok(), Some(false));

    let events = audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::BootstrapConsumed);
    assert_eq!(events[0].resource_id, assignment.resource_id());
}

#[tokio::test]
async fn bootstrap_rejects_wrong_or_unconfigured_token() {
    let (configured, _) = service(FakeBootstrapRepository::default(), Some(TOKEN));
    let (unconfigured, _) = service(FakeBootstrapRepository::default(), None);
    let principal = Principal::new(UserId::new(), "mallory");

    let wrong = configured
        .bootstrap("not-the-token", &principal, TenantId::new())
        .await;
    let disabled = unconfigured.bootstrap(TOKEN, &principal, TenantId::new()).await;

    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
    assert!(matches!(disabled, Err(AppError::Unauthorized(_))));
    assert_eq!(configured.is_available().await.ok(), Some(true));
    assert_eq!(unconfigured.is_available().await.ok(), Some(false));
}

#[tokio::test]
async fn bootstrap_closes_once_an_admin_exists() {
    let (service, audit) = service(
        FakeBootstrapRepository {
            privileged_exists: true,
            ..FakeBootstrapRepository::default()
        },
        Some(TOKEN),
    );

    let result = service
        .bootstrap(TOKEN, &Principal::new(UserId::new(), "bob"), TenantId::new())
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn failed_audit_append_leaves_the_grant_available() {
    let (service, repository) = service(
        FakeBootstrapRepository {
            fail_audit: AtomicBool::new(true),
            ..FakeBootstrapRepository::default()
        },
        Some(TOKEN),
    );
    let principal = Principal::new(UserId::new(), "alice");

    let failed = service.bootstrap(TOKEN, &principal, TenantId::new()).await;

    assert!(matches!(failed, Err(AppError::Store(_))));
    assert_eq!(service.is_available().await.ok(), Some(true));
    assert!(repository.events.lock().await.is_empty());

    repository.fail_audit.store(false, Ordering::SeqCst);
    let retried = service.bootstrap(TOKEN, &principal, TenantId::new()).await;

    assert!(retried.is_ok());
    assert_eq!(repository.events.lock().await.len(), 1);
}
