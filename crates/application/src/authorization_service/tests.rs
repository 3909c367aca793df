use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use stratum_core::{AppError, AppResult, Principal, UserId};
use stratum_domain::RoleId;

use crate::AuthorizationRepository;

use super::{AuthorizationPolicy, AuthorizationService};

#[derive(Default)]
struct FakeAuthorizationRepository {
    assignments: HashMap<UserId, Vec<RoleId>>,
    role_keys: HashMap<RoleId, String>,
    lookups: AtomicUsize,
    fail_lookups: bool,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn list_role_ids_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleId>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(AppError::Store("connection refused".to_owned()));
        }

        Ok(self.assignments.get(&user_id).cloned().unwrap_or_default())
    }

    async fn list_role_keys(&self, role_ids: &[RoleId]) -> AppResult<Vec<String>> {
        Ok(role_ids
            .iter()
            .filter_map(|role_id| self.role_keys.get(role_id).cloned())
            .collect())
    }
}

fn repository_with_role(user_id: UserId, key: &str) -> FakeAuthorizationRepository {
    let role_id = RoleId::new();
    FakeAuthorizationRepository {
        assignments: HashMap::from([(user_id, vec![role_id])]),
        role_keys: HashMap::from([(role_id, key.to_owned())]),
        ..FakeAuthorizationRepository::default()
    }
}

fn principal(user_id: UserId) -> Principal {
    Principal::new(user_id, "alice")
}

#[tokio::test]
async fn verify_admin_requires_principal() {
    let service = AuthorizationService::new(
        Arc::new(FakeAuthorizationRepository::default()),
        AuthorizationPolicy::default(),
    );

    let result = service.verify_admin(None).await;

    assert!(matches!(result, Err(AppError::NotAuthenticated(_))));
}

#[tokio::test]
async fn verify_admin_allows_each_system_role() {
    for key in ["master_admin", "super_admin", "admin"] {
        let user_id = UserId::new();
        let service = AuthorizationService::new(
            Arc::new(repository_with_role(user_id, key)),
            AuthorizationPolicy::default(),
        );

        let result = service.verify_admin(Some(&principal(user_id))).await;

        assert_eq!(result.ok(), Some(principal(user_id)), "role {key}");
    }
}

#[tokio::test]
async fn verify_admin_denies_user_without_roles() {
    let user_id = UserId::new();
    let service = AuthorizationService::new(
        Arc::new(FakeAuthorizationRepository::default()),
        AuthorizationPolicy::default(),
    );

    let result = service.verify_admin(Some(&principal(user_id))).await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn verify_admin_denies_non_privileged_roles() {
    let user_id = UserId::new();
    let service = AuthorizationService::new(
        Arc::new(repository_with_role(user_id, "editor")),
        AuthorizationPolicy::default(),
    );

    let result = service.verify_admin(Some(&principal(user_id))).await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn bypass_skips_role_lookup_but_not_authentication() {
    let repository = Arc::new(FakeAuthorizationRepository::default());
    let service = AuthorizationService::new(
        repository.clone(),
        AuthorizationPolicy {
            bypass_enabled: true,
        },
    );

    let allowed = service.verify_admin(Some(&principal(UserId::new()))).await;
    let anonymous = service.verify_admin(None).await;

    assert!(allowed.is_ok());
    assert!(matches!(anonymous, Err(AppError::NotAuthenticated(_))));
    assert_eq!(repository.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn verify_admin_is_re_evaluated_on_every_call() {
    let user_id = UserId::new();
    let repository = Arc::new(repository_with_role(user_id, "admin"));
    let service = AuthorizationService::new(repository.clone(), AuthorizationPolicy::default());

    for _ in 0..3 {
        assert!(service.verify_admin(Some(&principal(user_id))).await.is_ok());
    }

    assert_eq!(repository.lookups.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn store_failures_propagate_instead_of_denying() {
    let service = AuthorizationService::new(
        Arc::new(FakeAuthorizationRepository {
            fail_lookups: true,
            ..FakeAuthorizationRepository::default()
        }),
        AuthorizationPolicy::default(),
    );

    let result = service.verify_admin(Some(&principal(UserId::new()))).await;
    let flag = service.has_admin_role(&principal(UserId::new())).await;

    assert!(matches!(result, Err(AppError::Store(_))));
    assert!(matches!(flag, Err(AppError::Store(_))));
}

#[tokio::test]
async fn has_admin_role_reports_denial_as_false() {
    let service = AuthorizationService::new(
        Arc::new(FakeAuthorizationRepository::default()),
        AuthorizationPolicy::default(),
    );

    let result = service.has_admin_role(&principal(UserId::new())).await;

    assert_eq!(result.ok(), Some(false));
}
