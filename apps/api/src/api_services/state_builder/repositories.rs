use std::sync::Arc;

use stratum_application::{
    AuditLogRepository, AuthorizationRepository, BootstrapRepository, RoleRepository,
    UserRoleRepository,
};
use stratum_infrastructure::{
    PostgresAuditLogRepository, PostgresAuthorizationRepository, PostgresBootstrapRepository,
    PostgresRoleRepository, PostgresUserRoleRepository,
};

use super::StoreHandle;

pub(super) struct RepositorySet {
    pub(super) authorization_repository: Arc<dyn AuthorizationRepository>,
    pub(super) role_repository: Arc<dyn RoleRepository>,
    pub(super) user_role_repository: Arc<dyn UserRoleRepository>,
    pub(super) audit_log_repository: Arc<dyn AuditLogRepository>,
    pub(super) bootstrap_repository: Arc<dyn BootstrapRepository>,
}

pub(super) fn build_repository_set(store: &StoreHandle) -> RepositorySet {
    match store {
        StoreHandle::Postgres(pool) => RepositorySet {
            authorization_repository: Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
            role_repository: Arc::new(PostgresRoleRepository::new(pool.clone())),
            user_role_repository: Arc::new(PostgresUserRoleRepository::new(pool.clone())),
            audit_log_repository: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
            bootstrap_repository: Arc::new(PostgresBootstrapRepository::new(pool.clone())),
        },
        StoreHandle::Memory(store) => RepositorySet {
            authorization_repository: store.clone(),
            role_repository: store.clone(),
            user_role_repository: store.clone(),
            audit_log_repository: store.clone(),
            bootstrap_repository: store.clone(),
        },
    }
}
