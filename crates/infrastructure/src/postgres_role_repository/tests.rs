use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use stratum_application::{AuditEvent, AuditLogRepository, RoleRepository};
use stratum_core::{AppError, TenantId, UserId};
use stratum_domain::{
    AuditAction, ModulePermission, PermissionId, Role, RoleId, RoleKey, RoleLabel, RoleListQuery,
    RoleSortField, SortOrder,
};

use super::PostgresRoleRepository;
use crate::PostgresAuditLogRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres role tests: {error}");
    }

    Some(pool)
}

fn unique_key(prefix: &str) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .filter(char::is_ascii_lowercase)
        .take(12)
        .collect();
    format!("{prefix}_{suffix}")
}

fn role(key: &str) -> Role {
    let (Ok(key), Ok(label)) = (RoleKey::new(key), RoleLabel::new("Test Role")) else {
        panic!("invalid fixture role");
    };
    Role::new(RoleId::new(), key, label, None)
}

fn audit(role: &Role, action: AuditAction) -> AuditEvent {
    AuditEvent {
        tenant_id: None,
        actor: "alice".to_owned(),
        action,
        resource_type: "role".to_owned(),
        resource_id: role.id().to_string(),
        detail: None,
    }
}

fn created(role: &Role) -> AuditEvent {
    audit(role, AuditAction::RoleCreated)
}

async fn insert_permission(pool: &PgPool, key: &str) -> PermissionId {
    let permission_id = PermissionId::new();
    let insert = sqlx::query("INSERT INTO permissions (id, key) VALUES ($1, $2)")
        .bind(permission_id.as_uuid())
        .bind(key)
        .execute(pool)
        .await;
    assert!(insert.is_ok());
    permission_id
}

async fn insert_assignment(pool: &PgPool, role_id: RoleId) {
    let insert =
        sqlx::query("INSERT INTO user_roles (user_id, tenant_id, role_id) VALUES ($1, $2, $3)")
            .bind(UserId::new().as_uuid())
            .bind(TenantId::new().as_uuid())
            .bind(role_id.as_uuid())
            .execute(pool)
            .await;
    assert!(insert.is_ok());
}

#[tokio::test]
async fn create_role_persists_role_and_bindings_together() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool.clone());
    let permission_id = insert_permission(&pool, &unique_key("perm")).await;
    let role = role(&unique_key("editor"));

    assert!(repository.create_role(&role, &[permission_id], created(&role)).await.is_ok());
    let duplicate = repository.create_role(&role, &[], created(&role)).await;
    let ghost = self::role(&unique_key("ghost"));
    let dangling = repository
        .create_role(&ghost, &[PermissionId::new()], created(&ghost))
        .await;

    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert!(matches!(dangling, Err(AppError::NotFound(_))));
    let permissions = repository.list_role_permissions(role.id()).await;
    assert_eq!(permissions.ok().map(|permissions| permissions.len()), Some(1));
}

#[tokio::test]
async fn list_roles_filters_and_sorts_by_permission_count() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool.clone());
    let marker = unique_key("marker");
    let first = insert_permission(&pool, &unique_key("perm")).await;
    let second = insert_permission(&pool, &unique_key("perm")).await;
    let sparse = role(&format!("{marker}_a"));
    let dense = role(&format!("{marker}_b"));
    assert!(repository.create_role(&sparse, &[first], created(&sparse)).await.is_ok());
    assert!(repository.create_role(&dense, &[first, second], created(&dense)).await.is_ok());

    let Ok(listed) = repository
        .list_roles(&RoleListQuery {
            search: Some(marker.to_uppercase()),
            sort_by: RoleSortField::PermissionCount,
            sort_order: SortOrder::Desc,
        })
        .await
    else {
        panic!("roles should list");
    };

    let ids: Vec<RoleId> = listed.iter().map(|summary| summary.role.id()).collect();
    assert_eq!(ids, vec![dense.id(), sparse.id()]);
    assert_eq!(listed[0].permission_count, 2);
}

#[tokio::test]
async fn delete_roles_is_all_or_nothing() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool.clone());
    let free = role(&unique_key("free"));
    let busy = role(&unique_key("busy"));
    assert!(repository.create_role(&free, &[], created(&free)).await.is_ok());
    assert!(repository.create_role(&busy, &[], created(&busy)).await.is_ok());
    insert_assignment(&pool, busy.id()).await;

    let blocked = repository
        .delete_roles(
            &[free.id(), busy.id()],
            vec![
                audit(&free, AuditAction::RoleDeleted),
                audit(&busy, AuditAction::RoleDeleted),
            ],
        )
        .await;
    let still_there = repository.find_role(free.id()).await;
    let removed = repository
        .delete_roles(&[free.id()], vec![audit(&free, AuditAction::RoleDeleted)])
        .await;

    assert!(matches!(blocked, Err(AppError::Conflict(_))));
    assert!(matches!(still_there, Ok(Some(_))));
    assert_eq!(removed.ok(), Some(1));
    let counts = repository.count_role_assignments(&[busy.id()]).await;
    assert_eq!(
        counts.ok().and_then(|counts| counts.get(&busy.id()).copied()),
        Some(1)
    );
}

#[tokio::test]
async fn delete_roles_never_removes_system_roles() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool.clone());
    let Ok(system_role_id) =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE key = 'super_admin'")
            .fetch_one(&pool)
            .await
    else {
        panic!("super_admin should be seeded");
    };

    let system_role_id = RoleId::from_uuid(system_role_id);
    let result = repository
        .delete_roles(
            &[system_role_id],
            vec![AuditEvent {
                resource_id: system_role_id.to_string(),
                ..audit(&role("placeholder"), AuditAction::RoleDeleted)
            }],
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn replace_and_module_permissions_round_trip() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool.clone());
    let first = insert_permission(&pool, &unique_key("perm")).await;
    let second = insert_permission(&pool, &unique_key("perm")).await;
    let role = role(&unique_key("swap"));
    assert!(repository.create_role(&role, &[first], created(&role)).await.is_ok());

    assert!(
        repository
            .replace_role_permissions(
                role.id(),
                &[second],
                audit(&role, AuditAction::RolePermissionsAssigned)
            )
            .await
            .is_ok()
    );
    let ghost = self::role(&unique_key("ghost"));
    let missing = repository
        .replace_role_permissions(
            ghost.id(),
            &[second],
            audit(&ghost, AuditAction::RolePermissionsAssigned),
        )
        .await;
    let Ok(bound) = repository.list_role_permissions(role.id()).await else {
        panic!("bindings should list");
    };

    assert!(matches!(missing, Err(AppError::NotFound(_))));
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].id(), second);

    let (Ok(allow), Ok(deny)) = (
        ModulePermission::new("contacts", "read", true),
        ModulePermission::new("contacts", "read", false),
    ) else {
        panic!("invalid fixture module permission");
    };
    assert!(
        repository
            .save_module_permissions(
                role.id(),
                &[allow],
                audit(&role, AuditAction::RoleModulePermissionsSaved)
            )
            .await
            .is_ok()
    );
    let Ok(saved) = repository
        .save_module_permissions(
            role.id(),
            &[deny],
            audit(&role, AuditAction::RoleModulePermissionsSaved),
        )
        .await
    else {
        panic!("module permissions should save");
    };

    assert_eq!(saved.len(), 1);
    assert!(!saved[0].allowed());
}

#[tokio::test]
async fn failed_audit_append_rolls_back_the_write() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool.clone());
    let audit_log = PostgresAuditLogRepository::new(pool);
    let editor = role(&unique_key("editor"));
    let unrecordable = AuditEvent {
        actor: String::new(),
        ..created(&editor)
    };

    let failed = repository.create_role(&editor, &[], unrecordable).await;
    let after_failure = repository.find_role(editor.id()).await;

    assert!(matches!(failed, Err(AppError::Store(_))));
    assert!(matches!(after_failure, Ok(None)));

    assert!(repository.create_role(&editor, &[], created(&editor)).await.is_ok());
    let failed_delete = repository
        .delete_roles(
            &[editor.id()],
            vec![AuditEvent {
                actor: String::new(),
                ..audit(&editor, AuditAction::RoleDeleted)
            }],
        )
        .await;
    let after_delete = repository.find_role(editor.id()).await;
    let Ok(entries) = audit_log
        .list_resource_entries("role", &editor.id().to_string())
        .await
    else {
        panic!("audit entries should list");
    };

    assert!(matches!(failed_delete, Err(AppError::Store(_))));
    assert!(matches!(after_delete, Ok(Some(_))));
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::RoleCreated.as_str());
}
