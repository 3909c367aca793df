use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use stratum_application::{AuditEvent, AuditLogRepository};
use stratum_core::AppResult;
use stratum_domain::{AuditAction, compute_entry_hash, verify_chain};

use super::PostgresAuditLogRepository;
use crate::postgres_audit_chain::append_chained_event;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres audit tests: {error}");
    }

    Some(pool)
}

fn event(resource_id: &str, detail: String) -> AuditEvent {
    AuditEvent {
        tenant_id: None,
        actor: "alice".to_owned(),
        action: AuditAction::RoleUpdated,
        resource_type: "role".to_owned(),
        resource_id: resource_id.to_owned(),
        detail: Some(detail),
    }
}

async fn append(pool: &PgPool, event: AuditEvent) -> AppResult<()> {
    let Ok(mut transaction) = pool.begin().await else {
        panic!("transaction should begin");
    };
    append_chained_event(&mut transaction, event).await?;
    let Ok(()) = transaction.commit().await else {
        panic!("transaction should commit");
    };
    Ok(())
}

#[tokio::test]
async fn appended_entries_form_a_verifiable_chain() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let reader = PostgresAuditLogRepository::new(pool.clone());
    let resource_id = Uuid::new_v4().to_string();

    for index in 0..3 {
        assert!(
            append(&pool, event(&resource_id, format!("change {index}")))
                .await
                .is_ok()
        );
    }
    let Ok(entries) = reader.list_resource_entries("role", &resource_id).await else {
        panic!("entries should list");
    };

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].prev_hash, None);
    assert!(
        entries
            .iter()
            .all(|entry| compute_entry_hash(&entry.hash_input()) == entry.hash)
    );
    assert!(verify_chain(&entries).valid);
}

#[tokio::test]
async fn concurrent_appends_never_fork_the_chain() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let reader = PostgresAuditLogRepository::new(pool.clone());
    let resource_id = Uuid::new_v4().to_string();

    let mut handles = Vec::new();
    for index in 0..8 {
        let pool = pool.clone();
        let resource_id = resource_id.clone();
        handles.push(tokio::spawn(async move {
            append(&pool, event(&resource_id, format!("writer {index}"))).await
        }));
    }
    for handle in handles {
        assert!(matches!(handle.await, Ok(Ok(_))));
    }

    let Ok(entries) = reader.list_resource_entries("role", &resource_id).await else {
        panic!("entries should list");
    };

    assert_eq!(entries.len(), 8);
    let verification = verify_chain(&entries);
    assert!(verification.valid, "{}", verification.message);
}

#[tokio::test]
async fn rolled_back_append_leaves_no_entry() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let reader = PostgresAuditLogRepository::new(pool.clone());
    let resource_id = Uuid::new_v4().to_string();

    let Ok(mut transaction) = pool.begin().await else {
        panic!("transaction should begin");
    };
    assert!(
        append_chained_event(&mut transaction, event(&resource_id, "discarded".to_owned()))
            .await
            .is_ok()
    );
    let Ok(()) = transaction.rollback().await else {
        panic!("transaction should roll back");
    };

    assert!(append(&pool, event(&resource_id, "kept".to_owned())).await.is_ok());
    let Ok(entries) = reader.list_resource_entries("role", &resource_id).await else {
        panic!("entries should list");
    };

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].detail.as_deref(), Some("kept"));
    assert_eq!(entries[0].prev_hash, None);
}
