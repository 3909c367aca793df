//! Hash-chained audit appends that join the caller's transaction.

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use stratum_application::AuditEvent;
use stratum_core::{AppError, AppResult};
use stratum_domain::{AuditHashInput, compute_entry_hash};

#[derive(Debug, FromRow)]
struct ChainTipRow {
    hash: String,
    created_at: DateTime<Utc>,
}

/// Appends one event to its resource's chain inside `transaction`.
///
/// The entry commits or rolls back with the caller's change. Appends to one
/// resource are serialized with a transaction-scoped advisory lock held until
/// that commit, so two writers never link to the same predecessor.
pub(crate) async fn append_chained_event(
    transaction: &mut Transaction<'_, Postgres>,
    event: AuditEvent,
) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1 || ':' || $2, 0))")
        .bind(event.resource_type.as_str())
        .bind(event.resource_id.as_str())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Store(format!("failed to lock audit chain: {error}")))?;

    let tip = sqlx::query_as::<_, ChainTipRow>(
        r#"
        SELECT hash, created_at
        FROM audit_logs
        WHERE resource_type = $1
            AND resource_id = $2
        ORDER BY created_at DESC, sequence DESC
        LIMIT 1
        "#,
    )
    .bind(event.resource_type.as_str())
    .bind(event.resource_id.as_str())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Store(format!("failed to load audit chain tip: {error}")))?;

    // Postgres keeps microseconds; the hash must cover the stored value.
    let now = Utc::now().trunc_subsecs(6);
    let created_at = tip
        .as_ref()
        .map_or(now, |tip| now.max(tip.created_at));
    let prev_hash = tip.map(|tip| tip.hash);
    let action = event.action.as_str();

    let hash = compute_entry_hash(&AuditHashInput {
        resource_type: event.resource_type.as_str(),
        resource_id: event.resource_id.as_str(),
        action,
        actor: event.actor.as_str(),
        tenant_id: event.tenant_id,
        detail: event.detail.as_deref(),
        created_at,
        prev_hash: prev_hash.as_deref(),
    });

    sqlx::query(
        r#"
        INSERT INTO audit_logs (
            id,
            resource_type,
            resource_id,
            action,
            actor,
            tenant_id,
            detail,
            created_at,
            hash,
            prev_hash
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(event.resource_type.as_str())
    .bind(event.resource_id.as_str())
    .bind(action)
    .bind(event.actor.as_str())
    .bind(event.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
    .bind(event.detail.as_deref())
    .bind(created_at)
    .bind(hash.as_str())
    .bind(prev_hash.as_deref())
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Store(format!("failed to append audit entry: {error}")))?;

    Ok(())
}

/// Appends several events in order inside `transaction`.
pub(crate) async fn append_chained_events(
    transaction: &mut Transaction<'_, Postgres>,
    events: Vec<AuditEvent>,
) -> AppResult<()> {
    for event in events {
        append_chained_event(transaction, event).await?;
    }

    Ok(())
}
