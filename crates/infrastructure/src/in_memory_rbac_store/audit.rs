use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use uuid::Uuid;

use stratum_application::{AuditEvent, AuditLogRepository};
use stratum_core::{AppError, AppResult};
use stratum_domain::{AuditHashInput, AuditLogEntry, compute_entry_hash, sort_for_verification};

use super::{InMemoryRbacStore, RbacState};

fn require_recordable(event: &AuditEvent) -> AppResult<()> {
    let blank = [
        ("resource type", event.resource_type.as_str()),
        ("resource id", event.resource_id.as_str()),
        ("actor", event.actor.as_str()),
    ]
    .into_iter()
    .find(|(_, value)| value.is_empty());

    match blank {
        Some((field, _)) => Err(AppError::Store(format!(
            "failed to append audit entry: {field} must not be empty"
        ))),
        None => Ok(()),
    }
}

fn chain_tip<'a>(
    entries: impl Iterator<Item = &'a AuditLogEntry>,
    event: &AuditEvent,
) -> Option<&'a AuditLogEntry> {
    entries
        .filter(|entry| {
            entry.resource_type == event.resource_type && entry.resource_id == event.resource_id
        })
        .max_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then(left.sequence.cmp(&right.sequence))
        })
}

impl RbacState {
    /// Builds the chained entries for `events` without storing them.
    ///
    /// Callers check every precondition of their change first, then chain,
    /// then apply the change and [`RbacState::record_audit`] under the same
    /// guard. An error here leaves the state untouched.
    pub(super) fn chain_audit(&self, events: Vec<AuditEvent>) -> AppResult<Vec<AuditLogEntry>> {
        let now = Utc::now().trunc_subsecs(6);
        let mut chained: Vec<AuditLogEntry> = Vec::with_capacity(events.len());

        for event in events {
            require_recordable(&event)?;

            let tip = chain_tip(self.audit_logs.iter().chain(chained.iter()), &event);
            let created_at = tip.map_or(now, |tip| now.max(tip.created_at));
            let prev_hash = tip.map(|tip| tip.hash.clone());
            let action = event.action.as_str().to_owned();

            let hash = compute_entry_hash(&AuditHashInput {
                resource_type: event.resource_type.as_str(),
                resource_id: event.resource_id.as_str(),
                action: action.as_str(),
                actor: event.actor.as_str(),
                tenant_id: event.tenant_id,
                detail: event.detail.as_deref(),
                created_at,
                prev_hash: prev_hash.as_deref(),
            });

            let sequence = self.next_sequence + chained.len() as i64 + 1;
            chained.push(AuditLogEntry {
                id: Uuid::new_v4(),
                sequence,
                resource_type: event.resource_type,
                resource_id: event.resource_id,
                action,
                actor: event.actor,
                tenant_id: event.tenant_id,
                detail: event.detail,
                created_at,
                hash,
                prev_hash,
            });
        }

        Ok(chained)
    }

    /// Stores entries built by [`RbacState::chain_audit`].
    pub(super) fn record_audit(&mut self, entries: Vec<AuditLogEntry>) {
        if let Some(last) = entries.last() {
            self.next_sequence = last.sequence;
        }
        self.audit_logs.extend(entries);
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryRbacStore {
    async fn list_resource_entries(
        &self,
        resource_type: &str,
        resource_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<AuditLogEntry> = state
            .audit_logs
            .iter()
            .filter(|entry| {
                entry.resource_type == resource_type && entry.resource_id == resource_id
            })
            .cloned()
            .collect();
        sort_for_verification(&mut entries);

        Ok(entries)
    }
}
