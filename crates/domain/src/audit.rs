//! Hash-chained audit entries and the chain verifier.
//!
//! Every entry stores the hash of the entry recorded before it for the same
//! resource. Verification only compares those links; it never recomputes or
//! repairs a hash, so it certifies the recorded chain shape and nothing more.
//! A chain rewritten consistently end to end is not detectable here.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stratum_core::TenantId;
use uuid::Uuid;

/// Content covered by an audit entry hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditHashInput<'a> {
    /// Audited resource type.
    pub resource_type: &'a str,
    /// Audited resource identifier.
    pub resource_id: &'a str,
    /// Stable action identifier.
    pub action: &'a str,
    /// Actor that performed the action.
    pub actor: &'a str,
    /// Optional tenant scope.
    pub tenant_id: Option<TenantId>,
    /// Optional detail text.
    pub detail: Option<&'a str>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Hash of the preceding entry for the same resource.
    pub prev_hash: Option<&'a str>,
}

/// Computes the write-once SHA-256 hash of an audit entry, hex encoded.
///
/// Each field is written as `<byte length>:<value>` and an absent optional
/// field as `-`, so no two distinct inputs share an encoding.
#[must_use]
pub fn compute_entry_hash(input: &AuditHashInput<'_>) -> String {
    let tenant_id = input.tenant_id.map(|tenant_id| tenant_id.to_string());
    let created_at = input
        .created_at
        .to_rfc3339_opts(SecondsFormat::Micros, true);

    let fields = [
        Some(input.resource_type),
        Some(input.resource_id),
        Some(input.action),
        Some(input.actor),
        tenant_id.as_deref(),
        input.detail,
        Some(created_at.as_str()),
        input.prev_hash,
    ];

    let mut hasher = Sha256::new();
    for field in fields {
        match field {
            Some(value) => {
                hasher.update(value.len().to_string().as_bytes());
                hasher.update(b":");
                hasher.update(value.as_bytes());
            }
            None => hasher.update(b"-"),
        }
        hasher.update(b";");
    }

    hex::encode(hasher.finalize())
}

/// Persisted audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Stable entry identifier.
    pub id: Uuid,
    /// Server-assigned monotonic insertion sequence.
    pub sequence: i64,
    /// Audited resource type.
    pub resource_type: String,
    /// Audited resource identifier.
    pub resource_id: String,
    /// Stable action identifier.
    pub action: String,
    /// Actor that performed the action.
    pub actor: String,
    /// Optional tenant scope.
    pub tenant_id: Option<TenantId>,
    /// Optional detail text.
    pub detail: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Write-once content hash.
    pub hash: String,
    /// Hash of the preceding entry for the same resource.
    pub prev_hash: Option<String>,
}

impl AuditLogEntry {
    /// Returns the hash input view of this entry.
    #[must_use]
    pub fn hash_input(&self) -> AuditHashInput<'_> {
        AuditHashInput {
            resource_type: self.resource_type.as_str(),
            resource_id: self.resource_id.as_str(),
            action: self.action.as_str(),
            actor: self.actor.as_str(),
            tenant_id: self.tenant_id,
            detail: self.detail.as_deref(),
            created_at: self.created_at,
            prev_hash: self.prev_hash.as_deref(),
        }
    }
}

/// Sorts entries into verification order: `created_at`, then sequence.
pub fn sort_for_verification(entries: &mut [AuditLogEntry]) {
    entries.sort_by(|left, right| {
        left.created_at
            .cmp(&right.created_at)
            .then(left.sequence.cmp(&right.sequence))
    });
}

/// Result of verifying one resource's audit chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainVerification {
    /// Whether every link matched.
    pub valid: bool,
    /// Number of entries inspected.
    pub total_logs: usize,
    /// Index of the first entry whose `prev_hash` did not match.
    pub broken_at: Option<usize>,
    /// Human-readable summary.
    pub message: String,
}

/// Verifies that ordered entries form an unbroken hash chain.
///
/// An empty sequence is reported valid: absence of a trail is treated as
/// nothing to contradict, which is a policy choice rather than a guarantee.
#[must_use]
pub fn verify_chain(entries: &[AuditLogEntry]) -> ChainVerification {
    let total_logs = entries.len();

    if entries.is_empty() {
        return ChainVerification {
            valid: true,
            total_logs,
            broken_at: None,
            message: "no audit entries recorded; nothing to verify".to_owned(),
        };
    }

    let broken_at = entries
        .windows(2)
        .position(|pair| pair[1].prev_hash.as_deref() != Some(pair[0].hash.as_str()))
        .map(|position| position + 1);

    match broken_at {
        None => ChainVerification {
            valid: true,
            total_logs,
            broken_at: None,
            message: format!("audit chain intact across {total_logs} entries"),
        },
        Some(index) => ChainVerification {
            valid: false,
            total_logs,
            broken_at: Some(index),
            message: format!(
                "audit chain broken at index {index}: prev_hash does not match the hash of entry {}",
                index - 1
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::{AuditLogEntry, compute_entry_hash, sort_for_verification, verify_chain};

    fn chain(length: usize) -> Vec<AuditLogEntry> {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let mut entries: Vec<AuditLogEntry> = Vec::with_capacity(length);

        for index in 0..length {
            let prev_hash = entries.last().map(|entry| entry.hash.clone());
            let mut entry = AuditLogEntry {
                id: Uuid::new_v4(),
                sequence: index as i64 + 1,
                resource_type: "role".to_owned(),
                resource_id: "role-1".to_owned(),
                action: "role.updated".to_owned(),
                actor: "alice".to_owned(),
                tenant_id: None,
                detail: Some(format!("change {index}")),
                created_at: start + Duration::seconds(index as i64),
                hash: String::new(),
                prev_hash,
            };
            entry.hash = compute_entry_hash(&entry.hash_input());
            entries.push(entry);
        }

        entries
    }

    #[test]
    fn empty_chain_is_vacuously_valid() {
        let result = verify_chain(&[]);
        assert!(result.valid);
        assert_eq!(result.total_logs, 0);
        assert_eq!(result.broken_at, None);
    }

    #[test]
    fn single_entry_is_valid_regardless_of_prev_hash() {
        let mut entries = chain(1);
        entries[0].prev_hash = Some("dangling".to_owned());
        assert!(verify_chain(&entries).valid);
    }

    #[test]
    fn linked_chain_is_valid() {
        let result = verify_chain(&chain(5));
        assert!(result.valid);
        assert_eq!(result.total_logs, 5);
    }

    #[test]
    fn deleted_entry_breaks_chain_at_gap() {
        let mut entries = chain(4);
        entries.remove(1);
        let result = verify_chain(&entries);
        assert!(!result.valid);
        assert_eq!(result.broken_at, Some(1));
    }

    #[test]
    fn missing_prev_hash_after_first_entry_breaks_chain() {
        let mut entries = chain(3);
        entries[2].prev_hash = None;
        assert_eq!(verify_chain(&entries).broken_at, Some(2));
    }

    #[test]
    fn hash_depends_on_prev_hash() {
        let entries = chain(1);
        let mut input = entries[0].hash_input();
        let original = compute_entry_hash(&input);
        input.prev_hash = Some("other");
        assert_ne!(original, compute_entry_hash(&input));
    }

    #[test]
    fn shifting_a_separator_between_fields_changes_the_hash() {
        let entries = chain(1);
        let mut split_in_actor = entries[0].hash_input();
        split_in_actor.actor = "alice\nrole.updated";
        split_in_actor.action = "x";
        let mut split_in_action = entries[0].hash_input();
        split_in_action.actor = "alice";
        split_in_action.action = "role.updated\nx";

        assert_ne!(
            compute_entry_hash(&split_in_actor),
            compute_entry_hash(&split_in_action)
        );
    }

    #[test]
    fn absent_and_empty_detail_hash_differently() {
        let entries = chain(1);
        let mut absent = entries[0].hash_input();
        absent.detail = None;
        let mut empty = entries[0].hash_input();
        empty.detail = Some("");

        assert_ne!(compute_entry_hash(&absent), compute_entry_hash(&empty));
    }

    #[test]
    fn sort_orders_by_timestamp_then_sequence() {
        let mut entries = chain(3);
        let same_instant = entries[0].created_at;
        for entry in &mut entries {
            entry.created_at = same_instant;
        }
        entries.reverse();
        sort_for_verification(&mut entries);
        let sequences: Vec<i64> = entries.iter().map(|entry| entry.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert!(verify_chain(&entries).valid);
    }

    proptest! {
        #[test]
        fn tampered_link_is_reported_at_its_index(length in 2usize..24, seed in 0usize..1000) {
            let mut entries = chain(length);
            let tampered = 1 + seed % (length - 1);
            entries[tampered].prev_hash = Some("0".repeat(64));

            let result = verify_chain(&entries);
            prop_assert!(!result.valid);
            prop_assert_eq!(result.total_logs, length);
            prop_assert_eq!(result.broken_at, Some(tampered));
        }

        #[test]
        fn untampered_chains_verify(length in 0usize..24) {
            let result = verify_chain(&chain(length));
            prop_assert!(result.valid);
            prop_assert_eq!(result.total_logs, length);
        }
    }
}
