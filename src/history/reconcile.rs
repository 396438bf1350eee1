//! Pending-Transfer Reconciler
//!
//! Merges locally recorded transfers with the indexer's history and decides
//! which pending records are no longer needed. Pure: same inputs, same output.

use chrono::{DateTime, Duration, Utc};

use super::pending::{PendingTransferSet, pending_key};
use super::types::{HistoryRecord, SubmissionInfo};

/// Default staleness window: pending records older than this are evicted
pub const DEFAULT_STALE_AFTER_SECS: i64 = 4 * 60 * 60;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Remaining pending records first, then the server page
    pub merged: Vec<HistoryRecord>,
    /// Pending records that matched a server record or went stale
    pub to_remove: Vec<HistoryRecord>,
}

impl Reconciliation {
    /// Keys to drop from the pending set
    pub fn removal_keys(&self) -> Vec<String> {
        self.to_remove.iter().map(pending_key).collect()
    }
}

fn hash_eq(a: &str, b: &str) -> bool {
    !a.is_empty() && a.eq_ignore_ascii_case(b)
}

/// Whether a pending record and a server record are the same transfer
pub fn records_match(pending: &HistoryRecord, server: &HistoryRecord) -> bool {
    if pending.has_id() && server.has_id() && pending.id.eq_ignore_ascii_case(&server.id) {
        return true;
    }

    match (&pending.source.submission, &server.source.submission) {
        (SubmissionInfo::Evm { tx_hash: a, .. }, SubmissionInfo::Evm { tx_hash: b, .. })
            if pending.route.is_to_polkadot() && server.route.is_to_polkadot() =>
        {
            hash_eq(a, b)
        }
        // L1 and L2 destinations share the extrinsic shape
        (
            SubmissionInfo::Substrate {
                extrinsic_hash: a, ..
            },
            SubmissionInfo::Substrate {
                extrinsic_hash: b, ..
            },
        ) if pending.route.is_to_ethereum() && server.route.is_to_ethereum() => hash_eq(a, b),
        _ => false,
    }
}

pub fn is_stale(record: &HistoryRecord, now: DateTime<Utc>, stale_after: Duration) -> bool {
    now - record.submitted_at > stale_after
}

pub fn reconcile(
    pending: &PendingTransferSet,
    server: &[HistoryRecord],
    now: DateTime<Utc>,
    stale_after: Duration,
) -> Reconciliation {
    let mut merged = Vec::with_capacity(pending.len() + server.len());
    let mut to_remove = Vec::new();

    for record in pending.transfers() {
        let matched = server.iter().any(|s| records_match(record, s));
        if matched || is_stale(record, now, stale_after) {
            to_remove.push(record.clone());
        } else {
            merged.push(record.clone());
        }
    }
    merged.extend(server.iter().cloned());

    Reconciliation { merged, to_remove }
}
