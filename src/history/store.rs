//! Bridge Application State
//!
//! Holds the pending set and the merged activity list. Every update replaces
//! the whole value and notifies subscribers through `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

use super::error::HistoryError;
use super::pending::{PendingStore, PendingTransferSet};
use super::reconcile::Reconciliation;
use super::types::HistoryRecord;

/// What the activity list shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryView {
    pub records: Vec<HistoryRecord>,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Set when the last refresh fell back to pending-only data
    pub feed_error: Option<String>,
}

pub struct BridgeStore {
    pending: watch::Sender<PendingTransferSet>,
    history: watch::Sender<HistoryView>,
    persistence: Arc<dyn PendingStore>,
    /// Serialises snapshot-and-save so the newest snapshot is written last
    save_lock: Mutex<()>,
}

impl BridgeStore {
    pub fn new(persistence: Arc<dyn PendingStore>) -> Self {
        Self::with_pending(persistence, PendingTransferSet::new())
    }

    fn with_pending(persistence: Arc<dyn PendingStore>, set: PendingTransferSet) -> Self {
        let (pending, _) = watch::channel(set);
        let (history, _) = watch::channel(HistoryView::default());
        Self {
            pending,
            history,
            persistence,
            save_lock: Mutex::new(()),
        }
    }

    /// Restore the pending set saved by an earlier run
    pub async fn load(persistence: Arc<dyn PendingStore>) -> Result<Self, HistoryError> {
        let set = persistence.load().await?;
        Ok(Self::with_pending(persistence, set))
    }

    pub fn pending(&self) -> PendingTransferSet {
        self.pending.borrow().clone()
    }

    pub fn history(&self) -> HistoryView {
        self.history.borrow().clone()
    }

    pub fn subscribe_pending(&self) -> watch::Receiver<PendingTransferSet> {
        self.pending.subscribe()
    }

    pub fn subscribe_history(&self) -> watch::Receiver<HistoryView> {
        self.history.subscribe()
    }

    /// Add a freshly submitted transfer and persist the set
    pub async fn record_pending(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        info!(id = %record.id, route = %record.route, "Recording pending transfer");
        self.pending.send_modify(|set| set.add(record));
        self.persist().await
    }

    /// Apply a reconciliation computed from an earlier snapshot
    ///
    /// Removals go by key against the current set, so a transfer recorded
    /// while the feed was being fetched survives.
    pub async fn apply(
        &self,
        reconciliation: Reconciliation,
        refreshed_at: DateTime<Utc>,
        feed_error: Option<String>,
    ) -> Result<(), HistoryError> {
        let keys = reconciliation.removal_keys();
        let mut removed = 0;
        if !keys.is_empty() {
            self.pending.send_modify(|set| removed = set.remove_keys(&keys));
        }

        // Records added since the snapshot was taken go in front
        let current = self.pending();
        let mut records: Vec<HistoryRecord> = current
            .transfers()
            .iter()
            .filter(|r| !reconciliation.merged.contains(r))
            .cloned()
            .collect();
        records.extend(reconciliation.merged);

        debug!(removed = removed, records = records.len(), "History view updated");
        self.history.send_replace(HistoryView {
            records,
            refreshed_at: Some(refreshed_at),
            feed_error,
        });

        if removed > 0 {
            self.persist().await?;
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), HistoryError> {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.pending();
        self.persistence.save(&snapshot).await
    }
}
