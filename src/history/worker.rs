//! History Poller
//!
//! Background worker that refreshes the activity list and prunes the pending
//! set on a fixed interval, or immediately on request.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use super::error::HistoryError;
use super::feed::{HistoryFeed, HistoryFilter};
use super::reconcile::{DEFAULT_STALE_AFTER_SECS, reconcile};
use super::store::BridgeStore;
use super::types::HistoryRecord;

/// Configuration for the history poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// How often to refresh
    pub poll_interval: Duration,
    /// Pending records older than this are dropped
    pub stale_after: Duration,
    pub page_size: u32,
    /// Upper bound on pages fetched per refresh
    pub max_pages: u32,
    /// Accounts whose history is shown
    pub accounts: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            stale_after: Duration::from_secs(DEFAULT_STALE_AFTER_SECS as u64),
            page_size: 100,
            max_pages: 5,
            accounts: Vec::new(),
        }
    }
}

/// Outcome of one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub server_records: usize,
    pub removed: usize,
    pub feed_available: bool,
}

pub struct HistoryPoller {
    feed: Arc<dyn HistoryFeed>,
    store: Arc<BridgeStore>,
    config: PollerConfig,
    wake: Notify,
}

impl HistoryPoller {
    pub fn new(feed: Arc<dyn HistoryFeed>, store: Arc<BridgeStore>, config: PollerConfig) -> Self {
        Self {
            feed,
            store,
            config,
            wake: Notify::new(),
        }
    }

    /// Manual refresh: wake the loop without waiting for the interval
    pub fn request_refresh(&self) {
        self.wake.notify_one();
    }

    /// Run the polling loop forever
    pub async fn run(&self) -> ! {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            stale_after_secs = self.config.stale_after.as_secs(),
            "Starting history poller"
        );

        loop {
            if let Err(e) = self.refresh_once().await {
                error!(error = %e, "History refresh failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = self.wake.notified() => debug!("Manual history refresh"),
            }
        }
    }

    /// Fetch, reconcile and publish once
    ///
    /// An unreachable feed is not an error: the view falls back to pending
    /// records and stale eviction still runs on the local clock. Only a
    /// failure to persist the pruned set is returned.
    pub async fn refresh_once(&self) -> Result<RefreshSummary, HistoryError> {
        let snapshot = self.store.pending();
        let now = Utc::now();

        let (server, feed_error) = match self.fetch_all().await {
            Ok(records) => (records, None),
            Err(e) => {
                warn!(error = %e, "History feed unavailable, showing pending transfers only");
                (Vec::new(), Some(e.to_string()))
            }
        };

        let stale_after = chrono::Duration::from_std(self.config.stale_after)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_STALE_AFTER_SECS));
        let reconciliation = reconcile(&snapshot, &server, now, stale_after);

        let summary = RefreshSummary {
            server_records: server.len(),
            removed: reconciliation.to_remove.len(),
            feed_available: feed_error.is_none(),
        };
        for record in &reconciliation.to_remove {
            debug!(id = %record.id, hash = %record.source.submission.hash(), "Dropping pending transfer");
        }

        self.store.apply(reconciliation, now, feed_error).await?;

        if summary.removed > 0 {
            info!(
                removed = summary.removed,
                server_records = summary.server_records,
                "Pending transfers reconciled"
            );
        }
        Ok(summary)
    }

    async fn fetch_all(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let mut filter = HistoryFilter::new(self.config.accounts.clone(), self.config.page_size);
        let mut records = Vec::new();

        for _ in 0..self.config.max_pages {
            let page = self.feed.fetch_page(&filter).await?;
            let last = page.len() < filter.page_size as usize;
            records.extend(page);
            if last {
                break;
            }
            filter = filter.next_page();
        }

        Ok(records)
    }
}
