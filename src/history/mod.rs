//! Transfer History
//!
//! Keeps the activity list in sync with the bridge indexer.
//!
//! # Architecture
//!
//! Transfers submitted from this client are recorded as *pending* right away,
//! before the indexer has seen them. On every refresh the poller fetches the
//! indexer's history, reconciles it with the pending set and publishes the
//! merged view:
//!
//! ```text
//! submit ──▶ BridgeStore.pending ──┐
//!                                  ├─▶ reconcile ──▶ BridgeStore.history
//! HistoryFeed.fetch_page ──────────┘        │
//!                                           └─▶ drop matched / stale pending
//! ```
//!
//! A pending record leaves the set once the indexer reports the same
//! transfer (by message id, or by source transaction/extrinsic hash) or once
//! it is older than the staleness window.

pub mod error;
pub mod feed;
pub mod pending;
pub mod reconcile;
pub mod store;
pub mod types;
pub mod worker;

pub use error::HistoryError;
pub use feed::{HistoryFeed, HistoryFilter, HttpHistoryFeed};
pub use pending::{JsonFilePendingStore, MemoryPendingStore, PendingStore, PendingTransferSet};
pub use reconcile::{Reconciliation, reconcile, records_match};
pub use store::{BridgeStore, HistoryView};
pub use types::{DestinationInfo, HistoryRecord, SourceInfo, SubmissionInfo, TransferStatus};
pub use worker::{HistoryPoller, PollerConfig, RefreshSummary};
