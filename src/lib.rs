//! Bridge Transfer Core
//!
//! Orchestration core of an Ethereum <-> Polkadot bridge client.
//!
//! # Modules
//!
//! - [`transfer`] - Route classification, plan building, remediation steps,
//!   step execution and submission
//! - [`history`] - History records, pending-transfer persistence and
//!   reconciliation with the bridge indexer
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod history;
pub mod logging;
pub mod transfer;

// Convenient re-exports at crate root
pub use config::{AppConfig, ConfigError};
pub use history::{
    BridgeStore, HistoryError, HistoryFeed, HistoryPoller, HistoryRecord, PendingStore,
    PendingTransferSet, reconcile,
};
pub use transfer::{
    BridgeError, StepExecutionEngine, TransferCoordinator, TransferRequest, TransferRoute,
    classify,
};
