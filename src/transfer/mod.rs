//! Bridge Transfer Orchestration
//!
//! Turns a transfer request into a validated plan, walks the user through
//! the prerequisite steps the plan needs, and submits it.
//!
//! # Flow
//!
//! ```text
//! TransferRequest ─▶ classify ─▶ PlanBuilder ─▶ derive_steps ─▶ StepExecutionEngine ─▶ HistoryRecord
//!                       │             │               │
//!               UnsupportedRoute  PlanBuildFailed  PlanNotActionable
//! ```
//!
//! # Invariants
//!
//! 1. **Latest build wins**: every plan build carries a ticket; a build that
//!    resolves after a newer one was issued is discarded
//! 2. **Unknown reasons block**: an SDK error code with no remediation step
//!    makes the plan non-actionable instead of being ignored
//! 3. **Steps are idempotent**: a failed step is retried in place, never skipped
//! 4. **Submissions are recorded**: once the signer accepts the transfer a
//!    history record is produced, whatever else fails afterwards

pub mod actions;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod plan;
pub mod reason;
pub mod recorder;
pub mod route;
pub mod sdk;
pub mod signer;
pub mod state;
pub mod steps;
pub mod tokens;
pub mod types;

#[cfg(test)]
mod integration_tests;

pub use actions::StepActions;
pub use coordinator::{PlanBuild, PreparedTransfer, TransferCoordinator};
pub use engine::{EngineCollaborators, StepExecutionEngine};
pub use error::{BridgeError, CollaboratorError};
pub use plan::{PlanBuilder, select_delivery};
pub use reason::{ToEthereumReason, ToPolkadotReason, ValidationReason};
pub use recorder::to_history_record;
pub use route::{TransferRoute, classify};
pub use sdk::{BridgeSdk, SdkLogEntry, SdkValidation};
pub use signer::{SendResult, SignerSet, SubmissionReceipt, TransferSigner};
pub use state::{EngineState, StepExecutionState, StepStatus};
pub use steps::{RemediationStep, StepContext, StepDerivation, StepKind, derive_steps};
pub use tokens::{CancelToken, PlanRequestTracker, PlanTicket};
pub use types::{
    DeliveryMechanism, FeeQuote, Location, NetworkFamily, NetworkKind, Severity, Token,
    TransferPlan, TransferRequest, UnsignedTransfer, ValidationLogEntry,
};
