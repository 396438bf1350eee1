//! Transfer Error Types
//!
//! Fatal and recoverable failures of the orchestration core.

use thiserror::Error;

use super::steps::StepKind;
use super::types::{NetworkFamily, NetworkKind};

/// Error raised by any external collaborator (SDK, wallet, step action)
///
/// The core treats every variant the same way; the split only helps logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Rejected by user: {0}")]
    Rejected(String),

    #[error("Node unreachable: {0}")]
    Unreachable(String),

    #[error("Node error: {0}")]
    Node(String),

    #[error("{0}")]
    Other(String),
}

/// Orchestration core errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    // === Fatal ===
    #[error("Unsupported route: {from} -> {to}")]
    UnsupportedRoute {
        from: NetworkKind,
        to: NetworkKind,
    },

    #[error("Plan build failed: {0}")]
    PlanBuildFailed(String),

    #[error("Transfer is blocked: {}", .0.join("; "))]
    PlanNotActionable(Vec<String>),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("No signer registered for {0} wallets")]
    MissingSigner(NetworkFamily),

    // === Recoverable ===
    #[error("Step {index} ({kind}) failed: {message}")]
    StepFailed {
        index: usize,
        kind: StepKind,
        message: String,
    },

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("Invalid state transition: {0}")]
    InvalidState(String),
}

impl BridgeError {
    /// Stable error code for UI and logs
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::UnsupportedRoute { .. } => "UNSUPPORTED_ROUTE",
            BridgeError::PlanBuildFailed(_) => "PLAN_BUILD_FAILED",
            BridgeError::PlanNotActionable(_) => "PLAN_NOT_ACTIONABLE",
            BridgeError::SubmissionFailed(_) => "SUBMISSION_FAILED",
            BridgeError::MissingSigner(_) => "MISSING_SIGNER",
            BridgeError::StepFailed { .. } => "STEP_FAILED",
            BridgeError::Cancelled => "CANCELLED",
            BridgeError::InvalidState(_) => "INVALID_STATE",
        }
    }

    /// Fatal errors send the user back to the request form with a fresh plan
    pub fn is_fatal(&self) -> bool {
        match self {
            BridgeError::UnsupportedRoute { .. }
            | BridgeError::PlanBuildFailed(_)
            | BridgeError::PlanNotActionable(_)
            | BridgeError::SubmissionFailed(_)
            | BridgeError::MissingSigner(_) => true,
            BridgeError::StepFailed { .. }
            | BridgeError::Cancelled
            | BridgeError::InvalidState(_) => false,
        }
    }

    /// Human-readable messages to list in the blocking dialog
    pub fn messages(&self) -> Vec<String> {
        match self {
            BridgeError::PlanNotActionable(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
