//! Step Execution State Definitions

use std::fmt;

/// Step engine states
///
/// Terminal states: SUBMITTED, FAILED, CANCELLED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Waiting for the user to start step `i`
    Idle(usize),

    /// Step `i` action dispatched, awaiting the collaborator
    Busy(usize),

    /// Step `i` failed; retry in place or cancel
    StepFailed(usize),

    /// Every step done, ready for the final signed submission
    AllStepsDone,

    /// Terminal: final submission accepted and recorded
    Submitted,

    /// Terminal: fatal error (submission failed or plan no longer actionable)
    Failed,

    /// Terminal: user went back to the form, plan discarded
    Cancelled,
}

impl EngineState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineState::Submitted | EngineState::Failed | EngineState::Cancelled
        )
    }

    /// Index of the step this state refers to
    #[inline]
    pub fn step_index(&self) -> Option<usize> {
        match self {
            EngineState::Idle(i) | EngineState::Busy(i) | EngineState::StepFailed(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineState::Idle(_) => "IDLE",
            EngineState::Busy(_) => "BUSY",
            EngineState::StepFailed(_) => "STEP_FAILED",
            EngineState::AllStepsDone => "ALL_STEPS_DONE",
            EngineState::Submitted => "SUBMITTED",
            EngineState::Failed => "FAILED",
            EngineState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step_index() {
            Some(i) => write!(f, "{}({})", self.as_str(), i),
            None => write!(f, "{}", self.as_str()),
        }
    }
}

/// Per-step status shown next to each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepStatus {
    #[default]
    Idle,
    Busy,
    Success,
    Error,
}

/// Snapshot handed to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepExecutionState {
    pub current_step_index: usize,
    pub per_step_status: Vec<StepStatus>,
    pub terminal: bool,
}
