//! Step Execution Engine
//!
//! Single-flight state machine that walks the remediation steps and then
//! performs the final signed submission.
//!
//! # State Machine
//!
//! ```text
//! Idle(i) → Busy(i) → Idle(i+1) ... → AllStepsDone → Submitted
//!              ↓                            ↓
//!        StepFailed(i) ──retry──▶ Busy(i)  Failed
//!              ↓
//!          Cancelled
//! ```
//!
//! After every successful step the plan is rebuilt and the remaining steps
//! re-derived, so a step whose effect already holds is skipped instead of
//! being run again. On-chain effects are never rolled back; cancelling only
//! drops the in-memory plan.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::actions::StepActions;
use super::error::BridgeError;
use super::plan::PlanBuilder;
use super::recorder::to_history_record;
use super::route::TransferRoute;
use super::signer::{SendResult, SignerSet};
use super::state::{EngineState, StepExecutionState, StepStatus};
use super::steps::{RemediationStep, StepContext, StepDerivation, derive_steps};
use super::tokens::CancelToken;
use super::types::{TransferPlan, TransferRequest};
use crate::history::types::HistoryRecord;

/// Everything the engine calls out to
#[derive(Clone)]
pub struct EngineCollaborators {
    pub builder: Arc<PlanBuilder>,
    pub actions: Arc<dyn StepActions>,
    pub signers: SignerSet,
}

pub struct StepExecutionEngine {
    route: TransferRoute,
    request: TransferRequest,
    context: StepContext,
    /// None once cancelled
    plan: Option<TransferPlan>,
    steps: Vec<RemediationStep>,
    statuses: Vec<StepStatus>,
    state: EngineState,
    last_error: Option<BridgeError>,
    cancel: CancelToken,
    deps: EngineCollaborators,
}

impl StepExecutionEngine {
    /// Start an engine over a derived plan
    ///
    /// Refuses plans with unmapped errors: those cannot succeed whatever the
    /// user does.
    pub fn new(
        request: TransferRequest,
        plan: TransferPlan,
        derivation: StepDerivation,
        context: StepContext,
        deps: EngineCollaborators,
    ) -> Result<Self, BridgeError> {
        if !derivation.is_actionable() {
            return Err(BridgeError::PlanNotActionable(derivation.error_messages()));
        }

        let steps = derivation.steps;
        let state = if steps.is_empty() {
            EngineState::AllStepsDone
        } else {
            EngineState::Idle(0)
        };

        debug!(route = %plan.route, steps = steps.len(), state = %state, "Step engine created");

        Ok(Self {
            route: plan.route,
            request,
            context,
            statuses: vec![StepStatus::Idle; steps.len()],
            steps,
            plan: Some(plan),
            state,
            last_error: None,
            cancel: CancelToken::new(),
            deps,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn route(&self) -> TransferRoute {
        self.route
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    pub fn steps(&self) -> &[RemediationStep] {
        &self.steps
    }

    pub fn plan(&self) -> Option<&TransferPlan> {
        self.plan.as_ref()
    }

    pub fn last_error(&self) -> Option<&BridgeError> {
        self.last_error.as_ref()
    }

    pub fn current_step(&self) -> Option<&RemediationStep> {
        self.state.step_index().and_then(|i| self.steps.get(i))
    }

    /// Handle for cancelling from another task while a step is in flight
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn snapshot(&self) -> StepExecutionState {
        let current_step_index = match self.state {
            EngineState::Idle(i) | EngineState::Busy(i) | EngineState::StepFailed(i) => i,
            _ => self.steps.len(),
        };

        StepExecutionState {
            current_step_index,
            per_step_status: self.statuses.clone(),
            terminal: self.state.is_terminal() || self.state == EngineState::AllStepsDone,
        }
    }

    /// Run the current step, or retry it after a failure
    ///
    /// Returns the new state. A failing action leaves the engine in
    /// `StepFailed(i)` and returns `BridgeError::StepFailed`.
    pub async fn run_step(&mut self) -> Result<EngineState, BridgeError> {
        let index = match self.state {
            EngineState::Idle(i) | EngineState::StepFailed(i) => i,
            other => {
                return Err(BridgeError::InvalidState(format!(
                    "cannot run a step from {other}"
                )));
            }
        };

        if self.cancel.is_cancelled() {
            self.enter_cancelled();
            return Err(BridgeError::Cancelled);
        }

        let Some(plan) = self.plan.as_ref() else {
            return Err(BridgeError::InvalidState("no active plan".into()));
        };
        let kind = self.steps[index].kind;
        let actions = self.deps.actions.clone();

        self.state = EngineState::Busy(index);
        self.statuses[index] = StepStatus::Busy;
        info!(route = %self.route, index = index, kind = %kind, "Running remediation step");

        let result = actions.perform(kind, &self.request, plan).await;

        if self.cancel.is_cancelled() {
            warn!(index = index, kind = %kind, "Cancelled while step was in flight, discarding result");
            self.enter_cancelled();
            return Err(BridgeError::Cancelled);
        }

        if let Err(e) = result {
            warn!(index = index, kind = %kind, error = %e, "Remediation step failed");
            return Err(self.fail_step(index, e.to_string()));
        }
        self.statuses[index] = StepStatus::Success;

        // On-chain state changed: rebuild and re-derive the remaining steps
        let refreshed = self.deps.builder.build(self.route, &self.request).await;

        if self.cancel.is_cancelled() {
            self.enter_cancelled();
            return Err(BridgeError::Cancelled);
        }

        let plan = match refreshed {
            Ok(plan) => plan,
            Err(e) => {
                warn!(index = index, error = %e, "Plan refresh after step failed");
                return Err(self.fail_step(index, e.to_string()));
            }
        };

        let derivation = derive_steps(self.route, &plan.logs, &self.context);
        self.plan = Some(plan);

        if !derivation.is_actionable() {
            let err = BridgeError::PlanNotActionable(derivation.error_messages());
            error!(route = %self.route, error = %err, "Refreshed plan is blocked");
            self.state = EngineState::Failed;
            self.last_error = Some(err.clone());
            return Err(err);
        }

        let skipped = self.steps.len() - (index + 1);
        self.steps.truncate(index + 1);
        self.statuses.truncate(index + 1);
        self.statuses
            .extend(std::iter::repeat_n(StepStatus::Idle, derivation.steps.len()));
        self.steps.extend(derivation.steps);
        debug!(
            previous_remaining = skipped,
            remaining = self.steps.len() - (index + 1),
            "Remaining steps re-derived"
        );

        self.last_error = None;
        self.state = if index + 1 < self.steps.len() {
            EngineState::Idle(index + 1)
        } else {
            EngineState::AllStepsDone
        };

        Ok(self.state)
    }

    /// Sign and submit the transfer once every step is done
    ///
    /// No automatic retry on failure: the engine moves to `Failed` and the
    /// caller must rebuild from the request form.
    pub async fn submit(&mut self) -> Result<HistoryRecord, BridgeError> {
        if self.state != EngineState::AllStepsDone {
            return Err(BridgeError::InvalidState(format!(
                "cannot submit from {}",
                self.state
            )));
        }
        if self.cancel.is_cancelled() {
            self.enter_cancelled();
            return Err(BridgeError::Cancelled);
        }

        let Some(plan) = self.plan.as_ref() else {
            return Err(BridgeError::InvalidState("no active plan".into()));
        };

        let signer = match self.deps.signers.get(self.route.source_family()) {
            Ok(signer) => signer,
            Err(e) => return Err(self.fail(e)),
        };

        info!(route = %self.route, account = %self.request.source_account, "Submitting transfer");

        let receipt = match signer
            .sign_and_submit(&plan.unsigned, &self.request.source_account)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(BridgeError::SubmissionFailed(e.to_string()))),
        };

        // The transfer is on-chain from here on; everything below is best effort
        let message_id = match signer.get_message_id(&receipt).await {
            Ok(id) => id,
            Err(e) => {
                warn!(route = %self.route, error = %e, "Could not resolve message id");
                None
            }
        };

        if self.cancel.is_cancelled() {
            warn!(route = %self.route, "Cancel requested after submission was sent, recording anyway");
        }

        let result = SendResult::from_receipt(receipt, message_id);
        let record = to_history_record(self.route, &self.request, &result);

        info!(route = %self.route, id = %record.id, "Transfer submitted");
        self.state = EngineState::Submitted;
        self.last_error = None;
        Ok(record)
    }

    /// Return to the request form, discarding the plan
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if !self.state.is_terminal() {
            self.enter_cancelled();
        }
    }

    fn enter_cancelled(&mut self) {
        info!(route = %self.route, state = %self.state, "Step engine cancelled");
        if let Some(i) = self.state.step_index()
            && self.statuses.get(i) == Some(&StepStatus::Busy)
        {
            self.statuses[i] = StepStatus::Idle;
        }
        self.state = EngineState::Cancelled;
        self.plan = None;
    }

    fn fail_step(&mut self, index: usize, message: String) -> BridgeError {
        let err = BridgeError::StepFailed {
            index,
            kind: self.steps[index].kind,
            message,
        };
        self.statuses[index] = StepStatus::Error;
        self.state = EngineState::StepFailed(index);
        self.last_error = Some(err.clone());
        err
    }

    fn fail(&mut self, err: BridgeError) -> BridgeError {
        error!(route = %self.route, error = %err, "Transfer failed");
        self.state = EngineState::Failed;
        self.last_error = Some(err.clone());
        err
    }
}
