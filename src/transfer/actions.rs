//! Remediation Step Actions
//!
//! The engine hands each step to a collaborator that knows how to perform it
//! on-chain (ERC-20 approve, WETH deposit, balance top-ups).

use async_trait::async_trait;

use super::error::CollaboratorError;
use super::steps::StepKind;
use super::types::{TransferPlan, TransferRequest};

/// Performs remediation steps
///
/// Actions must be safe to repeat: a retry after a failure, or after the
/// effect already landed, has to leave the chain in the same state.
#[async_trait]
pub trait StepActions: Send + Sync {
    async fn perform(
        &self,
        kind: StepKind,
        request: &TransferRequest,
        plan: &TransferPlan,
    ) -> Result<(), CollaboratorError>;
}

/// Mock step actions for testing
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    pub struct MockStepActions {
        performed: Mutex<Vec<StepKind>>,
        /// Remaining scripted failures per kind
        failures: Mutex<HashMap<StepKind, usize>>,
        delay: Mutex<Option<Duration>>,
    }

    impl MockStepActions {
        pub fn new() -> Self {
            Self {
                performed: Mutex::new(Vec::new()),
                failures: Mutex::new(HashMap::new()),
                delay: Mutex::new(None),
            }
        }

        /// Fail the next `times` invocations of `kind`
        pub fn fail_times(&self, kind: StepKind, times: usize) {
            self.failures.lock().unwrap().insert(kind, times);
        }

        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        pub fn performed(&self) -> Vec<StepKind> {
            self.performed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StepActions for MockStepActions {
        async fn perform(
            &self,
            kind: StepKind,
            _request: &TransferRequest,
            _plan: &TransferPlan,
        ) -> Result<(), CollaboratorError> {
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.performed.lock().unwrap().push(kind);

            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&kind)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(CollaboratorError::Rejected(format!("{kind} rejected")));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
pub use mock::MockStepActions;
