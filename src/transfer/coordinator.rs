//! Transfer Coordinator
//!
//! Entry point of the orchestration core. Classifies a request, builds and
//! validates a plan, hands out step engines and records the final submission
//! into the pending set.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::actions::StepActions;
use super::engine::{EngineCollaborators, StepExecutionEngine};
use super::error::BridgeError;
use super::plan::PlanBuilder;
use super::route::{TransferRoute, classify_locations};
use super::sdk::BridgeSdk;
use super::signer::SignerSet;
use super::steps::{StepContext, StepDerivation, derive_steps};
use super::tokens::{PlanRequestTracker, PlanTicket};
use super::types::{TransferPlan, TransferRequest};
use crate::history::store::BridgeStore;
use crate::history::types::HistoryRecord;

/// A validated plan together with the steps it needs
#[derive(Debug, Clone)]
pub struct PreparedTransfer {
    pub ticket: PlanTicket,
    pub request: TransferRequest,
    pub route: TransferRoute,
    pub plan: TransferPlan,
    pub derivation: StepDerivation,
}

impl PreparedTransfer {
    /// Ready to submit without any remediation
    pub fn is_ready(&self) -> bool {
        self.plan.success && self.derivation.steps.is_empty()
    }
}

/// Outcome of a plan build
#[derive(Debug, Clone)]
pub enum PlanBuild {
    Current(Box<PreparedTransfer>),
    /// A newer build was started while this one was in flight
    Superseded { ticket: PlanTicket, latest: PlanTicket },
}

impl PlanBuild {
    pub fn into_current(self) -> Option<PreparedTransfer> {
        match self {
            PlanBuild::Current(prepared) => Some(*prepared),
            PlanBuild::Superseded { .. } => None,
        }
    }
}

/// Transfer Coordinator
pub struct TransferCoordinator {
    builder: Arc<PlanBuilder>,
    tracker: PlanRequestTracker,
    actions: Arc<dyn StepActions>,
    signers: SignerSet,
    store: Arc<BridgeStore>,
    wrapped_native_symbol: String,
}

impl TransferCoordinator {
    pub fn new(
        sdk: Arc<dyn BridgeSdk>,
        actions: Arc<dyn StepActions>,
        signers: SignerSet,
        store: Arc<BridgeStore>,
        wrapped_native_symbol: impl Into<String>,
    ) -> Self {
        Self {
            builder: Arc::new(PlanBuilder::new(sdk)),
            tracker: PlanRequestTracker::new(),
            actions,
            signers,
            store,
            wrapped_native_symbol: wrapped_native_symbol.into(),
        }
    }

    pub fn store(&self) -> &Arc<BridgeStore> {
        &self.store
    }

    /// Build and validate a plan for the request
    ///
    /// Every call supersedes the previous one. A build that resolves after a
    /// newer call was issued comes back as `PlanBuild::Superseded` and must
    /// not be shown. Unsupported routes fail before the SDK is touched.
    pub async fn prepare(&self, request: TransferRequest) -> Result<PlanBuild, BridgeError> {
        let ticket = self.tracker.issue();

        let route = classify_locations(&request.source, &request.destination)?;
        debug!(ticket = %ticket, route = %route, "Preparing transfer");

        let result = self.builder.build(route, &request).await;

        if !self.tracker.is_current(ticket) {
            let latest = self.tracker.latest();
            debug!(ticket = %ticket, latest = %latest, "Discarding superseded plan build");
            return Ok(PlanBuild::Superseded { ticket, latest });
        }

        let plan = result?;
        let context = StepContext::from_request(&request, &self.wrapped_native_symbol);
        let derivation = derive_steps(route, &plan.logs, &context);

        if !derivation.is_actionable() {
            warn!(
                ticket = %ticket,
                route = %route,
                errors = derivation.errors.len(),
                "Plan has blocking errors"
            );
        }

        info!(
            ticket = %ticket,
            route = %route,
            success = plan.success,
            steps = derivation.steps.len(),
            "Plan prepared"
        );

        Ok(PlanBuild::Current(Box::new(PreparedTransfer {
            ticket,
            request,
            route,
            plan,
            derivation,
        })))
    }

    /// Drop any in-flight build, e.g. when the form is cleared
    pub fn invalidate(&self) {
        self.tracker.invalidate();
    }

    /// Create the step engine for a prepared transfer
    pub fn start(&self, prepared: PreparedTransfer) -> Result<StepExecutionEngine, BridgeError> {
        if !self.tracker.is_current(prepared.ticket) {
            return Err(BridgeError::InvalidState(format!(
                "plan {} was superseded by {}",
                prepared.ticket,
                self.tracker.latest()
            )));
        }

        let context = StepContext::from_request(&prepared.request, &self.wrapped_native_symbol);
        StepExecutionEngine::new(
            prepared.request,
            prepared.plan,
            prepared.derivation,
            context,
            EngineCollaborators {
                builder: self.builder.clone(),
                actions: self.actions.clone(),
                signers: self.signers.clone(),
            },
        )
    }

    /// Submit through the engine and add the record to the pending set
    ///
    /// The transfer is on-chain once the engine returns a record, so a
    /// persistence failure is logged and the record is still returned.
    pub async fn submit(
        &self,
        engine: &mut StepExecutionEngine,
    ) -> Result<HistoryRecord, BridgeError> {
        let record = engine.submit().await?;

        if let Err(e) = self.store.record_pending(record.clone()).await {
            error!(id = %record.id, error = %e, "Failed to persist pending transfer");
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::pending::MemoryPendingStore;
    use crate::transfer::actions::MockStepActions;
    use crate::transfer::sdk::{MockSdk, SdkLogEntry};
    use crate::transfer::signer::MockSigner;
    use crate::transfer::state::EngineState;
    use crate::transfer::types::{FeeQuote, Location, NetworkFamily, NetworkKind, Token};

    fn setup() -> (TransferCoordinator, Arc<MockSdk>, Arc<BridgeStore>) {
        let sdk = Arc::new(MockSdk::new());
        let store = Arc::new(BridgeStore::new(Arc::new(MemoryPendingStore::new())));
        let signers = SignerSet::new()
            .with(Arc::new(MockSigner::new(NetworkFamily::Evm)))
            .with(Arc::new(MockSigner::new(NetworkFamily::Substrate)));
        let coordinator = TransferCoordinator::new(
            sdk.clone(),
            Arc::new(MockStepActions::new()),
            signers,
            store.clone(),
            "WETH",
        );
        (coordinator, sdk, store)
    }

    fn request(source: Location, destination: Location) -> TransferRequest {
        TransferRequest {
            source,
            destination,
            token: Token {
                id: "0xtoken".to_string(),
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            amount: 25_000_000,
            source_account: "0xsender".to_string(),
            beneficiary: "5Beneficiary".to_string(),
            fee: FeeQuote::default(),
        }
    }

    fn eth_to_hub() -> TransferRequest {
        request(
            Location::new("ethereum", NetworkKind::Ethereum, 1),
            Location::new("assethub", NetworkKind::Substrate, 1000).asset_hub(),
        )
    }

    #[tokio::test]
    async fn test_ready_plan_submits_and_records() {
        let (coordinator, _sdk, store) = setup();

        let prepared = coordinator
            .prepare(eth_to_hub())
            .await
            .unwrap()
            .into_current()
            .unwrap();
        assert!(prepared.is_ready());
        assert_eq!(prepared.route, TransferRoute::EvmToSubstrate);

        let mut engine = coordinator.start(prepared).unwrap();
        assert_eq!(engine.state(), EngineState::AllStepsDone);

        let record = coordinator.submit(&mut engine).await.unwrap();
        let pending = store.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.transfers()[0].id, record.id);
    }

    #[tokio::test]
    async fn test_unsupported_route_never_reaches_sdk() {
        let (coordinator, sdk, _store) = setup();
        let req = request(
            Location::new("base", NetworkKind::EthereumL2, 8453),
            Location::new("arbitrum", NetworkKind::EthereumL2, 42161),
        );

        let err = coordinator.prepare(req).await.unwrap_err();
        assert_eq!(
            err,
            BridgeError::UnsupportedRoute {
                from: NetworkKind::EthereumL2,
                to: NetworkKind::EthereumL2,
            }
        );
        assert_eq!(sdk.create_count(), 0);
    }

    #[tokio::test]
    async fn test_blocked_plan_cannot_start() {
        let (coordinator, sdk, _store) = setup();
        sdk.push_logs(vec![
            SdkLogEntry::error("GatewaySpenderLimitReached", "approve first"),
            SdkLogEntry::error("MaxConsumersReached", "too many consumers"),
        ]);

        let prepared = coordinator
            .prepare(eth_to_hub())
            .await
            .unwrap()
            .into_current()
            .unwrap();
        assert!(!prepared.derivation.is_actionable());

        match coordinator.start(prepared) {
            Err(BridgeError::PlanNotActionable(messages)) => {
                assert_eq!(messages, vec!["too many consumers".to_string()]);
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("blocked plan must not start"),
        }
    }

    #[tokio::test]
    async fn test_sdk_outage_is_fatal() {
        let (coordinator, sdk, _store) = setup();
        sdk.set_unreachable(true);

        let err = coordinator.prepare(eth_to_hub()).await.unwrap_err();
        assert!(matches!(err, BridgeError::PlanBuildFailed(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_stale_prepared_transfer_cannot_start() {
        let (coordinator, _sdk, _store) = setup();

        let first = coordinator
            .prepare(eth_to_hub())
            .await
            .unwrap()
            .into_current()
            .unwrap();
        coordinator.invalidate();

        assert!(matches!(
            coordinator.start(first),
            Err(BridgeError::InvalidState(_))
        ));
    }
}
