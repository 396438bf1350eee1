//! Integration Tests for Transfer Orchestration
//!
//! End-to-end flows through the coordinator, engine and history poller with
//! every collaborator mocked.

use std::sync::Arc;
use std::time::Duration;

use crate::history::feed::MockHistoryFeed;
use crate::history::pending::MemoryPendingStore;
use crate::history::store::BridgeStore;
use crate::history::types::TransferStatus;
use crate::history::worker::{HistoryPoller, PollerConfig};
use crate::transfer::actions::MockStepActions;
use crate::transfer::coordinator::{PlanBuild, TransferCoordinator};
use crate::transfer::error::BridgeError;
use crate::transfer::route::TransferRoute;
use crate::transfer::sdk::{MockSdk, SdkLogEntry};
use crate::transfer::signer::{MockSigner, SignerSet};
use crate::transfer::state::{EngineState, StepStatus};
use crate::transfer::steps::StepKind;
use crate::transfer::types::{
    DeliveryMechanism, FeeQuote, Location, NetworkFamily, NetworkKind, Token, TransferRequest,
};

struct TestHarness {
    coordinator: TransferCoordinator,
    sdk: Arc<MockSdk>,
    actions: Arc<MockStepActions>,
    evm: Arc<MockSigner>,
    substrate: Arc<MockSigner>,
    feed: Arc<MockHistoryFeed>,
    poller: HistoryPoller,
    persistence: Arc<MemoryPendingStore>,
}

impl TestHarness {
    fn new() -> Self {
        let sdk = Arc::new(MockSdk::new());
        let actions = Arc::new(MockStepActions::new());
        let evm = Arc::new(MockSigner::new(NetworkFamily::Evm));
        let substrate = Arc::new(MockSigner::new(NetworkFamily::Substrate));
        let persistence = Arc::new(MemoryPendingStore::new());
        let store = Arc::new(BridgeStore::new(persistence.clone()));
        let feed = Arc::new(MockHistoryFeed::new());

        let coordinator = TransferCoordinator::new(
            sdk.clone(),
            actions.clone(),
            SignerSet::new().with(evm.clone()).with(substrate.clone()),
            store.clone(),
            "WETH",
        );
        let poller = HistoryPoller::new(feed.clone(), store, PollerConfig::default());

        Self {
            coordinator,
            sdk,
            actions,
            evm,
            substrate,
            feed,
            poller,
            persistence,
        }
    }
}

fn token(symbol: &str) -> Token {
    Token {
        id: format!("0x{}", symbol.to_lowercase()),
        symbol: symbol.to_string(),
        decimals: 18,
    }
}

fn request(source: Location, destination: Location, symbol: &str) -> TransferRequest {
    TransferRequest {
        source,
        destination,
        token: token(symbol),
        amount: 2_500_000_000_000_000_000,
        source_account: "0xsender".to_string(),
        beneficiary: "15Beneficiary".to_string(),
        fee: FeeQuote {
            asset: "ETH".to_string(),
            delivery: 1_000,
            execution: 500,
        },
    }
}

fn ethereum() -> Location {
    Location::new("ethereum", NetworkKind::Ethereum, 1)
}

fn asset_hub() -> Location {
    Location::new("assethub", NetworkKind::Substrate, 1000).asset_hub()
}

// ============================================================================
// Scenario A: Ethereum -> Asset Hub, allowance and existential deposit
// ============================================================================

#[tokio::test]
async fn test_scenario_a_allowance_and_existential_deposit() {
    let h = TestHarness::new();
    h.sdk.push_logs(vec![
        SdkLogEntry::error("GatewaySpenderLimitReached", "Spender allowance too low"),
        SdkLogEntry::error("AccountDoesNotExist", "Beneficiary account does not exist"),
    ]);
    // After the top-up only the allowance is missing
    h.sdk.push_logs(vec![SdkLogEntry::error(
        "GatewaySpenderLimitReached",
        "Spender allowance too low",
    )]);
    h.sdk.push_logs(vec![]);

    let prepared = h
        .coordinator
        .prepare(request(ethereum(), asset_hub(), "USDC"))
        .await
        .unwrap()
        .into_current()
        .unwrap();

    assert_eq!(prepared.route, TransferRoute::EvmToSubstrate);
    assert!(!prepared.plan.success);
    let kinds: Vec<_> = prepared.derivation.steps.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![StepKind::TopUpExistentialDeposit, StepKind::ApproveSpend]
    );

    let mut engine = h.coordinator.start(prepared).unwrap();
    assert_eq!(engine.run_step().await.unwrap(), EngineState::Idle(1));
    assert_eq!(engine.run_step().await.unwrap(), EngineState::AllStepsDone);
    assert!(engine.plan().unwrap().success);

    let record = h.coordinator.submit(&mut engine).await.unwrap();
    assert_eq!(engine.state(), EngineState::Submitted);
    assert_eq!(record.route, TransferRoute::EvmToSubstrate);
    assert_eq!(record.status, TransferStatus::Pending);
    assert_eq!(h.evm.submit_count(), 1);
    assert_eq!(h.substrate.submit_count(), 0);
    assert_eq!(
        h.actions.performed(),
        vec![StepKind::TopUpExistentialDeposit, StepKind::ApproveSpend]
    );
    assert_eq!(h.persistence.snapshot().len(), 1);

    // The indexer picks it up under its message id with a lowercased hash
    let mut indexed = record.clone();
    indexed.id = "0xindexed-message".to_string();
    indexed.status = TransferStatus::Complete;
    h.feed.set_records(vec![indexed]);

    let summary = h.poller.refresh_once().await.unwrap();
    assert_eq!(summary.removed, 1);
    assert!(h.persistence.snapshot().is_empty());
    let view = h.coordinator.store().history();
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].status, TransferStatus::Complete);
}

// ============================================================================
// Scenario B: Asset Hub -> Ethereum, insufficient DOT fee
// ============================================================================

#[tokio::test]
async fn test_scenario_b_insufficient_source_fee() {
    let h = TestHarness::new();
    h.sdk.push_logs(vec![SdkLogEntry::error(
        "InsufficientDotFee",
        "Not enough DOT to pay the delivery fee",
    )]);
    h.sdk.push_logs(vec![]);

    let source = Location::new("assethub", NetworkKind::Substrate, 1000)
        .asset_hub()
        .with_v2();
    let mut req = request(source, ethereum(), "WETH");
    req.source_account = "15Sender".to_string();
    req.beneficiary = "0xbeneficiary".to_string();

    let prepared = h
        .coordinator
        .prepare(req)
        .await
        .unwrap()
        .into_current()
        .unwrap();

    assert_eq!(prepared.route, TransferRoute::SubstrateToEvm);
    assert_eq!(prepared.plan.delivery(), DeliveryMechanism::V2);
    assert!(!prepared.plan.success);
    assert_eq!(prepared.derivation.steps.len(), 1);
    assert_eq!(prepared.derivation.steps[0].kind, StepKind::TopUpSourceFee);

    let mut engine = h.coordinator.start(prepared).unwrap();
    assert!(!engine.plan().unwrap().success);

    assert_eq!(engine.run_step().await.unwrap(), EngineState::AllStepsDone);
    assert!(engine.plan().unwrap().success);
    assert_eq!(engine.snapshot().per_step_status, vec![StepStatus::Success]);

    let record = h.coordinator.submit(&mut engine).await.unwrap();
    assert_eq!(record.id, "0xmsg-1");
    assert_eq!(record.source.submission.extrinsic_hash(), Some("0xext456"));
    assert_eq!(h.substrate.accounts(), vec!["15Sender".to_string()]);
    assert_eq!(h.evm.submit_count(), 0);
}

// ============================================================================
// Scenario C: unsupported combination
// ============================================================================

#[tokio::test]
async fn test_scenario_c_unsupported_route() {
    let h = TestHarness::new();
    let req = request(
        Location::new("base", NetworkKind::EthereumL2, 8453),
        Location::new("optimism", NetworkKind::EthereumL2, 10),
        "USDC",
    );

    let err = h.coordinator.prepare(req).await.unwrap_err();
    assert!(matches!(err, BridgeError::UnsupportedRoute { .. }));
    assert_eq!(err.code(), "UNSUPPORTED_ROUTE");
    assert_eq!(h.sdk.create_count(), 0);
    assert_eq!(h.sdk.validate_count(), 0);
}

// ============================================================================
// Supersession and cancellation
// ============================================================================

#[tokio::test]
async fn test_slow_build_is_superseded_by_newer_request() {
    let h = TestHarness::new();
    let mut slow = request(ethereum(), asset_hub(), "USDC");
    slow.amount = 1;
    let mut fast = slow.clone();
    fast.amount = 2;
    h.sdk.set_delay_for_amount(1, Duration::from_millis(50));

    let (first, second) = tokio::join!(h.coordinator.prepare(slow), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.coordinator.prepare(fast).await
    });

    let second = second.unwrap().into_current().unwrap();
    assert_eq!(second.request.amount, 2);

    match first.unwrap() {
        PlanBuild::Superseded { ticket, latest } => {
            assert_eq!(latest, second.ticket);
            assert!(ticket < latest);
        }
        PlanBuild::Current(_) => panic!("stale build must be discarded"),
    }

    assert!(h.coordinator.start(second).is_ok());
}

#[tokio::test]
async fn test_wrap_then_approve_for_wrapped_native() {
    let h = TestHarness::new();
    // Raw order deliberately puts the approval first
    h.sdk.push_logs(vec![
        SdkLogEntry::error("SpenderAllowanceExceeded", "approve"),
        SdkLogEntry::error("InsufficientTokenBalance", "wrap"),
        SdkLogEntry::warning("MinimumAmountBelowFee", "fee is high"),
    ]);

    let prepared = h
        .coordinator
        .prepare(request(ethereum(), asset_hub(), "weth"))
        .await
        .unwrap()
        .into_current()
        .unwrap();

    let kinds: Vec<_> = prepared.derivation.steps.iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![StepKind::DepositWrappedNative, StepKind::ApproveSpend]
    );
}

#[tokio::test]
async fn test_cancel_returns_to_form_without_submitting() {
    let h = TestHarness::new();
    h.sdk.push_logs(vec![SdkLogEntry::error(
        "GatewaySpenderLimitReached",
        "approve",
    )]);
    h.actions.fail_times(StepKind::ApproveSpend, 1);

    let prepared = h
        .coordinator
        .prepare(request(ethereum(), asset_hub(), "USDC"))
        .await
        .unwrap()
        .into_current()
        .unwrap();
    let mut engine = h.coordinator.start(prepared).unwrap();

    assert!(engine.run_step().await.is_err());
    engine.cancel();

    assert_eq!(engine.state(), EngineState::Cancelled);
    assert!(matches!(
        h.coordinator.submit(&mut engine).await,
        Err(BridgeError::InvalidState(_))
    ));
    assert_eq!(h.evm.submit_count(), 0);
    assert!(h.persistence.snapshot().is_empty());
}
