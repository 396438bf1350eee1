//! Remediation Step Deriver
//!
//! Turns a plan's validation logs into the ordered list of actions the user
//! must complete before the transfer can go through, plus the residual errors
//! nothing can fix.
//!
//! # Display order
//!
//! ```text
//! TopUpSourceFee (10) < TopUpExistentialDeposit (11) < DepositWrappedNative (20) < ApproveSpend (30)
//! ```

use std::fmt;

use tracing::{debug, warn};

use super::reason::{ToEthereumReason, ToPolkadotReason, ValidationReason};
use super::route::TransferRoute;
use super::types::{Severity, TransferRequest, ValidationLogEntry};

/// Kind of remediation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Approve the gateway contract to spend the token
    ApproveSpend,
    /// Wrap native ETH into the wrapped-native token
    DepositWrappedNative,
    /// Fund the beneficiary up to the existential deposit
    TopUpExistentialDeposit,
    /// Fund the sender with the fee asset on the source chain
    TopUpSourceFee,
}

impl StepKind {
    #[inline]
    pub fn display_order(&self) -> u32 {
        match self {
            StepKind::TopUpSourceFee => 10,
            StepKind::TopUpExistentialDeposit => 11,
            StepKind::DepositWrappedNative => 20,
            StepKind::ApproveSpend => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::ApproveSpend => "APPROVE_SPEND",
            StepKind::DepositWrappedNative => "DEPOSIT_WRAPPED_NATIVE",
            StepKind::TopUpExistentialDeposit => "TOP_UP_EXISTENTIAL_DEPOSIT",
            StepKind::TopUpSourceFee => "TOP_UP_SOURCE_FEE",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A prerequisite action shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationStep {
    pub kind: StepKind,
    pub display_order: u32,
    /// SDK message that produced the step
    pub message: String,
}

impl RemediationStep {
    pub fn new(kind: StepKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            display_order: kind.display_order(),
            message: message.into(),
        }
    }
}

/// Facts about the request the mapping table depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepContext {
    pub source_is_asset_hub: bool,
    pub destination_is_asset_hub: bool,
    pub token_symbol: String,
    pub wrapped_native_symbol: String,
}

impl StepContext {
    pub fn from_request(request: &TransferRequest, wrapped_native_symbol: &str) -> Self {
        Self {
            source_is_asset_hub: request.source.asset_hub_like,
            destination_is_asset_hub: request.destination.asset_hub_like,
            token_symbol: request.token.symbol.clone(),
            wrapped_native_symbol: wrapped_native_symbol.to_string(),
        }
    }

    fn is_wrapped_native(&self) -> bool {
        self.token_symbol
            .eq_ignore_ascii_case(&self.wrapped_native_symbol)
    }
}

/// Derived steps plus unmapped errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepDerivation {
    /// Sorted ascending by `display_order`
    pub steps: Vec<RemediationStep>,
    /// Blocking errors no step can fix, verbatim and in log order
    pub errors: Vec<ValidationLogEntry>,
}

impl StepDerivation {
    /// The plan can succeed after remediation only when nothing is unmapped
    #[inline]
    pub fn is_actionable(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

/// Map validation logs to remediation steps
pub fn derive_steps(
    route: TransferRoute,
    logs: &[ValidationLogEntry],
    ctx: &StepContext,
) -> StepDerivation {
    let mut derivation = StepDerivation::default();

    for entry in logs {
        if entry.severity == Severity::Warning {
            warn!(route = %route, reason = %entry.reason, message = %entry.message, "Validation warning");
            continue;
        }

        match step_for(route, &entry.reason, ctx) {
            Some(kind) => {
                if derivation.steps.iter().any(|s| s.kind == kind) {
                    debug!(kind = %kind, "Duplicate remediation reason ignored");
                    continue;
                }
                derivation
                    .steps
                    .push(RemediationStep::new(kind, entry.message.clone()));
            }
            None => derivation.errors.push(entry.clone()),
        }
    }

    // Stable: equal orders keep log order
    derivation.steps.sort_by_key(|s| s.display_order);
    derivation
}

fn step_for(route: TransferRoute, reason: &ValidationReason, ctx: &StepContext) -> Option<StepKind> {
    match (route, reason) {
        (
            TransferRoute::SubstrateToEvm,
            ValidationReason::ToEthereum(ToEthereumReason::InsufficientSourceFee),
        ) if ctx.source_is_asset_hub => Some(StepKind::TopUpSourceFee),
        (
            TransferRoute::EvmToSubstrate,
            ValidationReason::ToPolkadot(ToPolkadotReason::BeneficiaryBelowExistentialDeposit),
        ) if ctx.destination_is_asset_hub => Some(StepKind::TopUpExistentialDeposit),
        (
            TransferRoute::EvmToSubstrate,
            ValidationReason::ToPolkadot(ToPolkadotReason::SpenderAllowanceExceeded),
        ) => Some(StepKind::ApproveSpend),
        (
            TransferRoute::EvmToSubstrate,
            ValidationReason::ToPolkadot(ToPolkadotReason::InsufficientTokenBalance),
        ) if ctx.is_wrapped_native() => Some(StepKind::DepositWrappedNative),
        _ => None,
    }
}
