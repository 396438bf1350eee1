//! Plan Builder
//!
//! Builds an unsigned transfer through the SDK, validates it against live
//! chain state and triages every log entry's reason code.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::BridgeError;
use super::reason::ValidationReason;
use super::route::TransferRoute;
use super::sdk::{BridgeSdk, SdkLogEntry};
use super::types::{
    DeliveryMechanism, Severity, TransferPlan, TransferRequest, ValidationLogEntry,
};

/// Pick the SDK code path for a route
///
/// Polkadot -> Ethereum follows the source parachain's capability flag,
/// Ethereum -> Polkadot follows the destination's. L2 delivery only exists
/// under V2.
pub fn select_delivery(route: TransferRoute, request: &TransferRequest) -> DeliveryMechanism {
    let v2 = match route {
        TransferRoute::SubstrateToEvm => request.source.supports_v2,
        TransferRoute::EvmToSubstrate => request.destination.supports_v2,
        TransferRoute::SubstrateToEvmL2 => true,
        TransferRoute::EvmToEvm | TransferRoute::SubstrateToSubstrate => false,
    };

    if v2 {
        DeliveryMechanism::V2
    } else {
        DeliveryMechanism::Legacy
    }
}

/// Builds and validates transfer plans
pub struct PlanBuilder {
    sdk: Arc<dyn BridgeSdk>,
}

impl PlanBuilder {
    pub fn new(sdk: Arc<dyn BridgeSdk>) -> Self {
        Self { sdk }
    }

    /// Build a plan for an already-classified request
    ///
    /// Node failures surface as `PlanBuildFailed`. A successful call always
    /// carries the validation logs, warnings included.
    pub async fn build(
        &self,
        route: TransferRoute,
        request: &TransferRequest,
    ) -> Result<TransferPlan, BridgeError> {
        let delivery = select_delivery(route, request);
        debug!(route = %route, delivery = %delivery, amount = %request.amount, "Building plan");

        let unsigned = self
            .sdk
            .create_transfer(route, delivery, request)
            .await
            .map_err(|e| BridgeError::PlanBuildFailed(e.to_string()))?;

        let validation = self
            .sdk
            .validate_transfer(&unsigned)
            .await
            .map_err(|e| BridgeError::PlanBuildFailed(e.to_string()))?;

        let logs: Vec<ValidationLogEntry> = validation
            .logs
            .into_iter()
            .map(|raw| triage(route, raw))
            .collect();

        let has_errors = logs.iter().any(|l| l.is_error());
        if validation.success && has_errors {
            warn!(route = %route, "SDK reported success alongside error logs, treating plan as failed");
        }

        info!(
            route = %route,
            delivery = %delivery,
            logs = logs.len(),
            success = !has_errors,
            "Plan built"
        );

        Ok(TransferPlan {
            route,
            unsigned,
            success: !has_errors,
            logs,
        })
    }
}

fn triage(route: TransferRoute, raw: SdkLogEntry) -> ValidationLogEntry {
    let reason = ValidationReason::parse(route, &raw.reason_code);
    if raw.severity == Severity::Error && reason.is_unknown() {
        debug!(route = %route, code = %raw.reason_code, "Unrecognised validation reason");
    }

    ValidationLogEntry {
        severity: raw.severity,
        reason,
        message: raw.message,
    }
}
