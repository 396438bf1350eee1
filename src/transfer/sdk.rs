//! Bridging SDK seam
//!
//! Plan construction and validation are delegated to the bridging SDK. The
//! core only relies on the two calls below.

use async_trait::async_trait;

use super::error::CollaboratorError;
use super::route::TransferRoute;
use super::types::{DeliveryMechanism, Severity, TransferRequest, UnsignedTransfer};

/// Raw validation log entry as returned by the SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLogEntry {
    pub severity: Severity,
    pub reason_code: String,
    pub message: String,
}

impl SdkLogEntry {
    pub fn error(reason_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            reason_code: reason_code.into(),
            message: message.into(),
        }
    }

    pub fn warning(reason_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            reason_code: reason_code.into(),
            message: message.into(),
        }
    }
}

/// Outcome of `validate_transfer`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkValidation {
    pub success: bool,
    pub logs: Vec<SdkLogEntry>,
}

/// Plan/validate calls of the bridging SDK
///
/// Both calls talk to source/destination chain nodes and may fail with
/// `CollaboratorError::Unreachable`.
#[async_trait]
pub trait BridgeSdk: Send + Sync {
    /// Build an unsigned transaction or extrinsic for the route
    async fn create_transfer(
        &self,
        route: TransferRoute,
        delivery: DeliveryMechanism,
        request: &TransferRequest,
    ) -> Result<UnsignedTransfer, CollaboratorError>;

    /// Dry-run the transfer against live chain state
    async fn validate_transfer(
        &self,
        transfer: &UnsignedTransfer,
    ) -> Result<SdkValidation, CollaboratorError>;
}


#[cfg(test)]
pub use mock::MockSdk;
