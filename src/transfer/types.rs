//! Transfer Core Types
//!
//! Locations, requests and plans shared by the orchestration core.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::reason::ValidationReason;
use super::route::TransferRoute;

/// Network kind of a source or destination location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    /// Ethereum L1
    Ethereum,
    /// Rollup settling on Ethereum
    EthereumL2,
    /// Polkadot parachain (or relay chain)
    Substrate,
}

impl NetworkKind {
    pub const ALL: [NetworkKind; 3] = [
        NetworkKind::Ethereum,
        NetworkKind::EthereumL2,
        NetworkKind::Substrate,
    ];

    /// Wallet family able to sign on this network
    #[inline]
    pub fn family(&self) -> NetworkFamily {
        match self {
            NetworkKind::Ethereum | NetworkKind::EthereumL2 => NetworkFamily::Evm,
            NetworkKind::Substrate => NetworkFamily::Substrate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkKind::Ethereum => "ethereum",
            NetworkKind::EthereumL2 => "ethereum_l2",
            NetworkKind::Substrate => "substrate",
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ethereum" => Ok(NetworkKind::Ethereum),
            "ethereum_l2" => Ok(NetworkKind::EthereumL2),
            "substrate" | "polkadot" => Ok(NetworkKind::Substrate),
            _ => Err(format!("Invalid network kind: {}", s)),
        }
    }
}

/// Signer family, one wallet provider per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkFamily {
    Evm,
    Substrate,
}

impl fmt::Display for NetworkFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkFamily::Evm => write!(f, "evm"),
            NetworkFamily::Substrate => write!(f, "substrate"),
        }
    }
}

/// A source or destination chain as selected in the transfer form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Registry key (e.g. "ethereum", "assethub", "hydration")
    pub key: String,
    pub kind: NetworkKind,
    /// EVM chain id, or parachain id for substrate locations
    pub chain_id: u64,
    /// Subject to existential-deposit and DOT-fee rules
    pub asset_hub_like: bool,
    /// Parachain advertises the V2 delivery mechanism
    pub supports_v2: bool,
}

impl Location {
    pub fn new(key: impl Into<String>, kind: NetworkKind, chain_id: u64) -> Self {
        Self {
            key: key.into(),
            kind,
            chain_id,
            asset_hub_like: false,
            supports_v2: false,
        }
    }

    pub fn asset_hub(mut self) -> Self {
        self.asset_hub_like = true;
        self
    }

    pub fn with_v2(mut self) -> Self {
        self.supports_v2 = true;
        self
    }
}

/// Token being bridged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// ERC-20 contract address or asset location key
    pub id: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Fee quote obtained from the bridging SDK before planning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeQuote {
    /// Symbol of the asset the fee is paid in
    pub asset: String,
    pub delivery: u128,
    pub execution: u128,
}

impl FeeQuote {
    pub fn total(&self) -> u128 {
        self.delivery.saturating_add(self.execution)
    }
}

/// Transfer request as validated by the form
///
/// Immutable once a plan is requested. A new amount or account means a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: Location,
    pub destination: Location,
    pub token: Token,
    /// Amount in the token's smallest unit
    pub amount: u128,
    pub source_account: String,
    pub beneficiary: String,
    pub fee: FeeQuote,
}

/// How the message is delivered across the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMechanism {
    Legacy,
    V2,
}

impl fmt::Display for DeliveryMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMechanism::Legacy => write!(f, "legacy"),
            DeliveryMechanism::V2 => write!(f, "v2"),
        }
    }
}

/// Unsigned transaction (EVM call) or extrinsic produced by the SDK
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransfer {
    pub route: TransferRoute,
    pub delivery: DeliveryMechanism,
    /// Encoded call data or SCALE-encoded extrinsic
    pub payload: Vec<u8>,
}

/// Severity of a validation log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// One entry of the SDK's validation output, with its reason triaged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLogEntry {
    pub severity: Severity,
    pub reason: ValidationReason,
    pub message: String,
}

impl ValidationLogEntry {
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Unsigned transfer plus its validation outcome
///
/// `success` mirrors the validation result: true only when no error-severity
/// entry is present. A failed plan is discarded and rebuilt after remediation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub route: TransferRoute,
    pub unsigned: UnsignedTransfer,
    pub logs: Vec<ValidationLogEntry>,
    pub success: bool,
}

impl TransferPlan {
    pub fn delivery(&self) -> DeliveryMechanism {
        self.unsigned.delivery
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationLogEntry> {
        self.logs.iter().filter(|l| l.is_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_family() {
        assert_eq!(NetworkKind::Ethereum.family(), NetworkFamily::Evm);
        assert_eq!(NetworkKind::EthereumL2.family(), NetworkFamily::Evm);
        assert_eq!(NetworkKind::Substrate.family(), NetworkFamily::Substrate);
    }

    #[test]
    fn test_network_kind_parse() {
        assert_eq!(
            "ethereum_l2".parse::<NetworkKind>().unwrap(),
            NetworkKind::EthereumL2
        );
        assert_eq!(
            "Substrate".parse::<NetworkKind>().unwrap(),
            NetworkKind::Substrate
        );
        assert!("solana".parse::<NetworkKind>().is_err());
    }

    #[test]
    fn test_fee_total_saturates() {
        let fee = FeeQuote {
            asset: "DOT".to_string(),
            delivery: u128::MAX,
            execution: 1,
        };
        assert_eq!(fee.total(), u128::MAX);
    }

    #[test]
    fn test_location_builders() {
        let ah = Location::new("assethub", NetworkKind::Substrate, 1000)
            .asset_hub()
            .with_v2();
        assert!(ah.asset_hub_like);
        assert!(ah.supports_v2);
        assert_eq!(ah.kind.to_string(), "substrate");
    }
}
