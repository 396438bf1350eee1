//! Validation Reason Triage
//!
//! The SDK reports validation failures as string codes. They are parsed into a
//! closed enum per route family; anything unrecognised lands in `Unknown` and
//! is treated as an unmapped, blocking error.

use std::fmt;

use super::route::TransferRoute;

/// Reasons reported when validating a Polkadot -> Ethereum transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToEthereumReason {
    /// Sender cannot pay the DOT execution/delivery fee on the source chain
    InsufficientSourceFee,
    InsufficientTokenBalance,
    Unknown(String),
}

impl ToEthereumReason {
    pub fn parse(code: &str) -> Self {
        match code {
            "InsufficientSourceFeeBalance" | "InsufficientDotFee" => {
                ToEthereumReason::InsufficientSourceFee
            }
            "InsufficientTokenBalance" => ToEthereumReason::InsufficientTokenBalance,
            other => ToEthereumReason::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ToEthereumReason::InsufficientSourceFee => "InsufficientSourceFeeBalance",
            ToEthereumReason::InsufficientTokenBalance => "InsufficientTokenBalance",
            ToEthereumReason::Unknown(code) => code,
        }
    }
}

/// Reasons reported when validating an Ethereum -> Polkadot transfer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToPolkadotReason {
    BeneficiaryBelowExistentialDeposit,
    /// Gateway contract is not approved to spend the amount
    SpenderAllowanceExceeded,
    InsufficientTokenBalance,
    Unknown(String),
}

impl ToPolkadotReason {
    pub fn parse(code: &str) -> Self {
        match code {
            "BeneficiaryAccountBelowExistentialDeposit" | "AccountDoesNotExist" => {
                ToPolkadotReason::BeneficiaryBelowExistentialDeposit
            }
            "SpenderAllowanceExceeded" | "GatewaySpenderLimitReached" => {
                ToPolkadotReason::SpenderAllowanceExceeded
            }
            "InsufficientTokenBalance" => ToPolkadotReason::InsufficientTokenBalance,
            other => ToPolkadotReason::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ToPolkadotReason::BeneficiaryBelowExistentialDeposit => {
                "BeneficiaryAccountBelowExistentialDeposit"
            }
            ToPolkadotReason::SpenderAllowanceExceeded => "SpenderAllowanceExceeded",
            ToPolkadotReason::InsufficientTokenBalance => "InsufficientTokenBalance",
            ToPolkadotReason::Unknown(code) => code,
        }
    }
}

/// Triaged validation reason
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationReason {
    ToEthereum(ToEthereumReason),
    ToPolkadot(ToPolkadotReason),
    /// Routes with no remediation table (evm->evm, substrate->substrate)
    Other(String),
}

impl ValidationReason {
    /// Parse a raw SDK reason code in the context of a route
    pub fn parse(route: TransferRoute, code: &str) -> Self {
        if route.is_to_ethereum() {
            ValidationReason::ToEthereum(ToEthereumReason::parse(code))
        } else if route.is_to_polkadot() {
            ValidationReason::ToPolkadot(ToPolkadotReason::parse(code))
        } else {
            ValidationReason::Other(code.to_string())
        }
    }

    pub fn code(&self) -> &str {
        match self {
            ValidationReason::ToEthereum(r) => r.code(),
            ValidationReason::ToPolkadot(r) => r.code(),
            ValidationReason::Other(code) => code,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(
            self,
            ValidationReason::ToEthereum(ToEthereumReason::Unknown(_))
                | ValidationReason::ToPolkadot(ToPolkadotReason::Unknown(_))
                | ValidationReason::Other(_)
        )
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
