//! Route Classifier
//!
//! Maps a (source kind, destination kind) pair to one of the five routes the
//! bridge supports. Rules are checked in order, first match wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::BridgeError;
use super::types::{Location, NetworkFamily, NetworkKind};

/// Transfer route. Derived from a request, never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferRoute {
    #[serde(rename = "evm->evm")]
    EvmToEvm,
    #[serde(rename = "substrate->evm")]
    SubstrateToEvm,
    #[serde(rename = "evm->substrate")]
    EvmToSubstrate,
    #[serde(rename = "substrate->substrate")]
    SubstrateToSubstrate,
    #[serde(rename = "substrate->evm_l2")]
    SubstrateToEvmL2,
}

impl TransferRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferRoute::EvmToEvm => "evm->evm",
            TransferRoute::SubstrateToEvm => "substrate->evm",
            TransferRoute::EvmToSubstrate => "evm->substrate",
            TransferRoute::SubstrateToSubstrate => "substrate->substrate",
            TransferRoute::SubstrateToEvmL2 => "substrate->evm_l2",
        }
    }

    /// Family of the wallet that signs the final submission
    pub fn source_family(&self) -> NetworkFamily {
        match self {
            TransferRoute::EvmToEvm | TransferRoute::EvmToSubstrate => NetworkFamily::Evm,
            TransferRoute::SubstrateToEvm
            | TransferRoute::SubstrateToSubstrate
            | TransferRoute::SubstrateToEvmL2 => NetworkFamily::Substrate,
        }
    }

    /// Polkadot -> Ethereum direction (L1 or L2 destination)
    #[inline]
    pub fn is_to_ethereum(&self) -> bool {
        matches!(
            self,
            TransferRoute::SubstrateToEvm | TransferRoute::SubstrateToEvmL2
        )
    }

    /// Ethereum -> Polkadot direction
    #[inline]
    pub fn is_to_polkadot(&self) -> bool {
        matches!(self, TransferRoute::EvmToSubstrate)
    }
}

impl fmt::Display for TransferRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a transfer by the network kinds of its endpoints
///
/// Total over all kind pairs: every combination yields a route or
/// `BridgeError::UnsupportedRoute`.
pub fn classify(source: NetworkKind, destination: NetworkKind) -> Result<TransferRoute, BridgeError> {
    use NetworkKind::*;

    match (source, destination) {
        // L2 -> L2 never crosses the bridge
        (EthereumL2, EthereumL2) => Err(BridgeError::UnsupportedRoute {
            from: source,
            to: destination,
        }),
        (Ethereum | EthereumL2, Ethereum | EthereumL2) => Ok(TransferRoute::EvmToEvm),
        (Substrate, Ethereum) => Ok(TransferRoute::SubstrateToEvm),
        (Substrate, EthereumL2) => Ok(TransferRoute::SubstrateToEvmL2),
        (Ethereum, Substrate) => Ok(TransferRoute::EvmToSubstrate),
        (Substrate, Substrate) => Ok(TransferRoute::SubstrateToSubstrate),
        (EthereumL2, Substrate) => Err(BridgeError::UnsupportedRoute {
            from: source,
            to: destination,
        }),
    }
}

/// Classify a transfer between two concrete locations
pub fn classify_locations(
    source: &Location,
    destination: &Location,
) -> Result<TransferRoute, BridgeError> {
    classify(source.kind, destination.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_total() {
        let mut routes = 0;
        let mut unsupported = 0;
        for source in NetworkKind::ALL {
            for destination in NetworkKind::ALL {
                match classify(source, destination) {
                    Ok(_) => routes += 1,
                    Err(BridgeError::UnsupportedRoute { .. }) => unsupported += 1,
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
        assert_eq!(routes + unsupported, 9);
        assert_eq!(unsupported, 2);
    }

    #[test]
    fn test_classification_table() {
        use NetworkKind::*;
        assert_eq!(classify(Ethereum, Ethereum).unwrap(), TransferRoute::EvmToEvm);
        assert_eq!(classify(Ethereum, EthereumL2).unwrap(), TransferRoute::EvmToEvm);
        assert_eq!(classify(EthereumL2, Ethereum).unwrap(), TransferRoute::EvmToEvm);
        assert_eq!(
            classify(Substrate, Ethereum).unwrap(),
            TransferRoute::SubstrateToEvm
        );
        assert_eq!(
            classify(Substrate, EthereumL2).unwrap(),
            TransferRoute::SubstrateToEvmL2
        );
        assert_eq!(
            classify(Ethereum, Substrate).unwrap(),
            TransferRoute::EvmToSubstrate
        );
        assert_eq!(
            classify(Substrate, Substrate).unwrap(),
            TransferRoute::SubstrateToSubstrate
        );
    }

    #[test]
    fn test_unsupported_routes() {
        use NetworkKind::*;
        assert!(matches!(
            classify(EthereumL2, EthereumL2),
            Err(BridgeError::UnsupportedRoute {
                from: EthereumL2,
                to: EthereumL2
            })
        ));
        assert!(classify(EthereumL2, Substrate).is_err());
    }

    #[test]
    fn test_source_family() {
        assert_eq!(TransferRoute::EvmToSubstrate.source_family(), NetworkFamily::Evm);
        assert_eq!(
            TransferRoute::SubstrateToEvmL2.source_family(),
            NetworkFamily::Substrate
        );
    }

    #[test]
    fn test_route_serde_names() {
        let json = serde_json::to_string(&TransferRoute::SubstrateToEvmL2).unwrap();
        assert_eq!(json, "\"substrate->evm_l2\"");
        let back: TransferRoute = serde_json::from_str("\"evm->substrate\"").unwrap();
        assert_eq!(back, TransferRoute::EvmToSubstrate);
    }
}
