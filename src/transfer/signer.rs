//! Wallet Signers
//!
//! One signer per network family. Both may fail on user rejection or node
//! error; the engine treats every failure the same way.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::{BridgeError, CollaboratorError};
use super::types::{NetworkFamily, UnsignedTransfer};

/// Receipt of an EVM transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvmReceipt {
    pub tx_hash: Option<String>,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    /// Gateway outbound nonce from the emitted event
    pub nonce: Option<u64>,
}

/// Receipt of a substrate extrinsic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstrateReceipt {
    pub extrinsic_hash: Option<String>,
    pub block_hash: Option<String>,
    pub block_number: Option<u64>,
    pub extrinsic_index: Option<u32>,
    /// Outbound message nonce, when the inclusion event was observed
    pub nonce: Option<u64>,
}

/// What `sign_and_submit` returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionReceipt {
    Evm(EvmReceipt),
    Substrate(SubstrateReceipt),
}

/// Successful send: the receipt plus the bridge message id, if known yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    Evm {
        receipt: EvmReceipt,
        message_id: Option<String>,
    },
    Substrate {
        receipt: SubstrateReceipt,
        message_id: Option<String>,
    },
}

impl SendResult {
    pub fn from_receipt(receipt: SubmissionReceipt, message_id: Option<String>) -> Self {
        match receipt {
            SubmissionReceipt::Evm(receipt) => SendResult::Evm {
                receipt,
                message_id,
            },
            SubmissionReceipt::Substrate(receipt) => SendResult::Substrate {
                receipt,
                message_id,
            },
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            SendResult::Evm { message_id, .. } | SendResult::Substrate { message_id, .. } => {
                message_id.as_deref()
            }
        }
    }
}

/// Wallet provider for one network family
#[async_trait]
pub trait TransferSigner: Send + Sync {
    fn family(&self) -> NetworkFamily;

    /// Ask the wallet to sign and broadcast
    async fn sign_and_submit(
        &self,
        transfer: &UnsignedTransfer,
        account: &str,
    ) -> Result<SubmissionReceipt, CollaboratorError>;

    /// Extract the bridge message id from a receipt
    async fn get_message_id(
        &self,
        receipt: &SubmissionReceipt,
    ) -> Result<Option<String>, CollaboratorError>;
}

/// Registered signers, looked up by the route's source family
#[derive(Clone, Default)]
pub struct SignerSet {
    evm: Option<Arc<dyn TransferSigner>>,
    substrate: Option<Arc<dyn TransferSigner>>,
}

impl SignerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, signer: Arc<dyn TransferSigner>) -> Self {
        match signer.family() {
            NetworkFamily::Evm => self.evm = Some(signer),
            NetworkFamily::Substrate => self.substrate = Some(signer),
        }
        self
    }

    pub fn get(&self, family: NetworkFamily) -> Result<Arc<dyn TransferSigner>, BridgeError> {
        let signer = match family {
            NetworkFamily::Evm => self.evm.clone(),
            NetworkFamily::Substrate => self.substrate.clone(),
        };
        signer.ok_or(BridgeError::MissingSigner(family))
    }
}


#[cfg(test)]
pub use mock::MockSigner;
