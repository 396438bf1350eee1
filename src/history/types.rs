//! History Record Types
//!
//! Canonical shape of a submitted transfer, shared by locally recorded
//! pending transfers and the indexer's history feed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transfer::route::TransferRoute;

/// Lifecycle of a transfer as seen by the indexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Complete,
    Failed,
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "pending"),
            TransferStatus::Complete => write!(f, "complete"),
            TransferStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Chain-specific identifiers of the source submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionInfo {
    Evm {
        tx_hash: String,
        block_number: u64,
        block_hash: String,
    },
    Substrate {
        extrinsic_hash: String,
        block_hash: String,
        block_number: u64,
        extrinsic_index: u32,
    },
}

impl SubmissionInfo {
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            SubmissionInfo::Evm { tx_hash, .. } => Some(tx_hash),
            SubmissionInfo::Substrate { .. } => None,
        }
    }

    pub fn extrinsic_hash(&self) -> Option<&str> {
        match self {
            SubmissionInfo::Substrate { extrinsic_hash, .. } => Some(extrinsic_hash),
            SubmissionInfo::Evm { .. } => None,
        }
    }

    /// Transaction or extrinsic hash, whichever applies
    pub fn hash(&self) -> &str {
        match self {
            SubmissionInfo::Evm { tx_hash, .. } => tx_hash,
            SubmissionInfo::Substrate { extrinsic_hash, .. } => extrinsic_hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Location key of the source chain
    pub chain: String,
    pub sender: String,
    pub token: String,
    #[serde(with = "u128_string")]
    pub amount: u128,
    pub submission: SubmissionInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationInfo {
    /// Location key of the destination chain
    pub chain: String,
    pub beneficiary: String,
    /// Outbound message nonce (0 when unknown)
    #[serde(default)]
    pub nonce: u64,
}

/// A transfer in the activity list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Bridge message id. Locally created records may carry the submission
    /// hash until the message id is known.
    pub id: String,
    pub route: TransferRoute,
    pub status: TransferStatus,
    pub submitted_at: DateTime<Utc>,
    pub source: SourceInfo,
    pub destination: DestinationInfo,
    pub is_wallet_transaction: bool,
}

impl HistoryRecord {
    #[inline]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Lossless decimal-string encoding for u128 amounts
pub mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>()
            .map_err(|e| D::Error::custom(format!("invalid amount {s:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_serializes_as_string() {
        let info = SourceInfo {
            chain: "ethereum".to_string(),
            sender: "0xabc".to_string(),
            token: "WETH".to_string(),
            amount: u128::MAX,
            submission: SubmissionInfo::Evm {
                tx_hash: "0x1".to_string(),
                block_number: 1,
                block_hash: "0x2".to_string(),
            },
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["amount"], "340282366920938463463374607431768211455");
        assert_eq!(json["submission"]["kind"], "evm");

        let back: SourceInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back.amount, u128::MAX);
    }

    #[test]
    fn test_invalid_amount_rejected() {
        let json = serde_json::json!({
            "chain": "ethereum",
            "sender": "0xabc",
            "token": "WETH",
            "amount": "1.5",
            "submission": { "kind": "evm", "tx_hash": "", "block_number": 0, "block_hash": "" }
        });
        assert!(serde_json::from_value::<SourceInfo>(json).is_err());
    }

    #[test]
    fn test_submission_hash_accessors() {
        let sub = SubmissionInfo::Substrate {
            extrinsic_hash: "0xext".to_string(),
            block_hash: String::new(),
            block_number: 0,
            extrinsic_index: 0,
        };
        assert_eq!(sub.extrinsic_hash(), Some("0xext"));
        assert_eq!(sub.tx_hash(), None);
        assert_eq!(sub.hash(), "0xext");
    }
}
