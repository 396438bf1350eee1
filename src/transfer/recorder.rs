//! Submission Recorder
//!
//! Maps a successful send into the canonical history record. Never fails:
//! the transfer is already on-chain, so missing receipt fields become empty
//! or zero sentinels.

use chrono::{DateTime, Utc};

use super::route::TransferRoute;
use super::signer::SendResult;
use super::types::TransferRequest;
use crate::history::types::{
    DestinationInfo, HistoryRecord, SourceInfo, SubmissionInfo, TransferStatus,
};

pub fn to_history_record(
    route: TransferRoute,
    request: &TransferRequest,
    result: &SendResult,
) -> HistoryRecord {
    to_history_record_at(route, request, result, Utc::now())
}

pub fn to_history_record_at(
    route: TransferRoute,
    request: &TransferRequest,
    result: &SendResult,
    submitted_at: DateTime<Utc>,
) -> HistoryRecord {
    let (submission, nonce) = match result {
        SendResult::Evm { receipt, .. } => (
            SubmissionInfo::Evm {
                tx_hash: receipt.tx_hash.clone().unwrap_or_default(),
                block_number: receipt.block_number.unwrap_or(0),
                block_hash: receipt.block_hash.clone().unwrap_or_default(),
            },
            receipt.nonce.unwrap_or(0),
        ),
        SendResult::Substrate { receipt, .. } => (
            SubmissionInfo::Substrate {
                extrinsic_hash: receipt.extrinsic_hash.clone().unwrap_or_default(),
                block_hash: receipt.block_hash.clone().unwrap_or_default(),
                block_number: receipt.block_number.unwrap_or(0),
                extrinsic_index: receipt.extrinsic_index.unwrap_or(0),
            },
            receipt.nonce.unwrap_or(0),
        ),
    };

    // Until the message id is known the submission hash stands in
    let id = match result.message_id() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => submission.hash().to_string(),
    };

    HistoryRecord {
        id,
        route,
        status: TransferStatus::Pending,
        submitted_at,
        source: SourceInfo {
            chain: request.source.key.clone(),
            sender: request.source_account.clone(),
            token: request.token.id.clone(),
            amount: request.amount,
            submission,
        },
        destination: DestinationInfo {
            chain: request.destination.key.clone(),
            beneficiary: request.beneficiary.clone(),
            nonce,
        },
        is_wallet_transaction: true,
    }
}
