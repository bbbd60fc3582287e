//! Ledger errors

use crate::transfer::TransferError;
use custody_core::{Principal, TxId};
use thiserror::Error;

/// Reasons a committee definition is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitteeError {
    #[error("Committee must have at least one owner")]
    Empty,

    #[error("Threshold {threshold} out of range for {owners} owners")]
    InvalidThreshold { threshold: usize, owners: usize },

    #[error("Duplicate owner: {0}")]
    DuplicateOwner(Principal),

    #[error("Committee of {owners} owners exceeds limit of {max}")]
    TooLarge { owners: usize, max: usize },
}

/// Errors that can occur in wallet operations.
///
/// Every variant is a caller-input or authorization failure; a failed call
/// leaves the wallet untouched and emits nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Not an owner: {0}")]
    NotAnOwner(Principal),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TxId),

    #[error("Transaction {0} already executed")]
    AlreadyExecuted(TxId),

    #[error("Transaction {tx_id} already approved by {owner}")]
    AlreadyApproved { tx_id: TxId, owner: Principal },

    #[error("Transaction {tx_id} not approved by {owner}")]
    NotApproved { tx_id: TxId, owner: Principal },

    #[error("Transaction {tx_id} has {have} of {need} required approvals")]
    InsufficientApprovals { tx_id: TxId, have: usize, need: usize },

    #[error("Invalid committee: {0}")]
    InvalidCommittee(#[from] CommitteeError),

    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}
