//! Custody Ledger - Committee approval state machine
//!
//! One `Wallet` is one custody instance: a fixed committee, a quorum
//! threshold and the ordered list of proposed outbound transfers.
//!
//! # Key Types
//! - `Committee`: immutable owner list plus threshold
//! - `Transaction`: one proposed transfer with its per-owner approvals
//! - `TxStatus`: Pending / Approved / Executed, derived on read
//! - `AssetTransfer`: the value-moving backend a wallet executes against

pub mod committee;
pub mod error;
pub mod transaction;
pub mod transfer;
pub mod wallet;

pub use committee::Committee;
pub use error::{CommitteeError, LedgerError};
pub use transaction::{Transaction, TxStatus};
pub use transfer::{AssetTransfer, NativeVault, Payout, TransferError};
pub use wallet::Wallet;
