//! Custody Core - Domain types
//!
//! This crate contains the fundamental types shared by the custody crates:
//! - `Principal`: 20-byte participant identifier
//! - `Amount`: Non-negative decimal wrapper for custodied value
//! - `CommitteeKey` / `InstanceId` / `TxId`: registry and ledger identifiers
//! - `CustodyEvent`: notifications emitted by wallets and the registry

pub mod amount;
pub mod event;
pub mod id;
pub mod principal;

pub use amount::{Amount, AmountError};
pub use event::CustodyEvent;
pub use id::{CommitteeKey, InstanceId, ParseIdError, TxId};
pub use principal::{ParsePrincipalError, Principal};
