//! Asset transfer backend
//!
//! A wallet never moves value itself. It forwards approved transfers to an
//! `AssetTransfer` implementation, which may be a native-currency account or
//! a fungible-token ledger.

use custody_core::{Amount, Principal};
use serde::Serialize;
use thiserror::Error;

/// Errors reported by a transfer backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Balance overflow")]
    Overflow,

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Capability a wallet needs to hold and release value
pub trait AssetTransfer {
    /// Send `amount` to `recipient`, handing over the opaque payload unchanged
    fn transfer(
        &mut self,
        recipient: &Principal,
        amount: Amount,
        payload: &[u8],
    ) -> Result<(), TransferError>;

    /// Accept value paid in by `sender`, returning the new balance
    fn receive(&mut self, sender: &Principal, amount: Amount) -> Result<Amount, TransferError>;

    fn balance(&self) -> Amount;
}

/// A completed outbound transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub recipient: Principal,
    pub amount: Amount,
    pub payload: Vec<u8>,
}

/// In-memory native-currency backend.
///
/// Holds a single balance and records every payout in order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NativeVault {
    balance: Amount,
    payouts: Vec<Payout>,
}

impl NativeVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(balance: Amount) -> Self {
        Self {
            balance,
            payouts: Vec::new(),
        }
    }

    pub fn payouts(&self) -> &[Payout] {
        &self.payouts
    }
}

impl AssetTransfer for NativeVault {
    fn transfer(
        &mut self,
        recipient: &Principal,
        amount: Amount,
        payload: &[u8],
    ) -> Result<(), TransferError> {
        let remaining = self
            .balance
            .checked_sub(&amount)
            .ok_or(TransferError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            })?;

        self.balance = remaining;
        self.payouts.push(Payout {
            recipient: *recipient,
            amount,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn receive(&mut self, _sender: &Principal, amount: Amount) -> Result<Amount, TransferError> {
        self.balance = self.balance.checked_add(&amount).ok_or(TransferError::Overflow)?;
        Ok(self.balance)
    }

    fn balance(&self) -> Amount {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_debits_and_records() {
        let mut vault = NativeVault::with_balance(Amount::from_units(10));
        vault
            .transfer(&Principal::repeat(7), Amount::from_units(4), b"memo")
            .unwrap();

        assert_eq!(vault.balance(), Amount::from_units(6));
        assert_eq!(vault.payouts().len(), 1);
        assert_eq!(vault.payouts()[0].payload, b"memo".to_vec());
    }

    #[test]
    fn test_transfer_over_balance_fails_without_change() {
        let mut vault = NativeVault::with_balance(Amount::from_units(3));
        let result = vault.transfer(&Principal::repeat(7), Amount::from_units(4), &[]);

        assert_eq!(
            result,
            Err(TransferError::InsufficientFunds {
                requested: Amount::from_units(4),
                available: Amount::from_units(3),
            })
        );
        assert_eq!(vault.balance(), Amount::from_units(3));
        assert!(vault.payouts().is_empty());
    }

    #[test]
    fn test_receive_accumulates() {
        let mut vault = NativeVault::new();
        vault.receive(&Principal::repeat(1), Amount::from_units(2)).unwrap();
        let balance = vault.receive(&Principal::repeat(2), Amount::from_units(5)).unwrap();
        assert_eq!(balance, Amount::from_units(7));
    }
}
