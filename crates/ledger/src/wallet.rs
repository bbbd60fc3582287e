//! Wallet - one custody instance and its approval state machine
//!
//! Flow per transaction: submit → approve/revoke (any order, any number of
//! times) → execute once the threshold is met. Execution is terminal.
//!
//! Every mutating call takes `&mut self` and either completes fully (state
//! changed, event queued) or fails before touching anything.

use crate::committee::Committee;
use crate::error::LedgerError;
use crate::transaction::{Transaction, TxStatus};
use crate::transfer::AssetTransfer;
use custody_core::{Amount, CustodyEvent, Principal, TxId};
use tracing::{debug, info, warn};

/// One custody instance: committee, transactions and pending notifications
#[derive(Debug, Clone)]
pub struct Wallet {
    committee: Committee,
    transactions: Vec<Transaction>,
    outbox: Vec<CustodyEvent>,
}

impl Wallet {
    /// Create a wallet for a validated committee
    pub fn new(committee: Committee) -> Self {
        Self {
            committee,
            transactions: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Validate the owner list and threshold, then create the wallet
    pub fn with_owners(owners: Vec<Principal>, threshold: usize) -> Result<Self, LedgerError> {
        Ok(Self::new(Committee::new(owners, threshold)?))
    }

    // === Queries ===

    pub fn committee(&self) -> &Committee {
        &self.committee
    }

    pub fn owners(&self) -> &[Principal] {
        self.committee.owners()
    }

    pub fn threshold(&self) -> usize {
        self.committee.threshold()
    }

    pub fn is_owner(&self, principal: &Principal) -> bool {
        self.committee.contains(principal)
    }

    pub fn transaction(&self, tx_id: TxId) -> Result<&Transaction, LedgerError> {
        usize::try_from(tx_id)
            .ok()
            .and_then(|index| self.transactions.get(index))
            .ok_or(LedgerError::UnknownTransaction(tx_id))
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Current approvals for a transaction, recomputed from the owner map
    pub fn approval_count(&self, tx_id: TxId) -> Result<usize, LedgerError> {
        Ok(self.transaction(tx_id)?.approval_count())
    }

    pub fn status(&self, tx_id: TxId) -> Result<TxStatus, LedgerError> {
        Ok(self.transaction(tx_id)?.status(self.threshold()))
    }

    /// Events emitted since the last [`Wallet::take_events`]
    pub fn events(&self) -> &[CustodyEvent] {
        &self.outbox
    }

    /// Drain emitted events in emission order
    pub fn take_events(&mut self) -> Vec<CustodyEvent> {
        std::mem::take(&mut self.outbox)
    }

    // === Operations ===

    /// Pay value into the wallet. Anyone may deposit.
    pub fn deposit<A: AssetTransfer + ?Sized>(
        &mut self,
        sender: Principal,
        amount: Amount,
        assets: &mut A,
    ) -> Result<Amount, LedgerError> {
        let balance = assets
            .receive(&sender, amount)
            .inspect_err(|e| warn!(sender = %sender, error = %e, "deposit rejected"))?;

        debug!(sender = %sender, amount = %amount, balance = %balance, "deposit");
        self.outbox.push(CustodyEvent::Deposited {
            sender,
            amount,
            balance,
        });
        Ok(balance)
    }

    /// Propose an outbound transfer. Returns the new transaction id.
    pub fn submit(
        &mut self,
        recipient: Principal,
        amount: Amount,
        payload: Vec<u8>,
        caller: Principal,
    ) -> Result<TxId, LedgerError> {
        self.ensure_owner(&caller)
            .inspect_err(|e| warn!(error = %e, "submit rejected"))?;

        let tx_id = self.transactions.len() as TxId;
        self.transactions.push(Transaction::new(
            tx_id,
            recipient,
            amount,
            payload.clone(),
            &self.committee,
        ));

        debug!(tx_id, submitter = %caller, recipient = %recipient, amount = %amount, "transaction submitted");
        self.outbox.push(CustodyEvent::Submitted {
            tx_id,
            submitter: caller,
            recipient,
            amount,
            payload,
        });
        Ok(tx_id)
    }

    /// Record the caller's approval
    pub fn approve(&mut self, tx_id: TxId, caller: Principal) -> Result<(), LedgerError> {
        let tx = self
            .open_transaction(tx_id, &caller)
            .and_then(|tx| {
                if tx.is_approved_by(&caller) {
                    Err(LedgerError::AlreadyApproved { tx_id, owner: caller })
                } else {
                    Ok(tx)
                }
            })
            .inspect_err(|e| warn!(tx_id, error = %e, "approve rejected"))?;

        tx.set_approval(caller, true);
        debug!(tx_id, approver = %caller, approvals = tx.approval_count(), "transaction approved");
        self.outbox.push(CustodyEvent::Approved {
            tx_id,
            approver: caller,
        });
        Ok(())
    }

    /// Withdraw the caller's earlier approval
    pub fn revoke(&mut self, tx_id: TxId, caller: Principal) -> Result<(), LedgerError> {
        let tx = self
            .open_transaction(tx_id, &caller)
            .and_then(|tx| {
                if tx.is_approved_by(&caller) {
                    Ok(tx)
                } else {
                    Err(LedgerError::NotApproved { tx_id, owner: caller })
                }
            })
            .inspect_err(|e| warn!(tx_id, error = %e, "revoke rejected"))?;

        tx.set_approval(caller, false);
        debug!(tx_id, revoker = %caller, approvals = tx.approval_count(), "approval revoked");
        self.outbox.push(CustodyEvent::Revoked {
            tx_id,
            revoker: caller,
        });
        Ok(())
    }

    /// Forward an approved transaction to the transfer backend.
    ///
    /// The approval count is recomputed here, so an approval revoked after
    /// quorum was first reached is honored. The backend runs before the
    /// executed flag is set: a refused transfer leaves the transaction open
    /// and retryable, a completed one always ends up marked executed.
    pub fn execute<A: AssetTransfer + ?Sized>(
        &mut self,
        tx_id: TxId,
        caller: Principal,
        assets: &mut A,
    ) -> Result<(), LedgerError> {
        let threshold = self.threshold();
        let tx = self
            .open_transaction(tx_id, &caller)
            .and_then(|tx| {
                let have = tx.approval_count();
                if have < threshold {
                    Err(LedgerError::InsufficientApprovals {
                        tx_id,
                        have,
                        need: threshold,
                    })
                } else {
                    Ok(tx)
                }
            })
            .inspect_err(|e| warn!(tx_id, error = %e, "execute rejected"))?;

        assets
            .transfer(&tx.recipient, tx.amount, &tx.payload)
            .inspect_err(|e| warn!(tx_id, error = %e, "transfer failed"))?;
        tx.executed = true;

        info!(tx_id, executor = %caller, recipient = %tx.recipient, amount = %tx.amount, "transaction executed");
        self.outbox.push(CustodyEvent::Executed {
            tx_id,
            executor: caller,
        });
        Ok(())
    }

    // === Preconditions ===

    fn ensure_owner(&self, caller: &Principal) -> Result<(), LedgerError> {
        if self.committee.contains(caller) {
            Ok(())
        } else {
            Err(LedgerError::NotAnOwner(*caller))
        }
    }

    /// Owner check, existence check and not-executed check, in that order
    fn open_transaction(
        &mut self,
        tx_id: TxId,
        caller: &Principal,
    ) -> Result<&mut Transaction, LedgerError> {
        self.ensure_owner(caller)?;

        let tx = usize::try_from(tx_id)
            .ok()
            .and_then(|index| self.transactions.get_mut(index))
            .ok_or(LedgerError::UnknownTransaction(tx_id))?;

        if tx.executed {
            return Err(LedgerError::AlreadyExecuted(tx_id));
        }
        Ok(tx)
    }
}
