//! Proposed outbound transfers and their approval state

use crate::committee::Committee;
use custody_core::{Amount, Principal, TxId};
use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Lifecycle state of a transaction, derived from its approvals at read time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Fewer approvals than the threshold
    Pending,
    /// Threshold met, executable
    Approved,
    /// Transfer forwarded, terminal
    Executed,
}

/// One proposed outbound transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: TxId,
    pub recipient: Principal,
    pub amount: Amount,
    /// Opaque, forwarded verbatim on execution
    pub payload: Vec<u8>,
    pub executed: bool,
    /// Every committee member has an entry, false until they approve
    approvals: BTreeMap<Principal, bool>,
}

impl Transaction {
    pub(crate) fn new(
        id: TxId,
        recipient: Principal,
        amount: Amount,
        payload: Vec<u8>,
        committee: &Committee,
    ) -> Self {
        let approvals = committee.owners().iter().map(|owner| (*owner, false)).collect();

        Self {
            id,
            recipient,
            amount,
            payload,
            executed: false,
            approvals,
        }
    }

    /// Number of owners currently approving, counted from the map on every call
    pub fn approval_count(&self) -> usize {
        self.approvals.values().filter(|approved| **approved).count()
    }

    pub fn is_approved_by(&self, owner: &Principal) -> bool {
        self.approvals.get(owner).copied().unwrap_or(false)
    }

    /// Owners with a recorded approval, in principal order
    pub fn approvers(&self) -> Vec<Principal> {
        self.approvals
            .iter()
            .filter(|(_, approved)| **approved)
            .map(|(owner, _)| *owner)
            .collect()
    }

    pub fn status(&self, threshold: usize) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else if self.approval_count() >= threshold {
            TxStatus::Approved
        } else {
            TxStatus::Pending
        }
    }

    pub(crate) fn set_approval(&mut self, owner: Principal, approved: bool) {
        self.approvals.insert(owner, approved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn committee() -> Committee {
        Committee::new(
            vec![Principal::repeat(1), Principal::repeat(2), Principal::repeat(3)],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_new_transaction_has_no_approvals() {
        let tx = Transaction::new(0, Principal::repeat(9), Amount::from_units(1), vec![], &committee());
        assert_eq!(tx.approval_count(), 0);
        assert!(!tx.executed);
        assert!(tx.approvers().is_empty());
        assert_eq!(tx.status(2), TxStatus::Pending);
    }

    #[test]
    fn test_count_follows_map() {
        let mut tx = Transaction::new(0, Principal::repeat(9), Amount::from_units(1), vec![], &committee());
        tx.set_approval(Principal::repeat(1), true);
        tx.set_approval(Principal::repeat(3), true);
        assert_eq!(tx.approval_count(), 2);
        assert_eq!(tx.status(2), TxStatus::Approved);

        tx.set_approval(Principal::repeat(3), false);
        assert_eq!(tx.approval_count(), 1);
        assert_eq!(tx.approvers(), vec![Principal::repeat(1)]);
        assert_eq!(tx.status(2), TxStatus::Pending);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(TxStatus::Approved.to_string(), "approved");
        assert_eq!(TxStatus::from_str("executed").unwrap(), TxStatus::Executed);
        assert!(TxStatus::from_str("rejected").is_err());
    }
}
