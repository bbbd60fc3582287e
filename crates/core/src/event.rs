//! Notifications emitted by wallets and the registry
//!
//! Callers (UIs, monitoring, the journal) rebuild custody state by replaying
//! these in emission order, so every event carries what replay needs.

use crate::{Amount, CommitteeKey, InstanceId, Principal, TxId};
use serde::{Deserialize, Serialize};

/// Events emitted by custody operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustodyEvent {
    /// Value was paid into an instance
    Deposited {
        sender: Principal,
        amount: Amount,
        /// Instance balance after the deposit
        balance: Amount,
    },

    /// An owner proposed an outbound transfer
    Submitted {
        tx_id: TxId,
        submitter: Principal,
        recipient: Principal,
        amount: Amount,
        #[serde(with = "payload_hex")]
        payload: Vec<u8>,
    },

    Approved { tx_id: TxId, approver: Principal },

    Revoked { tx_id: TxId, revoker: Principal },

    /// The transfer was forwarded and the transaction is terminal
    Executed { tx_id: TxId, executor: Principal },

    /// The registry created a new instance
    Deployed {
        committee_key: CommitteeKey,
        instance: InstanceId,
        deployer: Principal,
        owners: Vec<Principal>,
        threshold: usize,
    },
}

impl CustodyEvent {
    /// Short event name for logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            CustodyEvent::Deposited { .. } => "deposited",
            CustodyEvent::Submitted { .. } => "submitted",
            CustodyEvent::Approved { .. } => "approved",
            CustodyEvent::Revoked { .. } => "revoked",
            CustodyEvent::Executed { .. } => "executed",
            CustodyEvent::Deployed { .. } => "deployed",
        }
    }

    /// Transaction the event refers to, if any
    pub fn tx_id(&self) -> Option<TxId> {
        match self {
            CustodyEvent::Submitted { tx_id, .. }
            | CustodyEvent::Approved { tx_id, .. }
            | CustodyEvent::Revoked { tx_id, .. }
            | CustodyEvent::Executed { tx_id, .. } => Some(*tx_id),
            CustodyEvent::Deposited { .. } | CustodyEvent::Deployed { .. } => None,
        }
    }
}

/// Opaque payload bytes are stored as a hex string
mod payload_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_payload_is_hex() {
        let event = CustodyEvent::Submitted {
            tx_id: 0,
            submitter: Principal::repeat(1),
            recipient: Principal::repeat(2),
            amount: Amount::from_units(1),
            payload: b"send 1 eth for nft".to_vec(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"submitted\""));
        assert!(json.contains(&hex::encode(b"send 1 eth for nft")));

        let parsed: CustodyEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_kind_and_tx_id() {
        let approved = CustodyEvent::Approved {
            tx_id: 4,
            approver: Principal::repeat(1),
        };
        assert_eq!(approved.kind(), "approved");
        assert_eq!(approved.tx_id(), Some(4));

        let deposited = CustodyEvent::Deposited {
            sender: Principal::repeat(1),
            amount: Amount::ZERO,
            balance: Amount::ZERO,
        };
        assert_eq!(deposited.tx_id(), None);
    }
}
