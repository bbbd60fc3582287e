//! Journal record - one emitted event with its position in the journal

use chrono::{DateTime, Utc};
use custody_core::{CustodyEvent, InstanceId};
use serde::{Deserialize, Serialize};

/// A committed custody event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Position in the journal, starting at 1
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    /// Groups the events produced by one command
    pub correlation_id: String,
    /// Wallet that emitted the event; `Deployed` carries its own instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<InstanceId>,
    pub event: CustodyEvent,
}

impl JournalRecord {
    /// Instance the record concerns, whether emitted by it or deploying it
    pub fn instance_id(&self) -> Option<InstanceId> {
        match &self.event {
            CustodyEvent::Deployed { instance, .. } => Some(*instance),
            _ => self.instance,
        }
    }
}
