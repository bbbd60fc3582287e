//! Identifiers for transactions, instances and committees

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Per-instance transaction sequence id (0-based)
pub type TxId = u64;

/// Errors when parsing identifiers from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("Invalid committee key: {0}")]
    CommitteeKey(String),

    #[error("Invalid instance id: {0}")]
    Instance(String),
}

/// Digest of an ordered committee, used as the registry's dedup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitteeKey([u8; 32]);

impl CommitteeKey {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CommitteeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for CommitteeKey {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("0x");
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| ParseIdError::CommitteeKey(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for CommitteeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CommitteeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Registry-assigned reference to a deployed instance.
///
/// The value is the deployment ordinal, so ids are dense and start at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    pub const fn new(ordinal: u64) -> Self {
        Self(ordinal)
    }

    pub const fn ordinal(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance-{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = ParseIdError;

    /// Accepts both `instance-3` and a bare `3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix("instance-").unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseIdError::Instance(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_committee_key_text_form() {
        let key = CommitteeKey::from_bytes([0x11; 32]);
        let text = key.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 66);
        assert_eq!(text.parse::<CommitteeKey>().unwrap(), key);
        assert!("0x1234".parse::<CommitteeKey>().is_err());
    }

    #[test]
    fn test_instance_id_parse() {
        assert_eq!("instance-7".parse::<InstanceId>().unwrap(), InstanceId::new(7));
        assert_eq!("7".parse::<InstanceId>().unwrap(), InstanceId::new(7));
        assert!("instance-x".parse::<InstanceId>().is_err());
        assert_eq!(InstanceId::new(2).to_string(), "instance-2");
    }
}
