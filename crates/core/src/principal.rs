//! Principal - stable participant identifier
//!
//! Principals are 20-byte identifiers written as `0x` followed by 40 hex
//! digits. Caller identity is authenticated by the host before it reaches
//! this crate; a `Principal` is just the identity it settled on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors when parsing a principal from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsePrincipalError {
    #[error("Principal must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("Principal must be {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex in principal: {0}")]
    InvalidHex(String),
}

/// A 20-byte participant identifier (owner, depositor, recipient, caller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal([u8; Principal::LEN]);

impl Principal {
    /// Byte length of a principal
    pub const LEN: usize = 20;

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Deterministic principal filled with a single byte.
    ///
    /// Handy for fixtures: `Principal::repeat(0xa1)` prints as `0xa1a1...`.
    pub const fn repeat(byte: u8) -> Self {
        Self([byte; Self::LEN])
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Principal {
    type Err = ParsePrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ParsePrincipalError::MissingPrefix(s.to_string()))?;

        if digits.len() != Self::LEN * 2 {
            return Err(ParsePrincipalError::InvalidLength {
                expected: Self::LEN * 2,
                actual: digits.len(),
            });
        }

        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| ParsePrincipalError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let p = Principal::repeat(0xab);
        let text = p.to_string();
        assert_eq!(text, format!("0x{}", "ab".repeat(20)));
        assert_eq!(text.parse::<Principal>().unwrap(), p);
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let text = format!("0X{}", "AB".repeat(20));
        assert_eq!(text.parse::<Principal>().unwrap(), Principal::repeat(0xab));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "abcd".parse::<Principal>(),
            Err(ParsePrincipalError::MissingPrefix(_))
        ));
        assert!(matches!(
            "0xabcd".parse::<Principal>(),
            Err(ParsePrincipalError::InvalidLength { expected: 40, actual: 4 })
        ));
        let bad = format!("0x{}", "zz".repeat(20));
        assert!(matches!(
            bad.parse::<Principal>(),
            Err(ParsePrincipalError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let p = Principal::repeat(0x01);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(20)));
        let parsed: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }
}
