//! Committee - the fixed owner set of one wallet

use crate::error::CommitteeError;
use custody_core::Principal;
use serde::Serialize;
use std::collections::HashSet;

/// Immutable ordered owner list plus quorum threshold.
///
/// # Invariants
/// - at least one owner, no duplicates
/// - `1 <= threshold <= owners.len()`
/// - never changes after construction (no add/remove owner exists)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committee {
    owners: Vec<Principal>,
    threshold: usize,
}

impl Committee {
    /// Validate and build a committee.
    ///
    /// Owner order is preserved exactly as supplied.
    pub fn new(owners: Vec<Principal>, threshold: usize) -> Result<Self, CommitteeError> {
        if owners.is_empty() {
            return Err(CommitteeError::Empty);
        }

        if threshold == 0 || threshold > owners.len() {
            return Err(CommitteeError::InvalidThreshold {
                threshold,
                owners: owners.len(),
            });
        }

        let mut seen = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if !seen.insert(owner) {
                return Err(CommitteeError::DuplicateOwner(*owner));
            }
        }

        Ok(Self { owners, threshold })
    }

    /// Like [`Committee::new`], also rejecting committees above `max` owners
    pub fn with_limit(
        owners: Vec<Principal>,
        threshold: usize,
        max: usize,
    ) -> Result<Self, CommitteeError> {
        if owners.len() > max {
            return Err(CommitteeError::TooLarge {
                owners: owners.len(),
                max,
            });
        }
        Self::new(owners, threshold)
    }

    pub fn owners(&self) -> &[Principal] {
        &self.owners
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Always false for a constructed committee
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn contains(&self, principal: &Principal) -> bool {
        self.owners.contains(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners(n: u8) -> Vec<Principal> {
        (1..=n).map(Principal::repeat).collect()
    }

    #[test]
    fn test_valid_committee_keeps_order() {
        let list = vec![Principal::repeat(3), Principal::repeat(1), Principal::repeat(2)];
        let committee = Committee::new(list.clone(), 2).unwrap();
        assert_eq!(committee.owners(), list.as_slice());
        assert_eq!(committee.threshold(), 2);
        assert_eq!(committee.len(), 3);
        assert!(committee.contains(&Principal::repeat(1)));
        assert!(!committee.contains(&Principal::repeat(9)));
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(Committee::new(owners(3), 1).is_ok());
        assert!(Committee::new(owners(3), 3).is_ok());
        assert_eq!(
            Committee::new(owners(3), 0),
            Err(CommitteeError::InvalidThreshold { threshold: 0, owners: 3 })
        );
        assert_eq!(
            Committee::new(owners(3), 4),
            Err(CommitteeError::InvalidThreshold { threshold: 4, owners: 3 })
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Committee::new(Vec::new(), 1), Err(CommitteeError::Empty));
    }

    #[test]
    fn test_duplicate_rejected() {
        let list = vec![Principal::repeat(1), Principal::repeat(2), Principal::repeat(1)];
        assert_eq!(
            Committee::new(list, 2),
            Err(CommitteeError::DuplicateOwner(Principal::repeat(1)))
        );
    }

    #[test]
    fn test_size_limit() {
        assert_eq!(
            Committee::with_limit(owners(5), 2, 4),
            Err(CommitteeError::TooLarge { owners: 5, max: 4 })
        );
        assert!(Committee::with_limit(owners(4), 2, 4).is_ok());
    }
}
