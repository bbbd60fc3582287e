//! Committee key derivation

use custody_core::{CommitteeKey, Principal};
use sha2::{Digest, Sha256};

/// SHA256 of the owners' raw bytes concatenated in the order given.
///
/// The order is part of the key: `[A, B, C]` and `[B, A, C]` produce
/// different keys and therefore register as different committees.
pub fn committee_key(owners: &[Principal]) -> CommitteeKey {
    let mut hasher = Sha256::new();
    for owner in owners {
        hasher.update(owner.as_bytes());
    }
    CommitteeKey::from_bytes(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_digest_of_concatenation() {
        let owners = [Principal::repeat(1), Principal::repeat(2)];

        let mut concatenated = Vec::new();
        concatenated.extend_from_slice(&[1u8; 20]);
        concatenated.extend_from_slice(&[2u8; 20]);
        let expected: [u8; 32] = Sha256::digest(&concatenated).into();

        assert_eq!(committee_key(&owners), CommitteeKey::from_bytes(expected));
    }

    #[test]
    fn test_key_deterministic() {
        let owners = [Principal::repeat(1), Principal::repeat(2), Principal::repeat(3)];
        assert_eq!(committee_key(&owners), committee_key(&owners));
    }

    #[test]
    fn test_key_depends_on_order() {
        let abc = [Principal::repeat(1), Principal::repeat(2), Principal::repeat(3)];
        let bac = [Principal::repeat(2), Principal::repeat(1), Principal::repeat(3)];
        assert_ne!(committee_key(&abc), committee_key(&bac));
    }
}
