//! Property tests for the hash commitment module

use mpc_eddsa_core::commitments;
use proptest::prelude::*;
use rand::rngs::OsRng;

proptest! {
    /// An untouched decommitment always opens its own commitment
    #[test]
    fn prop_commitment_opens(parts in prop::collection::vec(any::<[u8; 32]>(), 1..6)) {
        let bundle = commitments::commit(&mut OsRng, parts.clone());
        let opened = bundle.decommitment.open(&bundle.commitment);
        prop_assert_eq!(opened, Some(parts.as_slice()));
    }

    /// Any single altered byte in the commitment digest is detected
    #[test]
    fn prop_altered_digest_rejected(
        parts in prop::collection::vec(any::<[u8; 32]>(), 1..6),
        position in 0usize..32,
        mask in 1u8..=255,
    ) {
        let bundle = commitments::commit(&mut OsRng, parts);
        let mut digest = bundle.commitment;
        digest[position] ^= mask;
        prop_assert!(bundle.decommitment.open(&digest).is_none());
    }

    /// Two commitments to the same parts never collide (fresh blinds)
    #[test]
    fn prop_blinding_hides(parts in prop::collection::vec(any::<[u8; 32]>(), 1..4)) {
        let first = commitments::commit(&mut OsRng, parts.clone());
        let second = commitments::commit(&mut OsRng, parts);
        prop_assert_ne!(first.commitment, second.commitment);
    }
}
