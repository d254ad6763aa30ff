//! Salted hash commitments over ordered lists of 32-byte elements
//!
//! Binding and hiding under the random-oracle assumption on Keccak-256. The
//! order and count of the committed parts are part of the binding: reordering
//! the parts yields a different commitment.

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

const DOMAIN: &[u8] = b"mpc-eddsa-core/hash-commitment/v1";

/// Length of a commitment digest
pub const COMMITMENT_LEN: usize = 32;

/// The public commitment digest
pub type Commitment = [u8; COMMITMENT_LEN];

/// The opening of a hash commitment: the blind plus the committed parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decommitment {
    blind: [u8; 32],
    parts: Vec<[u8; 32]>,
}

/// A freshly produced commitment together with its opening
#[derive(Debug, Clone)]
pub struct HashCommitDecommit {
    pub commitment: Commitment,
    pub decommitment: Decommitment,
}

/// Commit to `parts` under a random blind
pub fn commit<R: RngCore + CryptoRng>(rng: &mut R, parts: Vec<[u8; 32]>) -> HashCommitDecommit {
    let mut blind = [0u8; 32];
    rng.fill_bytes(&mut blind);
    let decommitment = Decommitment { blind, parts };
    HashCommitDecommit {
        commitment: decommitment.hash(),
        decommitment,
    }
}

impl Decommitment {
    fn hash(&self) -> Commitment {
        let mut keccak = Keccak::v256();
        keccak.update(DOMAIN);
        keccak.update(&self.blind);
        keccak.update(&(self.parts.len() as u64).to_le_bytes());
        for part in &self.parts {
            keccak.update(part);
        }
        let mut digest = [0u8; COMMITMENT_LEN];
        keccak.finalize(&mut digest);
        digest
    }

    /// Open against a previously received commitment.
    ///
    /// Returns the committed parts when the digest matches; `None` on any
    /// mismatch, in which case callers must treat the sender as the culprit.
    pub fn open(&self, commitment: &Commitment) -> Option<&[[u8; 32]]> {
        if &self.hash() == commitment {
            Some(&self.parts)
        } else {
            None
        }
    }
}
