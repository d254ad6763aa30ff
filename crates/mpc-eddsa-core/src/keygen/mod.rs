//! Distributed key generation for threshold Ed25519
//!
//! The ceremony runs in three rounds:
//! - **Round 1**: each party samples a secret, deals it with Feldman VSS over
//!   the committee's key scalars, and broadcasts a hash commitment to its
//!   commitment polynomial.
//! - **Round 2**: each party sends every peer its share point-to-point, then
//!   broadcasts the decommitment together with a Schnorr proof of knowledge
//!   of its secret.
//! - **Round 3**: each party opens and checks every peer's commitment,
//!   subgroup-clears the revealed points, verifies the Schnorr proof and its
//!   own share, aggregates the commitment polynomials, and emits the save
//!   record: its secret share, every party's public share point, and the
//!   group public key.
//!
//! Rounds are driven by [`KeygenParty`]; inbound messages may arrive in any
//! order and are buffered per sender until the round that consumes them.

mod messages;
mod party;
mod rounds;

pub use messages::{CommitMessage, DecommitMessage, KeygenMessage, ShareMessage};
pub use party::KeygenParty;

use crate::curve::{scalar_serde, scalar_vec_serde, CurvePoint};
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Terminal output of a keygen ceremony.
///
/// The schema is stable: downstream signing consumes it byte-for-byte.
/// Scalars are canonical 32-byte encodings; points are compressed and lie in
/// the prime-order subgroup. The secret share is wiped when the record is
/// dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeygenSave {
    /// This party's secret share of the group key
    #[serde(with = "scalar_serde")]
    pub x_i: Scalar,

    /// Public share point of every party, indexed by committee position
    #[zeroize(skip)]
    pub big_x: Vec<CurvePoint>,

    /// The group public key
    #[zeroize(skip)]
    pub public_key: CurvePoint,

    /// The ordered key scalars of the committee
    #[zeroize(skip)]
    #[serde(with = "scalar_vec_serde")]
    pub ks: Vec<Scalar>,
}

impl std::fmt::Debug for KeygenSave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeygenSave")
            .field("x_i", &"[REDACTED]")
            .field("public_key", &hex::encode(self.public_key.to_bytes()))
            .field("parties", &self.ks.len())
            .finish()
    }
}
