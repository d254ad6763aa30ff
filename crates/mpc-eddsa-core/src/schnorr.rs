//! Non-interactive Schnorr proofs of discrete-log knowledge
//!
//! Binds a prover-chosen nonce commitment, the public point, and a challenge
//! derived by hashing a fixed transcript. The transcript layout is identical
//! for every party; a prover that deviates produces a proof nobody accepts.

use crate::curve::{scalar_serde, CurvePoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

const DOMAIN: &[u8] = b"mpc-eddsa-core/schnorr-pok/v1";

/// Proof of knowledge of `x` such that `x * G == public`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchnorrProof {
    /// Nonce commitment `v * G`
    pub commitment: CurvePoint,
    /// Response `v + c * x`
    #[serde(with = "scalar_serde")]
    pub response: Scalar,
}

/// Prove knowledge of the discrete log of `public`
pub fn prove<R: RngCore + CryptoRng>(
    rng: &mut R,
    witness: &Scalar,
    public: &CurvePoint,
) -> SchnorrProof {
    let nonce = Zeroizing::new(Scalar::random(rng));
    let commitment = CurvePoint::base_mul(&nonce);
    let challenge = challenge(&commitment, public);
    let response = *nonce + challenge * witness;
    SchnorrProof { commitment, response }
}

impl SchnorrProof {
    /// True iff the proof witnesses knowledge of the discrete log of `public`
    pub fn verify(&self, public: &CurvePoint) -> bool {
        let challenge = challenge(&self.commitment, public);
        CurvePoint::base_mul(&self.response) == self.commitment + *public * challenge
    }
}

fn challenge(commitment: &CurvePoint, public: &CurvePoint) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(DOMAIN);
    hasher.update(CurvePoint::generator().to_bytes());
    hasher.update(commitment.to_bytes());
    hasher.update(public.to_bytes());
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_mod_order_wide(&wide)
}
