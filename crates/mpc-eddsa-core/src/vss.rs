//! Feldman verifiable secret sharing over the Ed25519 group
//!
//! A secret scalar is split into n evaluations of a random degree-t
//! polynomial; the coefficients are published as commitment points so every
//! recipient can check its share independently. Any t+1 shares reconstruct
//! the secret; t or fewer reveal nothing.

use crate::curve::CurvePoint;
use crate::error::{Error, Result};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret sharing polynomial, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Polynomial {
    coeffs: Vec<Scalar>,
}

impl Polynomial {
    /// Sample a degree-`degree` polynomial with the given constant term
    fn sample<R: RngCore + CryptoRng>(rng: &mut R, degree: usize, constant: Scalar) -> Self {
        let mut coeffs = Vec::with_capacity(degree + 1);
        coeffs.push(constant);
        for _ in 0..degree {
            coeffs.push(Scalar::random(rng));
        }
        Self { coeffs }
    }

    /// Horner evaluation from the highest coefficient down
    fn evaluate(&self, at: &Scalar) -> Scalar {
        let mut acc = Scalar::ZERO;
        for coeff in self.coeffs.iter().rev() {
            acc = acc * at + coeff;
        }
        acc
    }

    fn commitments(&self) -> Vec<CurvePoint> {
        self.coeffs.iter().map(CurvePoint::base_mul).collect()
    }
}

/// One party's share of a dealt secret
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    /// Evaluation point (the recipient's key scalar)
    #[zeroize(skip)]
    pub id: Scalar,
    /// Polynomial evaluation at `id`
    pub value: Scalar,
}

/// Deal a secret to the parties identified by `ids`.
///
/// Returns the commitment vector (t+1 points, constant term first) and one
/// share per evaluation point, in the order of `ids`. Fails when fewer than
/// t+1 evaluation points are supplied, which would make the sharing
/// unreconstructible.
pub fn create<R: RngCore + CryptoRng>(
    rng: &mut R,
    threshold: usize,
    secret: &Scalar,
    ids: &[Scalar],
) -> Result<(Vec<CurvePoint>, Vec<Share>)> {
    if ids.len() < threshold + 1 {
        return Err(Error::InsufficientKeys {
            required: threshold + 1,
            available: ids.len(),
        });
    }
    let poly = Polynomial::sample(rng, threshold, *secret);
    let commitments = poly.commitments();
    let shares = ids
        .iter()
        .map(|id| Share { id: *id, value: poly.evaluate(id) })
        .collect();
    Ok((commitments, shares))
}

/// Verify a share against a dealer's commitment vector.
///
/// True iff `value * G` equals the commitment polynomial evaluated at `id`,
/// computed Horner-style from the highest commitment index down. Also false
/// when the commitment vector does not have exactly t+1 entries.
pub fn verify_share(threshold: usize, commitments: &[CurvePoint], share: &Share) -> bool {
    if commitments.len() != threshold + 1 {
        return false;
    }
    let mut acc = commitments[threshold];
    for c in (0..threshold).rev() {
        acc = acc * share.id + commitments[c];
    }
    CurvePoint::base_mul(&share.value) == acc
}
