//! Lagrange interpolation weights and share projection
//!
//! The signing protocol consumes additive shares of the group secret; a
//! Shamir share becomes additive once it is weighted by its Lagrange
//! coefficient at zero over the active key set. Resharing uses the same
//! projection to re-deal the group secret toward a new committee.

use crate::error::{Error, Result};
use curve25519_dalek::scalar::Scalar;

/// The Lagrange basis polynomial for `keys[index]`, evaluated at zero.
///
/// `keys` is the ordered list of evaluation points of the active parties.
/// Duplicate evaluation points make the denominator vanish and surface as an
/// internal arithmetic error rather than a bogus coefficient.
pub fn lagrange_coefficient(index: usize, keys: &[Scalar]) -> Result<Scalar> {
    let k_i = keys
        .get(index)
        .ok_or(Error::UnknownSender(index))?;
    let mut num = Scalar::ONE;
    let mut den = Scalar::ONE;
    for (j, k_j) in keys.iter().enumerate() {
        if j == index {
            continue;
        }
        num *= k_j;
        den *= k_j - k_i;
    }
    if den == Scalar::ZERO {
        return Err(Error::InternalArithmetic(
            "duplicate evaluation points in the active key set".into(),
        ));
    }
    Ok(num * den.invert())
}

/// Project a Shamir share into its additive form over the active key set.
///
/// Summing `w_i` over any t+1 active parties recovers the group secret.
pub fn prepare_for_signing(index: usize, keys: &[Scalar], x_i: &Scalar) -> Result<Scalar> {
    Ok(lagrange_coefficient(index, keys)? * x_i)
}
