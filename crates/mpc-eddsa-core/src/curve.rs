//! Edwards curve arithmetic adapter
//!
//! Wraps `curve25519-dalek` behind the small surface the ceremonies need:
//! canonical compressed encode/decode, cofactor clearing, prime-subgroup
//! checks, and the usual group operations. Every point that crosses a trust
//! boundary goes through [`CurvePoint::from_bytes`] followed by
//! [`CurvePoint::clear_cofactor`] before it participates in any arithmetic.

use crate::error::{Error, Result};
use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{Identity, IsIdentity};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of a compressed point encoding
pub const POINT_LEN: usize = 32;

/// The Ed25519 basepoint
pub const GENERATOR: EdwardsPoint = ED25519_BASEPOINT_POINT;

/// A point on the Ed25519 curve.
///
/// Construction from bytes enforces canonical encodings; clearing the
/// cofactor forces the point into the prime-order subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurvePoint(EdwardsPoint);

impl CurvePoint {
    pub fn generator() -> Self {
        Self(GENERATOR)
    }

    pub fn identity() -> Self {
        Self(EdwardsPoint::identity())
    }

    /// `scalar * G`
    pub fn base_mul(scalar: &Scalar) -> Self {
        Self(GENERATOR * scalar)
    }

    /// Decode a canonical compressed point.
    ///
    /// Rejects encodings that fail decompression as well as non-canonical
    /// encodings (bytes that decompress but do not re-compress to the same
    /// value).
    pub fn from_bytes(bytes: &[u8; POINT_LEN]) -> Result<Self> {
        let point = CompressedEdwardsY(*bytes)
            .decompress()
            .ok_or(Error::OffCurve)?;
        if point.compress().as_bytes() != bytes {
            return Err(Error::OffCurve);
        }
        Ok(Self(point))
    }

    /// The canonical compressed encoding
    pub fn to_bytes(&self) -> [u8; POINT_LEN] {
        self.0.compress().to_bytes()
    }

    /// Multiply by the cofactor, then by its inverse modulo the group order.
    ///
    /// Annihilates any small-order component while leaving prime-subgroup
    /// points unchanged, so the result always lies in the prime-order
    /// subgroup.
    pub fn clear_cofactor(&self) -> Self {
        let eight_inv = Scalar::from(8u8).invert();
        Self(self.0.mul_by_cofactor() * eight_inv)
    }

    /// Whether the point lies in the prime-order subgroup
    pub fn is_prime_subgroup(&self) -> bool {
        self.0.is_torsion_free()
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_identity()
    }
}

impl std::ops::Add for CurvePoint {
    type Output = CurvePoint;

    fn add(self, rhs: CurvePoint) -> CurvePoint {
        CurvePoint(self.0 + rhs.0)
    }
}

impl std::ops::Mul<Scalar> for CurvePoint {
    type Output = CurvePoint;

    fn mul(self, rhs: Scalar) -> CurvePoint {
        CurvePoint(self.0 * rhs)
    }
}

impl Serialize for CurvePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for CurvePoint {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        let array: [u8; POINT_LEN] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid point length"))?;
        CurvePoint::from_bytes(&array)
            .map_err(|_| serde::de::Error::custom("invalid curve point"))
    }
}

/// Serde helpers for a single scalar, canonical 32-byte little-endian
pub mod scalar_serde {
    use curve25519_dalek::scalar::Scalar;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        scalar: &Scalar,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(scalar.to_bytes().as_slice())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Scalar, D::Error> {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid scalar length"))?;
        Option::from(Scalar::from_canonical_bytes(array))
            .ok_or_else(|| serde::de::Error::custom("non-canonical scalar"))
    }
}

/// Serde helpers for an ordered list of scalars
pub mod scalar_vec_serde {
    use curve25519_dalek::scalar::Scalar;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        scalars: &[Scalar],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(scalars.iter().map(|scalar| scalar.to_bytes().to_vec()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Scalar>, D::Error> {
        let raw: Vec<Vec<u8>> = Vec::deserialize(deserializer)?;
        raw.into_iter()
            .map(|bytes| {
                let array: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("invalid scalar length"))?;
                Option::from(Scalar::from_canonical_bytes(array))
                    .ok_or_else(|| serde::de::Error::custom("non-canonical scalar"))
            })
            .collect()
    }
}
