//! Ristretto255 group arithmetic underlying the homomorphic façade.
//!
//! `Scalar` is the exponent field, `GroupElement` the group itself. These
//! are thin wrappers around `curve25519-dalek` so the rest of the crate
//! never has to name that dependency directly.

use std::ops::{Add, Mul, Sub};

use curve25519_dalek::{
    constants::{RISTRETTO_BASEPOINT_POINT, RISTRETTO_BASEPOINT_TABLE},
    ristretto::{CompressedRistretto, RistrettoPoint as Point},
    scalar::Scalar as IScalar,
    traits::Identity,
};
use rand_core::CryptoRngCore;

/// Ristretto255 group scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scalar(IScalar);

/// Ristretto255 group element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupElement(Point);

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar(IScalar::from(value))
    }
}

impl Scalar {
    /// Scalar byte width.
    pub const BYTES_SIZE: usize = 32;

    /// Generate a random scalar value from the random number generator.
    pub fn random<R: CryptoRngCore>(rng: &mut R) -> Self {
        let mut scalar_bytes = [0u8; 64];
        rng.fill_bytes(&mut scalar_bytes);
        Scalar(IScalar::from_bytes_mod_order_wide(&scalar_bytes))
    }

    /// Additive identity.
    pub fn zero() -> Self {
        Scalar(IScalar::ZERO)
    }

    /// Multiplicative identity.
    pub fn one() -> Self {
        Scalar(IScalar::ONE)
    }

    /// Negated value.
    #[must_use]
    pub fn negate(&self) -> Self {
        Scalar(-self.0)
    }

    /// Convert to canonical bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        self.0.to_bytes()
    }

    /// Attempt to decode a scalar from its canonical byte representation.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a canonical scalar encoding.
    pub fn from_bytes(bytes: [u8; Self::BYTES_SIZE]) -> anyhow::Result<Self> {
        Option::from(IScalar::from_canonical_bytes(bytes))
            .map(Scalar)
            .ok_or_else(|| anyhow::anyhow!("cannot decode scalar"))
    }
}

impl GroupElement {
    /// Group generator.
    pub const GENERATOR: GroupElement = GroupElement(RISTRETTO_BASEPOINT_POINT);

    /// Byte width of the compressed encoding.
    pub const BYTES_SIZE: usize = 32;

    /// Group identity element.
    pub fn identity() -> Self {
        GroupElement(Point::identity())
    }

    /// Convert to its compressed byte representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        self.0.compress().to_bytes()
    }

    /// Attempt to decode a group element from a compressed byte representation.
    ///
    /// # Errors
    /// Returns an error if the bytes do not decompress to a valid point.
    pub fn from_bytes(bytes: &[u8; Self::BYTES_SIZE]) -> anyhow::Result<Self> {
        Ok(GroupElement(
            CompressedRistretto::from_slice(bytes)?
                .decompress()
                .ok_or_else(|| anyhow::anyhow!("cannot decode group element"))?,
        ))
    }
}

impl Mul<&Scalar> for &GroupElement {
    type Output = GroupElement;

    fn mul(self, other: &Scalar) -> GroupElement {
        if self.0 == RISTRETTO_BASEPOINT_POINT {
            GroupElement(RISTRETTO_BASEPOINT_TABLE * &other.0)
        } else {
            GroupElement(other.0 * self.0)
        }
    }
}

impl Mul<&Scalar> for &Scalar {
    type Output = Scalar;

    fn mul(self, other: &Scalar) -> Scalar {
        Scalar(self.0 * other.0)
    }
}

impl Add<&GroupElement> for &GroupElement {
    type Output = GroupElement;

    fn add(self, other: &GroupElement) -> GroupElement {
        GroupElement(self.0 + other.0)
    }
}

impl Add<&Scalar> for &Scalar {
    type Output = Scalar;

    fn add(self, other: &Scalar) -> Scalar {
        Scalar(self.0 + other.0)
    }
}

impl Sub<&Scalar> for &Scalar {
    type Output = Scalar;

    fn sub(self, other: &Scalar) -> Scalar {
        Scalar(self.0 - other.0)
    }
}

/// Generates the by-value `std::ops` overloads from a reference-based
/// implementation already in scope, so callers don't have to sprinkle `&`
/// everywhere `Scalar`/`GroupElement` are `Copy`.
macro_rules! std_ops_gen {
    ($class:ident, $f:ident, $rty:ident, $lty:ident, $out:ident) => {
        impl $class<$rty> for &$lty {
            type Output = $out;

            fn $f(self, other: $rty) -> Self::Output {
                self.$f(&other)
            }
        }

        impl $class<&$rty> for $lty {
            type Output = $out;

            fn $f(self, other: &$rty) -> Self::Output {
                (&self).$f(other)
            }
        }

        impl $class<$rty> for $lty {
            type Output = $out;

            fn $f(self, other: $rty) -> Self::Output {
                (&self).$f(&other)
            }
        }
    };
}

std_ops_gen!(Mul, mul, Scalar, GroupElement, GroupElement);
std_ops_gen!(Mul, mul, Scalar, Scalar, Scalar);
std_ops_gen!(Add, add, GroupElement, GroupElement, GroupElement);
std_ops_gen!(Add, add, Scalar, Scalar, Scalar);
std_ops_gen!(Sub, sub, Scalar, Scalar, Scalar);
