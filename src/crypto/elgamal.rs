//! Lifted `ElGamal` encryption over the Ristretto255 group.
//!
//! "Lifted" means the message is encoded as `m * GENERATOR` rather than
//! directly as a group element, which is what makes the scheme additively
//! homomorphic on ciphertexts: `Enc(m1) + Enc(m2)` decrypts (via discrete
//! log) to `m1 + m2`.

use std::ops::{Add, Mul};

use rand_core::CryptoRngCore;

use super::group::{GroupElement, Scalar};

/// `ElGamal` secret key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretKey(pub(crate) Scalar);

/// `ElGamal` public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub(crate) GroupElement);

/// `ElGamal` ciphertext: a pair of group elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ciphertext(GroupElement, GroupElement);

impl SecretKey {
    /// Generate a random secret key.
    pub fn random<R: CryptoRngCore>(rng: &mut R) -> Self {
        Self(Scalar::random(rng))
    }

    /// Derive the corresponding public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(&GroupElement::GENERATOR * &self.0)
    }

    /// Byte width of the secret key encoding.
    pub const BYTES_SIZE: usize = Scalar::BYTES_SIZE;

    /// Convert to canonical bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        self.0.to_bytes()
    }

    /// Decode from canonical bytes.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a canonical scalar encoding.
    pub fn from_bytes(bytes: [u8; Self::BYTES_SIZE]) -> anyhow::Result<Self> {
        Ok(Self(Scalar::from_bytes(bytes)?))
    }
}

impl PublicKey {
    /// Byte width of the public key encoding.
    pub const BYTES_SIZE: usize = GroupElement::BYTES_SIZE;

    /// Convert to canonical bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        self.0.to_bytes()
    }

    /// Decode from canonical bytes.
    ///
    /// # Errors
    /// Returns an error if the bytes do not decode to a valid group element.
    pub fn from_bytes(bytes: &[u8; Self::BYTES_SIZE]) -> anyhow::Result<Self> {
        Ok(Self(GroupElement::from_bytes(bytes)?))
    }
}

impl Ciphertext {
    /// The encryption of zero with zero randomness; the identity for [`Ciphertext::add`].
    #[must_use]
    pub fn zero() -> Self {
        Ciphertext(GroupElement::identity(), GroupElement::identity())
    }

    /// Byte width of the ciphertext encoding (two compressed group elements).
    pub const BYTES_SIZE: usize = GroupElement::BYTES_SIZE * 2;

    /// Homomorphically add two ciphertexts: `decrypt(a + b) == decrypt(a) + decrypt(b)`.
    #[must_use]
    pub fn add(&self, other: &Ciphertext) -> Ciphertext {
        Ciphertext(&self.0 + &other.0, &self.1 + &other.1)
    }

    /// Scale a ciphertext's underlying plaintext by a public scalar, used by
    /// weighted tallying to fold a voter's weight into their ballot.
    #[must_use]
    pub fn mul_scalar(&self, scalar: &Scalar) -> Ciphertext {
        Ciphertext(&self.0 * scalar, &self.1 * scalar)
    }

    /// Convert to canonical bytes: the two compressed group elements concatenated.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        let mut bytes = [0u8; Self::BYTES_SIZE];
        bytes[..GroupElement::BYTES_SIZE].copy_from_slice(&self.0.to_bytes());
        bytes[GroupElement::BYTES_SIZE..].copy_from_slice(&self.1.to_bytes());
        bytes
    }

    /// Decode from canonical bytes.
    ///
    /// # Errors
    /// Returns an error if either half fails to decode to a group element.
    pub fn from_bytes(bytes: &[u8; Self::BYTES_SIZE]) -> anyhow::Result<Self> {
        let mut e1 = [0u8; GroupElement::BYTES_SIZE];
        let mut e2 = [0u8; GroupElement::BYTES_SIZE];
        e1.copy_from_slice(&bytes[..GroupElement::BYTES_SIZE]);
        e2.copy_from_slice(&bytes[GroupElement::BYTES_SIZE..]);
        Ok(Ciphertext(
            GroupElement::from_bytes(&e1)?,
            GroupElement::from_bytes(&e2)?,
        ))
    }
}

/// Encrypt a non-negative integer message under `public_key` using `randomness`.
///
/// Two encryptions of the same message differ with overwhelming probability
/// because `randomness` is (expected to be) freshly sampled per call.
pub fn encrypt(message: &Scalar, public_key: &PublicKey, randomness: &Scalar) -> Ciphertext {
    let e1 = &GroupElement::GENERATOR * randomness;
    let e2 = &(&GroupElement::GENERATOR * message) + &(&public_key.0 * randomness);
    Ciphertext(e1, e2)
}

/// Decrypt a ciphertext to the underlying message's group-element encoding
/// (`m * GENERATOR`); callers recover `m` itself via a bounded discrete-log
/// search (see `crate::crypto::babystep`).
#[must_use]
pub fn decrypt(cipher: &Ciphertext, secret_key: &SecretKey) -> GroupElement {
    &cipher.1 + &(&cipher.0 * &secret_key.0.negate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::rng::default_rng;

    #[test]
    fn encrypt_decrypt_roundtrip_via_discrete_log() {
        use crate::crypto::babystep::BabyStepGiantStep;

        let mut rng = default_rng();
        let sk = SecretKey::random(&mut rng);
        let pk = sk.public_key();

        let message = Scalar::from(7u64);
        let randomness = Scalar::random(&mut rng);
        let cipher = encrypt(&message, &pk, &randomness);

        let decrypted_point = decrypt(&cipher, &sk);
        let solver = BabyStepGiantStep::new(100, None).unwrap();
        assert_eq!(solver.discrete_log(decrypted_point).unwrap(), 7);
    }

    #[test]
    fn additive_homomorphism_holds() {
        use crate::crypto::babystep::BabyStepGiantStep;

        let mut rng = default_rng();
        let sk = SecretKey::random(&mut rng);
        let pk = sk.public_key();

        let c1 = encrypt(&Scalar::from(3u64), &pk, &Scalar::random(&mut rng));
        let c2 = encrypt(&Scalar::from(4u64), &pk, &Scalar::random(&mut rng));
        let sum = c1.add(&c2);

        let solver = BabyStepGiantStep::new(100, None).unwrap();
        let decrypted = solver.discrete_log(decrypt(&sum, &sk)).unwrap();
        assert_eq!(decrypted, 7);
    }

    #[test]
    fn repeated_encryptions_differ() {
        let mut rng = default_rng();
        let sk = SecretKey::random(&mut rng);
        let pk = sk.public_key();
        let message = Scalar::from(1u64);

        let c1 = encrypt(&message, &pk, &Scalar::random(&mut rng));
        let c2 = encrypt(&message, &pk, &Scalar::random(&mut rng));
        assert_ne!(c1, c2);
    }

    #[test]
    fn keys_roundtrip_through_bytes() {
        let mut rng = default_rng();
        let sk = SecretKey::random(&mut rng);
        let sk2 = SecretKey::from_bytes(sk.to_bytes()).unwrap();
        assert_eq!(sk, sk2);

        let pk = sk.public_key();
        let pk2 = PublicKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(pk, pk2);
    }
}
