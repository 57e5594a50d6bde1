//! `Ed25519` signing, the reference implementation of the `Member`
//! signing capability: optional voting publicKey/privateKey,
//! sign(bytes)→sig, verify(sig,bytes)→bool.
//!
//! The engine never requires this specific scheme — callers may back
//! `Member` with any signing mechanism — but it is what `PollFactory`
//! and the test suite use by default.

use ed25519_dalek::{ed25519::signature::Signer, Signature as Ed25519Signature, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;

use super::rng::default_rng;

/// `Ed25519` private key.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

/// `Ed25519` public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

/// `Ed25519` signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(Ed25519Signature);

impl PrivateKey {
    /// Byte width of the private key encoding.
    pub const BYTES_SIZE: usize = ed25519_dalek::SECRET_KEY_LENGTH;

    /// Randomly generate a private key.
    pub fn random<R: CryptoRngCore>(rng: &mut R) -> Self {
        Self(SigningKey::generate(rng))
    }

    /// Randomly generate a private key using the crate's default RNG.
    #[must_use]
    pub fn random_with_default_rng() -> Self {
        Self::random(&mut default_rng())
    }

    /// Derive the matching public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Sign an arbitrary message.
    #[must_use]
    pub fn sign(&self, msg: &[u8]) -> Signature {
        Signature(self.0.sign(msg))
    }
}

impl PublicKey {
    /// Byte width of the public key encoding.
    pub const BYTES_SIZE: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;

    /// Verify a signature over `msg`.
    #[must_use]
    pub fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        use ed25519_dalek::Verifier;
        self.0.verify_strict(msg, &sig.0).is_ok()
    }

    /// Convert to canonical bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        self.0.to_bytes()
    }
}

impl Signature {
    /// Byte width of the signature encoding.
    pub const BYTES_SIZE: usize = ed25519_dalek::SIGNATURE_LENGTH;

    /// Convert to canonical bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        self.0.to_bytes()
    }

    /// Decode from canonical bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::BYTES_SIZE]) -> Self {
        Self(Ed25519Signature::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let sk = PrivateKey::random_with_default_rng();
        let pk = sk.public_key();
        let msg = b"vote-receipt-bytes";

        let sig = sk.sign(msg);
        assert!(pk.verify(msg, &sig));
    }

    #[test]
    fn tampered_message_fails_verification() {
        let sk = PrivateKey::random_with_default_rng();
        let pk = sk.public_key();

        let sig = sk.sign(b"original message");
        assert!(!pk.verify(b"tampered message", &sig));
    }
}
