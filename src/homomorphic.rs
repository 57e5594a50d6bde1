//! C1 — Homomorphic primitives façade.
//!
//! Abstracts an additively-homomorphic public-key scheme behind three
//! operations: [`encrypt`], [`add`], [`decrypt`]. For all non-negative
//! `m1`, `m2`: `decrypt(add(encrypt(m1), encrypt(m2))) == m1 + m2`, and
//! two encryptions of the same plaintext differ with overwhelming
//! probability.
//!
//! The reference implementation realizes this contract with lifted
//! `ElGamal` over Ristretto255 (`crate::crypto::elgamal`), decrypting via
//! a bounded baby-step giant-step discrete-log search
//! (`crate::crypto::babystep`). Key *generation* is explicitly out of
//! scope — production deployments are expected to
//! source `(PublicKey, PrivateKey)` from an external Guardian
//! threshold-sharing ceremony. [`generate_keypair`] exists only as the
//! oracle this crate's own tests and examples use in its place.

use rand_core::CryptoRngCore;

use crate::crypto::{
    babystep::BabyStepGiantStep,
    elgamal,
    group::Scalar,
    rng::default_rng,
};

/// Public key under which ballots are encrypted. Polls hold only this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub(crate) elgamal::PublicKey);

/// Private key under which aggregates are decrypted. Never held by a poll
/// — only by the tallier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey(pub(crate) elgamal::SecretKey);

/// An opaque ciphertext. Supports homomorphic addition and, given the
/// matching [`PrivateKey`], decryption to a non-negative integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ciphertext(pub(crate) elgamal::Ciphertext);

impl Ciphertext {
    /// Byte width of the canonical encoding used on the wire (two
    /// compressed Ristretto255 points). An abstract Paillier-like scheme
    /// would encode a ciphertext as a single bigint; this engine's
    /// concrete realization is lifted `ElGamal`, whose ciphertexts are a
    /// *pair* of group elements, so `crate::bulletin_board`'s wire format
    /// writes a `u64` ciphertext *count* once per entry and then each
    /// ciphertext back-to-back at this fixed width, rather than
    /// length-prefixing every individual ciphertext.
    pub const BYTES_SIZE: usize = elgamal::Ciphertext::BYTES_SIZE;

    /// The encryption of zero with zero randomness — the identity for
    /// [`add`], used by the hierarchical aggregator to seed a running sum.
    #[must_use]
    pub fn zero() -> Self {
        Ciphertext(elgamal::Ciphertext::zero())
    }

    /// Canonical byte encoding, used by the bulletin board's wire format
    /// and by `votesHash`/`decryptionProof` commitments.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::BYTES_SIZE] {
        self.0.to_bytes()
    }

    /// Decode from canonical bytes.
    ///
    /// # Errors
    /// Returns an error if the bytes do not decode to two valid group elements.
    pub fn from_bytes(bytes: &[u8; Self::BYTES_SIZE]) -> anyhow::Result<Self> {
        Ok(Ciphertext(elgamal::Ciphertext::from_bytes(bytes)?))
    }
}

/// A freshly generated `(PublicKey, PrivateKey)` pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// The public half, safe to embed in a `Poll`.
    pub public_key: PublicKey,
    /// The private half; the caller is responsible for keeping this out of
    /// the poll's reach entirely, preserving the tallier/poll separation.
    pub private_key: PrivateKey,
}

/// Decryption failed: either the wrong key was used or the plaintext
/// exceeds the configured discrete-log search bound.
#[derive(Debug, thiserror::Error)]
#[error("ciphertext could not be decrypted within the configured plaintext bound")]
pub struct DecryptError(#[from] anyhow::Error);

/// Generate a fresh keypair. See the module doc comment: this stands in
/// for an external Guardian key-generation ceremony and is not itself a
/// modeled part of the voting engine.
pub fn generate_keypair<R: CryptoRngCore>(rng: &mut R) -> KeyPair {
    let sk = elgamal::SecretKey::random(rng);
    let pk = sk.public_key();
    KeyPair {
        public_key: PublicKey(pk),
        private_key: PrivateKey(sk),
    }
}

/// [`generate_keypair`] using the crate's default cryptographically
/// secure RNG.
#[must_use]
pub fn generate_keypair_with_default_rng() -> KeyPair {
    generate_keypair(&mut default_rng())
}

/// Encrypt a non-negative integer under `public_key`.
///
/// Probabilistic: calling this twice with the same `message` produces
/// different ciphertexts with overwhelming probability.
pub fn encrypt<R: CryptoRngCore>(public_key: &PublicKey, message: u64, rng: &mut R) -> Ciphertext {
    let randomness = Scalar::random(rng);
    Ciphertext(elgamal::encrypt(&Scalar::from(message), &public_key.0, &randomness))
}

/// [`encrypt`] using the crate's default cryptographically secure RNG.
#[must_use]
pub fn encrypt_with_default_rng(public_key: &PublicKey, message: u64) -> Ciphertext {
    encrypt(public_key, message, &mut default_rng())
}

/// Homomorphically add two ciphertexts: the plaintexts add under
/// decryption. `public_key` is accepted for façade fidelity with schemes
/// whose addition depends on public parameters; lifted `ElGamal`'s does
/// not use it.
#[must_use]
pub fn add(_public_key: &PublicKey, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
    Ciphertext(c1.0.add(&c2.0))
}

/// Decrypt a ciphertext to its non-negative plaintext.
///
/// `max_value` bounds the discrete-log search — it must be at least as
/// large as the true plaintext (callers that sum N ballots each capped at
/// `W` should pass `max_value >= N * W`). Building a [`BabyStepGiantStep`]
/// table is the expensive part of this call; callers decrypting many
/// ciphertexts under the same bound should share one table rather than
/// calling this function directly — see `crate::tally` for that pattern.
///
/// # Errors
/// Returns [`DecryptError`] if `private_key` does not match the key the
/// ciphertext was encrypted under, or if the plaintext exceeds `max_value`.
pub fn decrypt(private_key: &PrivateKey, c: &Ciphertext, max_value: u64) -> Result<u64, DecryptError> {
    let solver = BabyStepGiantStep::new(max_value.max(1), None)?;
    decrypt_with_solver(private_key, c, &solver)
}

/// Decrypt using a precomputed [`BabyStepGiantStep`] table, amortizing the
/// table-build cost across many ciphertexts sharing the same bound.
///
/// # Errors
/// Returns [`DecryptError`] under the same conditions as [`decrypt`].
pub fn decrypt_with_solver(
    private_key: &PrivateKey,
    c: &Ciphertext,
    solver: &BabyStepGiantStep,
) -> Result<u64, DecryptError> {
    let point = elgamal::decrypt(&c.0, &private_key.0);
    Ok(solver.discrete_log(point)?)
}
