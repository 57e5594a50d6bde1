//! External identity abstraction.
//!
//! A `Member` is never owned by the engine — `Poll` and the aggregators
//! store only the bytes `id()` returns, never a `Member` itself. Signing
//! and verification are capabilities a `Member` may or may not offer;
//! the engine treats both as opaque.

use crate::crypto::ed25519::{PrivateKey, PublicKey, Signature};

/// Encodes an arbitrary identifier as the fixed-width bytes the wire
/// formats of §6 require (e.g. 12 or 16 bytes).
pub trait IdProvider {
    /// Width, in bytes, of the encoding this provider produces.
    fn width(&self) -> usize;
    /// Encode `id`, truncating or zero-padding on the right to `width()`.
    fn encode(&self, id: &[u8]) -> Vec<u8>;
}

/// An [`IdProvider`] that pads or truncates to a fixed width.
#[derive(Debug, Clone, Copy)]
pub struct FixedWidthIdProvider {
    width: usize,
}

impl FixedWidthIdProvider {
    /// A provider producing 16-byte identifiers, the engine's default.
    pub const DEFAULT_16: Self = Self { width: 16 };
    /// A provider producing 12-byte identifiers.
    pub const WIDTH_12: Self = Self { width: 12 };

    /// Build a provider for an arbitrary width.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl IdProvider for FixedWidthIdProvider {
    fn width(&self) -> usize {
        self.width
    }

    fn encode(&self, id: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; self.width];
        let n = id.len().min(self.width);
        out[..n].copy_from_slice(&id[..n]);
        out
    }
}

/// An external identity the engine interacts with only through this trait.
pub trait Member {
    /// The member's unique identifier bytes, as produced by an [`IdProvider`].
    fn id(&self) -> &[u8];
    /// Sign `msg`, if this member carries a signing capability.
    fn sign(&self, msg: &[u8]) -> Option<Signature>;
    /// Verify `sig` over `msg` against this member's voting public key, if any.
    fn verify(&self, msg: &[u8], sig: &Signature) -> bool;
}

/// The poll's creator. Authorities always carry a signing capability —
/// every audit entry and receipt is signed by one.
pub struct Authority {
    id: Vec<u8>,
    signing_key: PrivateKey,
}

impl Authority {
    /// Construct an authority with a known signing key.
    #[must_use]
    pub fn new(id: Vec<u8>, signing_key: PrivateKey) -> Self {
        Self { id, signing_key }
    }

    /// Construct an authority with a freshly generated signing key, used by
    /// tests and examples that don't otherwise care about key provenance.
    #[must_use]
    pub fn generate(id: Vec<u8>) -> Self {
        Self::new(id, PrivateKey::random_with_default_rng())
    }

    /// This authority's voting public key, embedded in every `Poll` it creates.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.signing_key.public_key()
    }
}

impl Member for Authority {
    fn id(&self) -> &[u8] {
        &self.id
    }

    fn sign(&self, msg: &[u8]) -> Option<Signature> {
        Some(self.signing_key.sign(msg))
    }

    fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        self.public_key().verify(msg, sig)
    }
}

/// An ordinary voter. Signing is optional: a voter with no `signing_key`
/// can still cast ballots, it simply never produces its own signatures
/// (receipts are signed by the `Authority`, not the voter).
pub struct Voter {
    id: Vec<u8>,
    signing_key: Option<PrivateKey>,
}

impl Voter {
    /// Construct a voter with no signing capability.
    #[must_use]
    pub fn new(id: Vec<u8>) -> Self {
        Self {
            id,
            signing_key: None,
        }
    }

    /// Construct a voter that can also sign messages with its own key.
    #[must_use]
    pub fn with_signing_key(id: Vec<u8>, signing_key: PrivateKey) -> Self {
        Self {
            id,
            signing_key: Some(signing_key),
        }
    }
}

impl Member for Voter {
    fn id(&self) -> &[u8] {
        &self.id
    }

    fn sign(&self, msg: &[u8]) -> Option<Signature> {
        self.signing_key.as_ref().map(|k| k.sign(msg))
    }

    fn verify(&self, msg: &[u8], sig: &Signature) -> bool {
        self.signing_key
            .as_ref()
            .is_some_and(|k| k.public_key().verify(msg, sig))
    }
}
