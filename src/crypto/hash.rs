//! SHA-256 hashing used throughout the audit log, bulletin board and
//! event log.
//!
//! A toy, non-cryptographic mixing function is never acceptable here —
//! every hash in this engine must be collision-resistant before it is
//! trusted. The 32-byte output width is part of the wire format and
//! must not change.

use sha2::{Digest, Sha256};

/// Width, in bytes, of every hash produced by this module.
pub const HASH_SIZE: usize = 32;

/// A SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32(pub [u8; HASH_SIZE]);

impl Hash32 {
    /// The all-zero hash, used as the chain anchor for the first entry in
    /// any hash-chained or Merkle-committed sequence.
    pub const ZERO: Hash32 = Hash32([0u8; HASH_SIZE]);

    /// Hash a single byte slice.
    #[must_use]
    pub fn digest(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let out = hasher.finalize();
        let mut buf = [0u8; HASH_SIZE];
        buf.copy_from_slice(&out);
        Hash32(buf)
    }

    /// Hash the concatenation of several byte slices without an intermediate
    /// allocation, used wherever a wire format hashes several fields together.
    #[must_use]
    pub fn digest_concat(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        let out = hasher.finalize();
        let mut buf = [0u8; HASH_SIZE];
        buf.copy_from_slice(&out);
        Hash32(buf)
    }

    /// Hash two sibling hashes together, used by the Merkle tree.
    #[must_use]
    pub fn combine(left: &Hash32, right: &Hash32) -> Self {
        Self::digest_concat(&[&left.0, &right.0])
    }

    /// Hex-encode the digest.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl std::fmt::Display for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
