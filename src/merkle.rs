//! Merkle root construction for the bulletin board.
//!
//! Pairwise hash of sibling hashes, bottom-up, promoting the lone odd
//! sibling unchanged at each level. The root of an empty list is
//! [`Hash32::ZERO`] rather than `H("")`, so an empty bulletin board and a
//! tampered-to-empty one are distinguishable only by other means (the
//! chain itself has nothing to compare against at that point).
//!
//! This is a plain list-of-hashes tree, not a sparse Merkle tree over
//! key/value pairs — the bulletin board's commitment is over an
//! append-only sequence of entries, not a keyed map.

use crate::crypto::hash::Hash32;

/// Compute the Merkle root over `leaves`, in order.
#[must_use]
pub fn merkle_root(leaves: &[Hash32]) -> Hash32 {
    if leaves.is_empty() {
        return Hash32::ZERO;
    }
    let mut level: Vec<Hash32> = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut pairs = level.chunks_exact(2);
        for pair in &mut pairs {
            next.push(Hash32::combine(&pair[0], &pair[1]));
        }
        if let [odd] = pairs.remainder() {
            next.push(*odd);
        }
        level = next;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_root_is_zero() {
        assert_eq!(merkle_root(&[]), Hash32::ZERO);
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let leaf = Hash32::digest(b"a");
        assert_eq!(merkle_root(&[leaf]), leaf);
    }

    #[test]
    fn two_leaves_combine() {
        let a = Hash32::digest(b"a");
        let b = Hash32::digest(b"b");
        assert_eq!(merkle_root(&[a, b]), Hash32::combine(&a, &b));
    }

    #[test]
    fn odd_leaf_promotes_unchanged() {
        let a = Hash32::digest(b"a");
        let b = Hash32::digest(b"b");
        let c = Hash32::digest(b"c");
        let expected = Hash32::combine(&Hash32::combine(&a, &b), &c);
        assert_eq!(merkle_root(&[a, b, c]), expected);
    }

    #[test]
    fn order_matters() {
        let a = Hash32::digest(b"a");
        let b = Hash32::digest(b"b");
        assert_ne!(merkle_root(&[a, b]), merkle_root(&[b, a]));
    }
}
