//! Cryptographic primitives underlying the voting engine.
//!
//! Everything here is internal plumbing for [`crate::homomorphic`] (C1)
//! and [`crate::member`]; the rest of the crate only ever sees the
//! opaque `Ciphertext`/`PublicKey`/`PrivateKey` types re-exported from
//! [`crate::homomorphic`].

pub mod babystep;
pub mod ed25519;
pub mod elgamal;
pub mod group;
pub mod hash;
pub mod rng;
