//! Default random number generator used where a caller doesn't supply one.

use rand_chacha::ChaCha8Rng;
pub use rand_core;
use rand_core::{CryptoRngCore, SeedableRng};

/// Default cryptographically secure random number generator.
#[must_use]
pub fn default_rng() -> impl CryptoRngCore {
    ChaCha8Rng::from_entropy()
}
