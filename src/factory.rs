//! C11 — Poll factory.
//!
//! Method-specific constructor helpers over [`Poll::new`]: each names
//! exactly the parameters that method actually needs and fixes the rest
//! to sane defaults, rather than making every caller thread the full
//! `Poll::new` argument list through for the common cases.

use rand_core::RngCore;

use crate::{
    classifier::SecurityOptions,
    classifier::VotingMethod,
    clock::MonotonicClock,
    crypto::rng::default_rng,
    error::ConfigurationError,
    homomorphic::PublicKey,
    member::Authority,
    poll::Poll,
};

/// Options accepted by [`create`], layered over the per-method
/// constructors' fixed defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    /// See [`crate::poll::Poll::new`]'s `max_weight`.
    pub max_weight: Option<u64>,
    /// Permit an `Insecure` method.
    pub allow_insecure: bool,
    /// Reject any method that is not `FullyHomomorphic`.
    pub require_fully_secure: bool,
}

/// A fresh, cryptographically random 16-byte poll id.
#[must_use]
pub fn random_poll_id() -> Vec<u8> {
    let mut id = vec![0u8; 16];
    default_rng().fill_bytes(&mut id);
    id
}

/// Generic constructor accepting any voting method plus [`CreateOptions`].
///
/// # Errors
/// Returns a [`ConfigurationError`] under the same conditions as
/// [`Poll::new`].
pub fn create(
    choices: Vec<String>,
    method: VotingMethod,
    authority: &Authority,
    voting_public_key: PublicKey,
    options: CreateOptions,
    clock: &mut MonotonicClock,
) -> Result<Poll, ConfigurationError> {
    Poll::new(
        random_poll_id(),
        choices,
        method,
        authority,
        voting_public_key,
        options.max_weight,
        SecurityOptions {
            require_fully_secure: options.require_fully_secure,
            allow_insecure: options.allow_insecure,
        },
        clock,
    )
}

/// Single-choice plurality poll.
///
/// # Errors
/// Returns [`ConfigurationError::ChoicesTooFew`] if fewer than two
/// choices are given.
pub fn create_plurality(
    choices: Vec<String>,
    authority: &Authority,
    voting_public_key: PublicKey,
    clock: &mut MonotonicClock,
) -> Result<Poll, ConfigurationError> {
    create(choices, VotingMethod::Plurality, authority, voting_public_key, CreateOptions::default(), clock)
}

/// Approve-any-subset poll.
///
/// # Errors
/// Returns [`ConfigurationError::ChoicesTooFew`] if fewer than two
/// choices are given.
pub fn create_approval(
    choices: Vec<String>,
    authority: &Authority,
    voting_public_key: PublicKey,
    clock: &mut MonotonicClock,
) -> Result<Poll, ConfigurationError> {
    create(choices, VotingMethod::Approval, authority, voting_public_key, CreateOptions::default(), clock)
}

/// Weighted poll capped at `max_weight` per ballot.
///
/// # Errors
/// Returns [`ConfigurationError::ChoicesTooFew`] if fewer than two
/// choices are given, or [`ConfigurationError::InvalidMaxWeight`] if
/// `max_weight` is zero.
pub fn create_weighted(
    choices: Vec<String>,
    authority: &Authority,
    voting_public_key: PublicKey,
    max_weight: u64,
    clock: &mut MonotonicClock,
) -> Result<Poll, ConfigurationError> {
    let options = CreateOptions {
        max_weight: Some(max_weight),
        ..CreateOptions::default()
    };
    create(choices, VotingMethod::Weighted, authority, voting_public_key, options, clock)
}

/// Full-ranking Borda-count poll.
///
/// # Errors
/// Returns [`ConfigurationError::ChoicesTooFew`] if fewer than two
/// choices are given.
pub fn create_borda(
    choices: Vec<String>,
    authority: &Authority,
    voting_public_key: PublicKey,
    clock: &mut MonotonicClock,
) -> Result<Poll, ConfigurationError> {
    create(choices, VotingMethod::Borda, authority, voting_public_key, CreateOptions::default(), clock)
}

/// Instant-runoff ranked-choice poll.
///
/// # Errors
/// Returns [`ConfigurationError::ChoicesTooFew`] if fewer than two
/// choices are given.
pub fn create_ranked_choice(
    choices: Vec<String>,
    authority: &Authority,
    voting_public_key: PublicKey,
    clock: &mut MonotonicClock,
) -> Result<Poll, ConfigurationError> {
    create(choices, VotingMethod::RankedChoice, authority, voting_public_key, CreateOptions::default(), clock)
}
