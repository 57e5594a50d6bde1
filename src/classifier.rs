//! C2 — Security classifier.
//!
//! Maps each [`VotingMethod`] to a [`SecurityLevel`] and gates poll
//! creation on it. `FullyHomomorphic` methods never reveal anything beyond
//! the final tally; `MultiRound` methods require decrypting intermediate
//! round tallies (see `crate::tally`); `Insecure` methods leak more than
//! the final result and are rejected unless explicitly allowed.

use crate::error::ConfigurationError;

/// The fifteen voting methods this engine knows how to encode and tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VotingMethod {
    /// Single choice per voter.
    Plurality,
    /// A subset of choices approved per voter.
    Approval,
    /// Single choice with a per-voter positive integer weight.
    Weighted,
    /// Full ranking of choices, points by rank position.
    Borda,
    /// Per-choice integer score in `[0, 10]`.
    Score,
    /// Plurality restricted to 2 choices.
    YesNo,
    /// Plurality restricted to 3 choices (yes/no/abstain).
    YesNoAbstain,
    /// Plurality gated on a supermajority threshold at tally time.
    Supermajority,
    /// Instant-runoff ranked choice.
    RankedChoice,
    /// Additive round 1, runoff among the top candidates if no majority.
    TwoRound,
    /// Score Then Automatic Runoff.
    STAR,
    /// Single Transferable Vote, multi-seat.
    STV,
    /// Weight-squared tally; leaks relative weight magnitude.
    Quadratic,
    /// Requires near-unanimous agreement; leaks dissent count.
    Consensus,
    /// Accept-unless-objected; leaks individual objections.
    ConsentBased,
}

/// The three homomorphic-compatibility tiers a [`VotingMethod`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    /// The tallier decrypts only the final aggregate; no intermediate
    /// decryption is ever required.
    FullyHomomorphic,
    /// Correct tallying requires decrypting one or more intermediate
    /// round tallies before the winner is known.
    MultiRound,
    /// The method's tally construction needs more than ciphertext
    /// addition — or inherently reveals more than a final aggregate.
    Insecure,
}

/// Gate options for constructing a poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityOptions {
    /// Reject any method whose level is not `FullyHomomorphic`.
    pub require_fully_secure: bool,
    /// Permit methods classified `Insecure`.
    pub allow_insecure: bool,
}

/// The homomorphic-compatibility tier of `method`.
#[must_use]
pub fn security_level(method: VotingMethod) -> SecurityLevel {
    use VotingMethod::{
        Approval, Borda, Consensus, ConsentBased, Plurality, Quadratic, RankedChoice, STAR, STV,
        Score, Supermajority, TwoRound, Weighted, YesNo, YesNoAbstain,
    };
    match method {
        Plurality | Approval | Weighted | Borda | Score | YesNo | YesNoAbstain | Supermajority => {
            SecurityLevel::FullyHomomorphic
        },
        RankedChoice | TwoRound | STAR | STV => SecurityLevel::MultiRound,
        Quadratic | Consensus | ConsentBased => SecurityLevel::Insecure,
    }
}

/// `true` iff `method`'s tally never requires an intermediate decryption.
#[must_use]
pub fn is_fully_secure(method: VotingMethod) -> bool {
    security_level(method) == SecurityLevel::FullyHomomorphic
}

/// `true` iff `method`'s tally proceeds in more than one decryption round.
#[must_use]
pub fn requires_multiple_rounds(method: VotingMethod) -> bool {
    security_level(method) == SecurityLevel::MultiRound
}

/// Gate `method` against `options`, failing poll construction outright
/// rather than letting an ungated method silently degrade security.
///
/// # Errors
/// Returns [`ConfigurationError::InsecureMethodRejected`] when the method
/// is `Insecure` and `options.allow_insecure` is unset, or
/// [`ConfigurationError::FullySecureRequired`] when `options.require_fully_secure`
/// is set and the method is `MultiRound` (or `Insecure`).
pub fn validate(method: VotingMethod, options: SecurityOptions) -> Result<(), ConfigurationError> {
    let level = security_level(method);
    if level == SecurityLevel::Insecure && !options.allow_insecure {
        return Err(ConfigurationError::InsecureMethodRejected);
    }
    if options.require_fully_secure && level != SecurityLevel::FullyHomomorphic {
        return Err(ConfigurationError::FullySecureRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use VotingMethod::{Approval, Consensus, Plurality, RankedChoice};

    #[test]
    fn classifies_all_three_tiers() {
        assert_eq!(security_level(Plurality), SecurityLevel::FullyHomomorphic);
        assert_eq!(security_level(RankedChoice), SecurityLevel::MultiRound);
        assert_eq!(security_level(Consensus), SecurityLevel::Insecure);
    }

    #[test]
    fn insecure_method_rejected_by_default() {
        let err = validate(Consensus, SecurityOptions::default()).unwrap_err();
        assert_eq!(err, ConfigurationError::InsecureMethodRejected);
    }

    #[test]
    fn insecure_method_allowed_when_opted_in() {
        let opts = SecurityOptions {
            allow_insecure: true,
            ..Default::default()
        };
        assert!(validate(Consensus, opts).is_ok());
    }

    #[test]
    fn multi_round_rejected_when_fully_secure_required() {
        let opts = SecurityOptions {
            require_fully_secure: true,
            ..Default::default()
        };
        let err = validate(RankedChoice, opts).unwrap_err();
        assert_eq!(err, ConfigurationError::FullySecureRequired);
    }

    #[test]
    fn fully_homomorphic_passes_strict_gate() {
        let opts = SecurityOptions {
            require_fully_secure: true,
            ..Default::default()
        };
        assert!(validate(Plurality, opts).is_ok());
        assert!(validate(Approval, opts).is_ok());
    }
}
