//! C5 — Tallier.
//!
//! Reads a closed poll's encrypted ballots, decrypts the aggregate (never
//! an individual ballot, for the `FullyHomomorphic` methods), and runs
//! the method-specific winner algorithm. Dispatch follows the
//! three-tier classification of `crate::classifier`: additive methods
//! never decrypt anything but the final per-choice sum; `MultiRound`
//! methods decrypt bounded per-round (and, for IRV/STV, per-ballot
//! preference) information, one file per algorithm under `src/tally/`.

mod additive;
mod irv;
mod star;
mod stv;
mod two_round;

use crate::{
    classifier::VotingMethod,
    homomorphic::{DecryptError, PrivateKey},
    poll::Poll,
};

/// One round of a multi-round tally (`RankedChoice`/`TwoRound`/`STAR`/`STV`).
#[derive(Debug, Clone)]
pub struct RoundResult {
    /// 1-indexed round number.
    pub round: usize,
    /// Per-choice vote counts as of this round.
    pub tallies: Vec<u64>,
    /// The choice eliminated at the end of this round, if any.
    pub eliminated: Option<usize>,
    /// The winner decided in this round, if the tally concluded here.
    pub winner: Option<usize>,
    /// Choices elected in this round (STV only).
    pub elected: Option<Vec<usize>>,
}

/// The result of tallying a poll. Every field is populated for every
/// method; which ones are meaningful depends on `method` and its
/// algorithm — e.g. `rounds` is `None` for the additive methods, which
/// never need more than one pass.
#[derive(Debug, Clone)]
pub struct PollResults {
    /// The method this poll was tallied under.
    pub method: VotingMethod,
    /// Final per-choice tallies. For `RankedChoice`/`TwoRound`/`STAR`/`STV`
    /// this is the last round's first-preference counts (see `seats` for
    /// `STV`'s elected choices).
    pub tallies: Vec<u64>,
    /// The winning choice index/indices. More than one index means a tie
    /// at the maximum (additive methods) or an unmet threshold
    /// (`Consensus`/`ConsentBased`, where it may also be empty).
    pub winners: Vec<usize>,
    /// Per-round detail for multi-round methods.
    pub rounds: Option<Vec<RoundResult>>,
    /// Seats won, in election order (`STV` only).
    pub seats: Option<Vec<usize>>,
    /// Number of ballots this tally was computed over.
    pub voter_count: usize,
}

/// Tallying failed.
#[derive(Debug, thiserror::Error)]
pub enum TallyError {
    /// `tally` was invoked before the poll was closed.
    #[error("poll must be closed before it can be tallied")]
    PollNotClosed,
    /// An aggregate or per-ballot ciphertext failed to decrypt — either a
    /// key mismatch or the plaintext exceeded the configured bound.
    #[error("tally decryption failed: {0}")]
    Decryption(#[from] DecryptError),
}

/// Tally `poll`'s encrypted ballots under `private_key`, dispatching on
/// its voting method. `max_value` bounds the discrete-log search used to
/// decrypt aggregates (and, for IRV/STV, must only cover a single rank
/// value, not the full sum) — callers summing `N` ballots each capped at
/// weight `W` should pass at least `N * W`.
///
/// # Errors
/// Returns [`TallyError::PollNotClosed`] if `poll` is still open, or
/// [`TallyError::Decryption`] if any ciphertext fails to decrypt.
pub fn tally(poll: &Poll, private_key: &PrivateKey, max_value: u64) -> Result<PollResults, TallyError> {
    if poll.closed_at().is_none() {
        return Err(TallyError::PollNotClosed);
    }

    use VotingMethod::{
        Approval, Borda, Consensus, ConsentBased, Plurality, Quadratic, RankedChoice, STAR, STV, Score, Supermajority,
        TwoRound, Weighted, YesNo, YesNoAbstain,
    };
    match poll.method() {
        Plurality | Approval | Weighted | Score | Borda | YesNo | YesNoAbstain | Supermajority => {
            additive::tally(poll, private_key, max_value)
        },
        RankedChoice => irv::tally(poll, private_key),
        TwoRound => two_round::tally(poll, private_key, max_value),
        STAR => star::tally(poll, private_key, max_value),
        STV => stv::tally(poll, private_key, None),
        Quadratic => additive::tally_quadratic(poll, private_key, max_value),
        Consensus => additive::tally_consensus(poll, private_key, max_value),
        ConsentBased => additive::tally_consent_based(poll, private_key, max_value),
    }
}

/// Like [`tally`], but for `STV` polls lets the caller override the
/// default seat count (`min(3, choices.len())`) instead of the default.
///
/// Always runs the STV algorithm against `poll`'s stored rankings
/// regardless of `poll.method()` — it does not check the method or fall
/// back to another tally path, so callers must only invoke this on an
/// actual `STV` poll. Prefer [`tally`] unless a non-default seat count is
/// needed.
///
/// # Errors
/// Returns [`TallyError::PollNotClosed`] if `poll` is still open, or
/// [`TallyError::Decryption`] if any ballot fails to decrypt.
pub fn tally_stv_with_seats(poll: &Poll, private_key: &PrivateKey, seats: usize) -> Result<PollResults, TallyError> {
    if poll.closed_at().is_none() {
        return Err(TallyError::PollNotClosed);
    }
    stv::tally(poll, private_key, Some(seats))
}

pub(crate) fn argmax_all(tallies: &[u64]) -> Vec<usize> {
    let max = tallies.iter().copied().max().unwrap_or(0);
    tallies
        .iter()
        .enumerate()
        .filter(|&(_, &t)| t == max)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_all_finds_every_tied_index() {
        assert_eq!(argmax_all(&[1, 3, 3, 2]), vec![1, 2]);
    }

    #[test]
    fn argmax_all_of_empty_is_empty() {
        assert_eq!(argmax_all(&[]), Vec::<usize>::new());
    }
}
