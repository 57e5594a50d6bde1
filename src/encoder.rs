//! C3 — Vote encoder.
//!
//! Turns a voter's plaintext intent into a length-`n` ciphertext vector,
//! one slot per choice. Every unselected slot is
//! `encrypt(0)` rather than left empty, so `crate::tally`'s additive path
//! never has to special-case a sparse ballot.
//!
//! Validation happens here, against the plaintext fields, before they are
//! ever encrypted — `Poll::vote` stores only the resulting ciphertexts,
//! never the plaintext intent.

use rand_core::CryptoRngCore;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::{
    classifier::VotingMethod,
    crypto::{elgamal, group::Scalar},
    error::BallotError,
    homomorphic::{Ciphertext, PublicKey},
};

/// A voter's plaintext intent plus the resulting ciphertext vector.
///
/// `Poll::vote` validates and discards every field here except `encrypted`
/// before storing a ballot; the other fields exist only so the encoder (and
/// the poll's own defense-in-depth validation) can see what was intended.
#[derive(Debug, Clone, Default)]
pub struct EncryptedVote {
    /// Selected candidate, for Plurality-family and Weighted methods.
    pub choice_index: Option<usize>,
    /// Approved candidates, for Approval.
    pub choices: Option<Vec<usize>>,
    /// Ranked candidates, most preferred first, for Borda/RankedChoice.
    pub rankings: Option<Vec<usize>>,
    /// Positive integer weight, for Weighted/Quadratic.
    pub weight: Option<u64>,
    /// Per-choice score in `[0, 10]`, for Score.
    pub score: Option<Vec<u64>>,
    /// The encrypted ballot: one ciphertext per choice.
    pub encrypted: Vec<Ciphertext>,
}

/// Encode `intent` into an [`EncryptedVote`] for a poll of `choice_count`
/// choices under `method`.
///
/// `max_weight` is the poll's configured cap for Weighted/Quadratic
/// ballots, or `None` if the poll did not configure one.
///
/// # Errors
/// Returns a [`BallotError`] variant describing why `intent` is malformed
/// for `method`.
pub fn encode<R: CryptoRngCore>(
    method: VotingMethod,
    choice_count: usize,
    intent: &VoteIntent,
    public_key: &PublicKey,
    max_weight: Option<u64>,
    rng: &mut R,
) -> Result<EncryptedVote, BallotError> {
    use VotingMethod::{
        Approval, Borda, Consensus, ConsentBased, Plurality, Quadratic, RankedChoice, STAR, STV,
        Score, Supermajority, TwoRound, Weighted, YesNo, YesNoAbstain,
    };

    let plaintexts = match method {
        Plurality | YesNo | YesNoAbstain | Supermajority | Consensus | TwoRound => {
            // TwoRound's first round is tallied additively exactly like
            // Plurality; only the winner algorithm differs.
            one_hot(choice_count, require_choice_index(intent, choice_count)?, 1)
        },
        ConsentBased => {
            // Restricted to the {0,1} domain: rather than a signed
            // "strong objection" plaintext, a voter
            // names the choices they do *not* object to. A choice with
            // every voter's indicator set is one with zero objections.
            indicator(choice_count, require_choices(intent, choice_count)?)
        },
        Approval => indicator(choice_count, require_choices(intent, choice_count)?),
        Weighted | Quadratic => {
            let choice_index = require_choice_index(intent, choice_count)?;
            let weight = require_weight(intent, max_weight)?;
            one_hot(choice_count, choice_index, weight)
        },
        Borda => borda_points(choice_count, require_rankings(intent, choice_count)?),
        RankedChoice | STV => {
            // STV's per-round counting walks the same rank-ordered
            // preference list IRV does, so it shares RankedChoice's
            // encoding.
            ranked_choice_points(choice_count, require_rankings(intent, choice_count)?)
        },
        Score | STAR => {
            // STAR's round 1 is an additive score sum.
            require_score(intent, choice_count)?
        },
    };

    if plaintexts.is_empty() {
        return Err(BallotError::EncryptedPayloadEmpty);
    }

    let encrypted = encrypt_vector(&plaintexts, public_key, rng);
    Ok(EncryptedVote {
        choice_index: intent.choice_index,
        choices: intent.choices.clone(),
        rankings: intent.rankings.clone(),
        weight: intent.weight,
        score: intent.score.clone(),
        encrypted,
    })
}

/// The plaintext fields a voter supplies before encoding — the same shape
/// as [`EncryptedVote`] minus the `encrypted` output field.
#[derive(Debug, Clone, Default)]
pub struct VoteIntent {
    /// See [`EncryptedVote::choice_index`].
    pub choice_index: Option<usize>,
    /// See [`EncryptedVote::choices`].
    pub choices: Option<Vec<usize>>,
    /// See [`EncryptedVote::rankings`].
    pub rankings: Option<Vec<usize>>,
    /// See [`EncryptedVote::weight`].
    pub weight: Option<u64>,
    /// See [`EncryptedVote::score`].
    pub score: Option<Vec<u64>>,
}

fn require_choice_index(intent: &VoteIntent, choice_count: usize) -> Result<usize, BallotError> {
    let choice_index = intent
        .choice_index
        .ok_or(BallotError::MissingRequiredField("choiceIndex"))?;
    if choice_index >= choice_count {
        return Err(BallotError::InvalidChoice(choice_index, choice_count));
    }
    Ok(choice_index)
}

fn require_choices(intent: &VoteIntent, choice_count: usize) -> Result<&[usize], BallotError> {
    let choices = intent
        .choices
        .as_deref()
        .ok_or(BallotError::MissingRequiredField("choices"))?;
    if choices.is_empty() {
        return Err(BallotError::EncryptedPayloadEmpty);
    }
    for &c in choices {
        if c >= choice_count {
            return Err(BallotError::InvalidChoice(c, choice_count));
        }
    }
    Ok(choices)
}

fn require_weight(intent: &VoteIntent, max_weight: Option<u64>) -> Result<u64, BallotError> {
    let weight = intent
        .weight
        .ok_or(BallotError::MissingRequiredField("weight"))?;
    let cap = max_weight.unwrap_or(u64::MAX);
    if weight == 0 || weight > cap {
        return Err(BallotError::InvalidWeight(weight, cap));
    }
    Ok(weight)
}

fn require_rankings(intent: &VoteIntent, choice_count: usize) -> Result<&[usize], BallotError> {
    let rankings = intent
        .rankings
        .as_deref()
        .ok_or(BallotError::MissingRequiredField("rankings"))?;
    if rankings.is_empty() {
        return Err(BallotError::EncryptedPayloadEmpty);
    }
    let mut seen = vec![false; choice_count];
    for &r in rankings {
        if r >= choice_count {
            return Err(BallotError::InvalidChoice(r, choice_count));
        }
        if seen[r] {
            return Err(BallotError::DuplicateRanking(r));
        }
        seen[r] = true;
    }
    Ok(rankings)
}

fn require_score(intent: &VoteIntent, choice_count: usize) -> Result<Vec<u64>, BallotError> {
    let score = intent
        .score
        .clone()
        .ok_or(BallotError::MissingRequiredField("score"))?;
    if score.len() != choice_count {
        return Err(BallotError::EncryptedPayloadEmpty);
    }
    for &s in &score {
        if s > 10 {
            return Err(BallotError::InvalidWeight(s, 10));
        }
    }
    Ok(score)
}

fn one_hot(choice_count: usize, index: usize, value: u64) -> Vec<u64> {
    (0..choice_count).map(|i| if i == index { value } else { 0 }).collect()
}

fn indicator(choice_count: usize, choices: &[usize]) -> Vec<u64> {
    (0..choice_count)
        .map(|i| u64::from(choices.contains(&i)))
        .collect()
}

fn borda_points(choice_count: usize, rankings: &[usize]) -> Vec<u64> {
    let points = rankings.len() as u64;
    let mut out = vec![0u64; choice_count];
    for (j, &r) in rankings.iter().enumerate() {
        out[r] = points - j as u64;
    }
    out
}

fn ranked_choice_points(choice_count: usize, rankings: &[usize]) -> Vec<u64> {
    let mut out = vec![0u64; choice_count];
    for (j, &r) in rankings.iter().enumerate() {
        out[r] = j as u64 + 1;
    }
    out
}

fn encrypt_vector<R: CryptoRngCore>(plaintexts: &[u64], public_key: &PublicKey, rng: &mut R) -> Vec<Ciphertext> {
    let randomness: Vec<Scalar> = (0..plaintexts.len()).map(|_| Scalar::random(rng)).collect();
    plaintexts
        .par_iter()
        .zip(randomness.par_iter())
        .map(|(m, r)| Ciphertext(elgamal::encrypt(&Scalar::from(*m), &public_key.0, r)))
        .collect()
}
