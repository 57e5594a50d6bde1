//! Instant-runoff tallying for `RankedChoice`.
//!
//! Ballots are decrypted once into per-choice rank vectors (a zero slot
//! means unranked, per `crate::encoder::ranked_choice_points`) and every
//! round's elimination runs on plaintext integers from there — IRV's
//! preference redistribution has no homomorphic analogue, so per-ballot
//! rankings must be visible to the tallier, consistent with
//! `RankedChoice`'s `MultiRound` classification.

use crate::{
    crypto::babystep::BabyStepGiantStep,
    homomorphic::{self, PrivateKey},
    poll::Poll,
};

use super::{PollResults, RoundResult, TallyError};

/// Run IRV to a single winner.
///
/// # Errors
/// Returns [`TallyError::Decryption`] if any ballot fails to decrypt.
pub(super) fn tally(poll: &Poll, private_key: &PrivateKey) -> Result<PollResults, TallyError> {
    let choice_count = poll.choices().len();
    let ranks = decrypt_rankings(poll, private_key)?;

    let mut active = vec![true; choice_count];
    let mut rounds = Vec::new();
    let mut round_number = 1;

    loop {
        let tallies = count_first_preferences(&ranks, &active, choice_count);
        let total: u64 = tallies.iter().sum();
        let active_indices: Vec<usize> = (0..choice_count).filter(|&i| active[i]).collect();

        if let Some(winner) = sole_survivor(&active_indices) {
            rounds.push(RoundResult {
                round: round_number,
                tallies: tallies.clone(),
                eliminated: None,
                winner: Some(winner),
                elected: None,
            });
            return finish(poll, ranks.len(), tallies, winner, rounds);
        }

        if let Some(winner) = majority_winner(&active_indices, &tallies, total) {
            rounds.push(RoundResult {
                round: round_number,
                tallies: tallies.clone(),
                eliminated: None,
                winner: Some(winner),
                elected: None,
            });
            return finish(poll, ranks.len(), tallies, winner, rounds);
        }

        let eliminated = lowest_count_candidate(&active_indices, &tallies);
        rounds.push(RoundResult {
            round: round_number,
            tallies,
            eliminated: Some(eliminated),
            winner: None,
            elected: None,
        });
        active[eliminated] = false;
        round_number += 1;
    }
}

fn finish(poll: &Poll, voter_count: usize, tallies: Vec<u64>, winner: usize, rounds: Vec<RoundResult>) -> Result<PollResults, TallyError> {
    Ok(PollResults {
        method: poll.method(),
        tallies,
        winners: vec![winner],
        rounds: Some(rounds),
        seats: None,
        voter_count,
    })
}

fn sole_survivor(active_indices: &[usize]) -> Option<usize> {
    (active_indices.len() == 1).then(|| active_indices[0])
}

fn majority_winner(active_indices: &[usize], tallies: &[u64], total: u64) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let leader = *active_indices.iter().max_by_key(|&&i| tallies[i])?;
    (tallies[leader] * 2 > total).then_some(leader)
}

/// Ties broken toward the highest choice index.
fn lowest_count_candidate(active_indices: &[usize], tallies: &[u64]) -> usize {
    let min = active_indices.iter().map(|&i| tallies[i]).min().unwrap_or(0);
    active_indices
        .iter()
        .copied()
        .filter(|&i| tallies[i] == min)
        .max()
        .expect("active_indices is non-empty when called")
}

pub(super) fn decrypt_rankings(poll: &Poll, private_key: &PrivateKey) -> Result<Vec<Vec<u64>>, TallyError> {
    let choice_count = poll.choices().len();
    let solver = BabyStepGiantStep::new(choice_count.max(1) as u64, None)
        .map_err(|e| TallyError::Decryption(homomorphic::DecryptError::from(e)))?;

    let mut ranks = Vec::with_capacity(poll.get_encrypted_votes().len());
    for ballot in poll.get_encrypted_votes().values() {
        let mut rank_vec = Vec::with_capacity(choice_count);
        for ciphertext in ballot {
            rank_vec.push(homomorphic::decrypt_with_solver(private_key, ciphertext, &solver)?);
        }
        ranks.push(rank_vec);
    }
    Ok(ranks)
}

pub(super) fn count_first_preferences(ranks: &[Vec<u64>], active: &[bool], choice_count: usize) -> Vec<u64> {
    let mut tallies = vec![0u64; choice_count];
    for ballot in ranks {
        if let Some(choice) = first_active_preference(ballot, active) {
            tallies[choice] += 1;
        }
    }
    tallies
}

pub(super) fn first_active_preference(ranks: &[u64], active: &[bool]) -> Option<usize> {
    ranks
        .iter()
        .enumerate()
        .filter(|&(i, &r)| active[i] && r > 0)
        .min_by_key(|&(_, &r)| r)
        .map(|(i, _)| i)
}
