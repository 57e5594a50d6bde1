//! STAR (Score Then Automatic Runoff) tallying.
//!
//! Round 1 sums every voter's score per choice additively, exactly like
//! `Score`, and picks the two highest-scoring finalists. Round 2 decrypts
//! each ballot's score for just those two finalists and counts strict
//! preferences between them — a per-ballot comparison with no homomorphic
//! equivalent, which is why `STAR` is classified `MultiRound` rather than
//! `FullyHomomorphic` even though its first round is purely additive.

use crate::{
    crypto::babystep::BabyStepGiantStep,
    homomorphic::{self, PrivateKey},
    poll::Poll,
};

use super::{additive, PollResults, RoundResult, TallyError};

pub(super) fn tally(poll: &Poll, private_key: &PrivateKey, max_value: u64) -> Result<PollResults, TallyError> {
    let votes: Vec<&Vec<crate::homomorphic::Ciphertext>> = poll.get_encrypted_votes().values().collect();
    let choice_count = poll.choices().len();
    let round1_tallies = additive::decrypt_sum(&votes, choice_count, poll.voting_public_key(), private_key, max_value)?;

    let mut ranked: Vec<usize> = (0..choice_count).collect();
    ranked.sort_by(|&a, &b| round1_tallies[b].cmp(&round1_tallies[a]).then(a.cmp(&b)));

    let round1 = RoundResult {
        round: 1,
        tallies: round1_tallies.clone(),
        eliminated: None,
        winner: None,
        elected: None,
    };

    // Fewer than two choices ever reach a poll (the `ChoicesTooFew`
    // construction gate), so there are always two finalists to compare.
    let finalist_a = ranked[0];
    let finalist_b = ranked[1];

    let per_choice_max = max_value.max(1);
    let solver = BabyStepGiantStep::new(per_choice_max, None)
        .map_err(|e| TallyError::Decryption(homomorphic::DecryptError::from(e)))?;

    let mut preference_counts = [0u64; 2];
    for ballot in &votes {
        let score_a = homomorphic::decrypt_with_solver(private_key, &ballot[finalist_a], &solver)?;
        let score_b = homomorphic::decrypt_with_solver(private_key, &ballot[finalist_b], &solver)?;
        if score_a > score_b {
            preference_counts[0] += 1;
        } else if score_b > score_a {
            preference_counts[1] += 1;
        }
    }

    // A tie in round 2 preference counts is broken in favor of whichever
    // finalist scored higher in round 1.
    let winner = if preference_counts[0] != preference_counts[1] {
        if preference_counts[0] > preference_counts[1] {
            finalist_a
        } else {
            finalist_b
        }
    } else {
        finalist_a
    };

    let mut round2_tallies = vec![0u64; choice_count];
    round2_tallies[finalist_a] = preference_counts[0];
    round2_tallies[finalist_b] = preference_counts[1];

    let round2 = RoundResult {
        round: 2,
        tallies: round2_tallies,
        eliminated: None,
        winner: Some(winner),
        elected: None,
    };

    Ok(PollResults {
        method: poll.method(),
        tallies: round1_tallies,
        winners: vec![winner],
        rounds: Some(vec![round1, round2]),
        seats: None,
        voter_count: votes.len(),
    })
}
