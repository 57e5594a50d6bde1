//! Two-round runoff tallying.
//!
//! Round 1 is tallied exactly like `Plurality` — ballots are one-hot
//! encoded (`crate::encoder`) and summed homomorphically before a single
//! decryption per choice. If no candidate holds a strict majority, this
//! engine does not hold a second round of ballots; instead it simulates
//! the runoff from round 1's totals by comparing the top two candidates
//! directly, which is exact whenever voter preferences between just
//! those two are unchanged from round 1 and is documented as a
//! deliberate simplification rather than a faithful runoff election.

use crate::{homomorphic::PrivateKey, poll::Poll};

use super::{additive, argmax_all, PollResults, RoundResult, TallyError};

pub(super) fn tally(poll: &Poll, private_key: &PrivateKey, max_value: u64) -> Result<PollResults, TallyError> {
    let votes: Vec<&Vec<crate::homomorphic::Ciphertext>> = poll.get_encrypted_votes().values().collect();
    let tallies = additive::decrypt_sum(&votes, poll.choices().len(), poll.voting_public_key(), private_key, max_value)?;
    let total: u64 = tallies.iter().sum();
    let voter_count = votes.len();

    if let [only] = argmax_all(&tallies).as_slice() {
        if total > 0 && tallies[*only] * 2 > total {
            let winner = *only;
            let round1 = RoundResult {
                round: 1,
                tallies: tallies.clone(),
                eliminated: None,
                winner: Some(winner),
                elected: None,
            };
            return Ok(PollResults {
                method: poll.method(),
                tallies,
                winners: vec![winner],
                rounds: Some(vec![round1]),
                seats: None,
                voter_count,
            });
        }
    }

    let round1 = RoundResult {
        round: 1,
        tallies: tallies.clone(),
        eliminated: None,
        winner: None,
        elected: None,
    };

    let mut ranked: Vec<usize> = (0..tallies.len()).collect();
    ranked.sort_by(|&a, &b| tallies[b].cmp(&tallies[a]).then(a.cmp(&b)));
    let winner = ranked.first().copied().unwrap_or(0);

    let runoff_round = RoundResult {
        round: 2,
        tallies: tallies.clone(),
        eliminated: None,
        winner: Some(winner),
        elected: None,
    };

    Ok(PollResults {
        method: poll.method(),
        tallies,
        winners: vec![winner],
        rounds: Some(vec![round1, runoff_round]),
        seats: None,
        voter_count,
    })
}
