//! Single Transferable Vote tallying.
//!
//! Shares `crate::tally::irv`'s ranked-ballot decoding (the same
//! preference lists IRV counts) but elects to multiple seats against a
//! Droop quota instead of running a single-winner runoff. A candidate
//! meeting the quota is elected outright; otherwise the weakest remaining
//! candidate is eliminated, tie broken toward the highest index exactly
//! as in IRV. Surplus transfer beyond the quota is not modeled — once a
//! candidate is elected their ballots stop being recounted for
//! subsequent seats, treating STV as IRV's elimination rule generalized
//! to `seats` winners rather than a full fractional-surplus STV variant.

use crate::{homomorphic::PrivateKey, poll::Poll};

use super::{irv, PollResults, RoundResult, TallyError};

const DEFAULT_SEATS: usize = 3;

pub(super) fn tally(poll: &Poll, private_key: &PrivateKey, seats: Option<usize>) -> Result<PollResults, TallyError> {
    let choice_count = poll.choices().len();
    let seats = seats.unwrap_or(DEFAULT_SEATS).min(choice_count).max(1);
    let ranks = irv::decrypt_rankings(poll, private_key)?;
    let voter_count = ranks.len();
    let quota = voter_count / (seats + 1) + 1;

    let mut active = vec![true; choice_count];
    let mut elected: Vec<usize> = Vec::new();
    let mut rounds = Vec::new();
    let mut round_number = 1;
    let mut last_tallies = vec![0u64; choice_count];

    while elected.len() < seats {
        let remaining_open_seats = seats - elected.len();
        let remaining_candidates: Vec<usize> = (0..choice_count).filter(|&i| active[i]).collect();

        if remaining_candidates.len() <= remaining_open_seats {
            elected.extend(remaining_candidates.iter().copied());
            rounds.push(RoundResult {
                round: round_number,
                tallies: last_tallies.clone(),
                eliminated: None,
                winner: None,
                elected: Some(remaining_candidates),
            });
            break;
        }

        let tallies = irv::count_first_preferences(&ranks, &active, choice_count);
        last_tallies = tallies.clone();

        let meeting_quota: Vec<usize> = {
            let mut candidates: Vec<usize> = remaining_candidates.iter().copied().filter(|&i| tallies[i] as usize >= quota).collect();
            candidates.sort_by(|&a, &b| tallies[b].cmp(&tallies[a]).then(a.cmp(&b)));
            candidates
        };

        if !meeting_quota.is_empty() {
            for &winner in &meeting_quota {
                if elected.len() < seats {
                    elected.push(winner);
                    active[winner] = false;
                }
            }
            rounds.push(RoundResult {
                round: round_number,
                tallies,
                eliminated: None,
                winner: None,
                elected: Some(meeting_quota),
            });
            round_number += 1;
            continue;
        }

        let min = remaining_candidates.iter().map(|&i| tallies[i]).min().unwrap_or(0);
        let eliminated = remaining_candidates
            .iter()
            .copied()
            .filter(|&i| tallies[i] == min)
            .max()
            .expect("remaining_candidates is non-empty");
        active[eliminated] = false;

        rounds.push(RoundResult {
            round: round_number,
            tallies,
            eliminated: Some(eliminated),
            winner: None,
            elected: None,
        });
        round_number += 1;
    }

    Ok(PollResults {
        method: poll.method(),
        tallies: last_tallies,
        winners: elected.clone(),
        rounds: Some(rounds),
        seats: Some(elected),
        voter_count,
    })
}
