//! Additive tallying for the `FullyHomomorphic` methods, plus the three
//! `Insecure` methods, which reuse its per-choice summation but add a
//! non-additive step over individually decrypted ballots.
//!
//! Ciphertexts are summed homomorphically across every ballot *before*
//! any decryption happens, so the tallier decrypts exactly one aggregate
//! per choice rather than one value per ballot per choice — preserving
//! the privacy property that no individual ballot is ever decrypted.
//! A naive per-ballot-decrypt-then-sum implementation would defeat that
//! property; summing ciphertexts first and decrypting once is
//! mathematically equivalent, by the homomorphic identity.

use crate::{
    crypto::babystep::BabyStepGiantStep,
    homomorphic::{self, Ciphertext, PrivateKey, PublicKey},
    poll::Poll,
};

use super::{argmax_all, PollResults, TallyError};

pub(super) fn decrypt_sum(
    votes: &[&Vec<Ciphertext>],
    choice_count: usize,
    public_key: &PublicKey,
    private_key: &PrivateKey,
    max_value: u64,
) -> Result<Vec<u64>, TallyError> {
    let solver = BabyStepGiantStep::new(max_value.max(1), None)
        .map_err(|e| TallyError::Decryption(homomorphic::DecryptError::from(e)))?;

    let mut tallies = Vec::with_capacity(choice_count);
    for i in 0..choice_count {
        let mut aggregate = Ciphertext::zero();
        for vote in votes {
            aggregate = homomorphic::add(public_key, &aggregate, &vote[i]);
        }
        tallies.push(homomorphic::decrypt_with_solver(private_key, &aggregate, &solver)?);
    }
    Ok(tallies)
}

pub(super) fn tally(poll: &Poll, private_key: &PrivateKey, max_value: u64) -> Result<PollResults, TallyError> {
    let votes: Vec<&Vec<Ciphertext>> = poll.get_encrypted_votes().values().collect();
    let tallies = decrypt_sum(&votes, poll.choices().len(), poll.voting_public_key(), private_key, max_value)?;
    let winners = argmax_all(&tallies);
    Ok(PollResults {
        method: poll.method(),
        tallies,
        winners,
        rounds: None,
        seats: None,
        voter_count: votes.len(),
    })
}

/// `Quadratic`: tallies[i] is the sum of each voter's *squared* weight
/// for choice `i`. Squaring is not linear, so unlike the additive
/// methods this must decrypt every ballot's chosen slot individually —
/// consistent with `Quadratic`'s `Insecure` classification, which
/// already concedes more than the final aggregate is exposed.
pub(super) fn tally_quadratic(poll: &Poll, private_key: &PrivateKey, max_value: u64) -> Result<PollResults, TallyError> {
    let n = poll.choices().len();
    let solver = BabyStepGiantStep::new(max_value.max(1), None)
        .map_err(|e| TallyError::Decryption(homomorphic::DecryptError::from(e)))?;

    let mut tallies = vec![0u64; n];
    let mut voter_count = 0;
    for ballot in poll.get_encrypted_votes().values() {
        voter_count += 1;
        for (i, ciphertext) in ballot.iter().enumerate() {
            let weight = homomorphic::decrypt_with_solver(private_key, ciphertext, &solver)?;
            if weight > 0 {
                tallies[i] += weight.saturating_mul(weight);
            }
        }
    }

    let winners = argmax_all(&tallies);
    Ok(PollResults {
        method: poll.method(),
        tallies,
        winners,
        rounds: None,
        seats: None,
        voter_count,
    })
}

/// `Consensus`: the additive plurality tally, but the apparent winner
/// only stands if it carries at least 95% of the votes cast; otherwise
/// no choice reached consensus and `winners` is empty.
pub(super) fn tally_consensus(poll: &Poll, private_key: &PrivateKey, max_value: u64) -> Result<PollResults, TallyError> {
    let votes: Vec<&Vec<Ciphertext>> = poll.get_encrypted_votes().values().collect();
    let tallies = decrypt_sum(&votes, poll.choices().len(), poll.voting_public_key(), private_key, max_value)?;
    let total: u64 = tallies.iter().sum();
    let winners = argmax_all(&tallies);
    let winners = match winners.as_slice() {
        [only] if total > 0 && tallies[*only] * 100 >= total * 95 => vec![*only],
        _ => Vec::new(),
    };
    Ok(PollResults {
        method: poll.method(),
        tallies,
        winners,
        rounds: None,
        seats: None,
        voter_count: votes.len(),
    })
}

/// `ConsentBased`: ballots are a consent-indicator vector, one slot per
/// choice. `crate::encoder` restricts this to the `{0,1}` domain — a
/// voter names the choices they do *not* object to, rather than casting
/// a signed "strong objection". A choice that accumulates a consent
/// indicator from every voter has received zero objections and is
/// accepted.
pub(super) fn tally_consent_based(poll: &Poll, private_key: &PrivateKey, max_value: u64) -> Result<PollResults, TallyError> {
    let votes: Vec<&Vec<Ciphertext>> = poll.get_encrypted_votes().values().collect();
    let tallies = decrypt_sum(&votes, poll.choices().len(), poll.voting_public_key(), private_key, max_value)?;
    let voter_count = votes.len() as u64;
    let accepted: Vec<usize> = tallies
        .iter()
        .enumerate()
        .filter(|&(_, &t)| voter_count > 0 && t == voter_count)
        .map(|(i, _)| i)
        .collect();
    Ok(PollResults {
        method: poll.method(),
        tallies,
        winners: accepted,
        rounds: None,
        seats: None,
        voter_count: votes.len(),
    })
}
