//! C9 — Hierarchical aggregator.
//!
//! Composes encrypted per-choice tallies up a fixed jurisdiction
//! hierarchy — `Precinct → County → State → National` — using only
//! homomorphic addition. No level above `Precinct` ever touches a
//! [`crate::homomorphic::PrivateKey`]; only whatever holds the private
//! key matching the poll's `votingPublicKey` can decrypt the final
//! roll-up, and it can do so from the top level alone without ever
//! decrypting an intermediate level's tally.
//!
//! `County`/`State`/`National` share one internal composition engine
//! (below) rather than three separate implementations of the same
//! pairwise-sum-and-track-children logic; each level is exposed as a
//! thin public newtype so callers can't accidentally feed a `State`
//! tally into a `County` aggregator without it being a type error at the
//! call site naming the wrong method, backstopped by the runtime
//! `LevelMismatch` check.

use crate::{
    error::{AggregationError, StateError},
    homomorphic::{self, Ciphertext, PublicKey},
    poll::Poll,
};

/// A jurisdiction level in the aggregation hierarchy, ordered
/// `Precinct < County < State < National`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Wraps a single `Poll` directly.
    Precinct,
    /// Sums `Precinct` tallies.
    County,
    /// Sums `County` tallies.
    State,
    /// Sums `State` tallies.
    National,
}

/// An encrypted per-choice tally at some level of the hierarchy. Never
/// decrypted by this module — only handed to `crate::tally` by whoever
/// holds the matching private key.
#[derive(Debug, Clone)]
pub struct AggregatedTally {
    /// The level this tally was produced at.
    pub level: Level,
    /// One ciphertext per poll choice, the homomorphic sum of every
    /// contributing ballot/child tally for that choice.
    pub encrypted_tallies: Vec<Ciphertext>,
}

/// The bottom of the hierarchy: wraps one [`Poll`] directly rather than
/// summing child tallies.
#[derive(Debug)]
pub struct PrecinctAggregator {
    poll: Poll,
}

impl PrecinctAggregator {
    /// Wrap an existing poll as a precinct.
    #[must_use]
    pub fn new(poll: Poll) -> Self {
        Self { poll }
    }

    /// The wrapped poll, for casting ballots, closing, or reading receipts
    /// directly.
    #[must_use]
    pub fn poll(&self) -> &Poll {
        &self.poll
    }

    /// Mutable access to the wrapped poll — `vote`/`close` are called
    /// directly on it rather than re-exposed here, since `Poll` already
    /// owns the full state machine and validation.
    pub fn poll_mut(&mut self) -> &mut Poll {
        &mut self.poll
    }

    /// Sum every stored ballot's ciphertext per choice. Never decrypts
    /// anything — the result is still under `votingPublicKey`.
    #[must_use]
    pub fn get_tally(&self) -> AggregatedTally {
        let choice_count = self.poll.choices().len();
        let mut encrypted_tallies = vec![Ciphertext::zero(); choice_count];
        for ballot in self.poll.get_encrypted_votes().values() {
            for (i, ciphertext) in ballot.iter().enumerate() {
                encrypted_tallies[i] = homomorphic::add(self.poll.voting_public_key(), &encrypted_tallies[i], ciphertext);
            }
        }
        AggregatedTally {
            level: Level::Precinct,
            encrypted_tallies,
        }
    }
}

/// Shared composition logic for every level above `Precinct`.
#[derive(Debug)]
struct Aggregator {
    level: Level,
    child_level: Level,
    public_key: PublicKey,
    encrypted_tallies: Option<Vec<Ciphertext>>,
    voter_count: u64,
    child_jurisdictions: Vec<String>,
}

impl Aggregator {
    fn new(level: Level, child_level: Level, public_key: PublicKey) -> Self {
        Self {
            level,
            child_level,
            public_key,
            encrypted_tallies: None,
            voter_count: 0,
            child_jurisdictions: Vec::new(),
        }
    }

    fn add_child_tally(&mut self, jurisdiction_id: String, child: &AggregatedTally, child_voter_count: u64) -> Result<(), AggregationError> {
        if child.level != self.child_level {
            return Err(AggregationError::LevelMismatch {
                expected: self.child_level,
                actual: child.level,
            });
        }
        if self.child_jurisdictions.contains(&jurisdiction_id) {
            return Err(AggregationError::ChildAlreadyIncluded(jurisdiction_id));
        }

        match &mut self.encrypted_tallies {
            Some(running) => {
                for (slot, ciphertext) in running.iter_mut().zip(&child.encrypted_tallies) {
                    *slot = homomorphic::add(&self.public_key, slot, ciphertext);
                }
            },
            None => self.encrypted_tallies = Some(child.encrypted_tallies.clone()),
        }

        self.voter_count += child_voter_count;
        self.child_jurisdictions.push(jurisdiction_id);
        tracing::debug!(level = ?self.level, children = self.child_jurisdictions.len(), voter_count = self.voter_count, "child tally composed");
        Ok(())
    }

    fn get_tally(&self) -> Result<AggregatedTally, StateError> {
        let encrypted_tallies = self.encrypted_tallies.clone().ok_or(StateError::NoChildren)?;
        Ok(AggregatedTally {
            level: self.level,
            encrypted_tallies,
        })
    }
}

macro_rules! jurisdiction_aggregator {
    ($name:ident, $level:expr, $child_level:expr, $add_method:ident) => {
        #[doc = concat!("Composes `", stringify!($child_level), "` tallies into a `", stringify!($level), "` tally.")]
        #[derive(Debug)]
        pub struct $name(Aggregator);

        impl $name {
            /// Construct an aggregator with no children yet.
            #[must_use]
            pub fn new(public_key: PublicKey) -> Self {
                Self(Aggregator::new($level, $child_level, public_key))
            }

            /// Fold in one child jurisdiction's tally.
            ///
            /// # Errors
            /// Returns [`AggregationError::LevelMismatch`] if `tally.level`
            /// is not the expected child level, or
            /// [`AggregationError::ChildAlreadyIncluded`] if
            /// `jurisdiction_id` was already added.
            pub fn $add_method(
                &mut self,
                jurisdiction_id: impl Into<String>,
                tally: &AggregatedTally,
                child_voter_count: u64,
            ) -> Result<(), AggregationError> {
                self.0.add_child_tally(jurisdiction_id.into(), tally, child_voter_count)
            }

            /// The composed tally so far.
            ///
            /// # Errors
            /// Returns [`StateError::NoChildren`] if no child has been added.
            pub fn get_tally(&self) -> Result<AggregatedTally, StateError> {
                self.0.get_tally()
            }

            /// Total voters counted across every child added so far.
            #[must_use]
            pub fn voter_count(&self) -> u64 {
                self.0.voter_count
            }

            /// Child jurisdiction ids added so far, in insertion order.
            #[must_use]
            pub fn child_jurisdictions(&self) -> &[String] {
                &self.0.child_jurisdictions
            }
        }
    };
}

jurisdiction_aggregator!(CountyAggregator, Level::County, Level::Precinct, add_precinct_tally);
jurisdiction_aggregator!(StateAggregator, Level::State, Level::County, add_county_tally);
jurisdiction_aggregator!(NationalAggregator, Level::National, Level::State, add_state_tally);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::{SecurityOptions, VotingMethod},
        clock::MonotonicClock,
        encoder::VoteIntent,
        homomorphic::generate_keypair_with_default_rng,
        member::{Authority, Voter},
    };

    fn precinct_with_votes(id: u8, authority: &Authority, public_key: PublicKey, ballots: &[usize]) -> PrecinctAggregator {
        let mut clock = MonotonicClock::new();
        let mut rng = crate::crypto::rng::default_rng();
        let poll = Poll::new(
            vec![id],
            vec!["A".into(), "B".into()],
            VotingMethod::Plurality,
            authority,
            public_key,
            None,
            SecurityOptions::default(),
            &mut clock,
        )
        .unwrap();
        let mut precinct = PrecinctAggregator::new(poll);
        for (i, &choice) in ballots.iter().enumerate() {
            let voter = Voter::new(vec![id, i as u8]);
            let intent = VoteIntent {
                choice_index: Some(choice),
                ..Default::default()
            };
            precinct
                .poll_mut()
                .vote(&voter, &intent, authority, &mut clock, &mut rng)
                .unwrap();
        }
        precinct
    }

    #[test]
    fn sums_two_precincts_into_a_county_without_decrypting() {
        let authority = Authority::generate(vec![1]);
        let keys = generate_keypair_with_default_rng();

        let precinct_a = precinct_with_votes(1, &authority, keys.public_key, &[0, 0, 1]);
        let precinct_b = precinct_with_votes(2, &authority, keys.public_key, &[0, 1, 1]);

        let mut county = CountyAggregator::new(keys.public_key);
        county
            .add_precinct_tally("precinct-1", &precinct_a.get_tally(), precinct_a.poll().voter_count() as u64)
            .unwrap();
        county
            .add_precinct_tally("precinct-2", &precinct_b.get_tally(), precinct_b.poll().voter_count() as u64)
            .unwrap();

        assert_eq!(county.voter_count(), 6);
        let tally = county.get_tally().unwrap();
        assert_eq!(tally.level, Level::County);

        let decrypted: Vec<u64> = tally
            .encrypted_tallies
            .iter()
            .map(|c| homomorphic::decrypt(&keys.private_key, c, 10).unwrap())
            .collect();
        assert_eq!(decrypted, vec![3, 3]);
    }

    #[test]
    fn rejects_a_level_mismatch() {
        let authority = Authority::generate(vec![1]);
        let keys = generate_keypair_with_default_rng();
        let precinct = precinct_with_votes(1, &authority, keys.public_key, &[0]);

        let mut state = StateAggregator::new(keys.public_key);
        let err = state.add_county_tally("bad", &precinct.get_tally(), 1).unwrap_err();
        assert_eq!(
            err,
            AggregationError::LevelMismatch {
                expected: Level::County,
                actual: Level::Precinct,
            }
        );
    }

    #[test]
    fn rejects_the_same_jurisdiction_twice() {
        let authority = Authority::generate(vec![1]);
        let keys = generate_keypair_with_default_rng();
        let precinct = precinct_with_votes(1, &authority, keys.public_key, &[0]);

        let mut county = CountyAggregator::new(keys.public_key);
        county.add_precinct_tally("precinct-1", &precinct.get_tally(), 1).unwrap();
        let err = county.add_precinct_tally("precinct-1", &precinct.get_tally(), 1).unwrap_err();
        assert_eq!(err, AggregationError::ChildAlreadyIncluded("precinct-1".to_string()));
    }

    #[test]
    fn empty_aggregator_has_no_children() {
        let keys = generate_keypair_with_default_rng();
        let county = CountyAggregator::new(keys.public_key);
        assert_eq!(county.get_tally().unwrap_err(), StateError::NoChildren);
    }
}
