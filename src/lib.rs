//! End-to-end verifiable electronic voting: homomorphic ballots,
//! multi-method tallying, a hash-chained audit trail and a signed public
//! bulletin board.
//!
//! The engine never holds both halves of a keypair capable of decrypting
//! an individual ballot: a [`poll::Poll`] is constructed with only a
//! [`homomorphic::PublicKey`], and decryption is exposed exclusively
//! through [`tally::tally`] given the matching
//! [`homomorphic::PrivateKey`] — key generation itself is out of scope
//! (see the [`homomorphic`] module doc).

#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod audit;
pub mod batch;
pub mod bulletin_board;
pub mod classifier;
pub mod clock;
pub mod crypto;
pub mod encoder;
pub mod error;
pub mod event_log;
pub mod factory;
pub mod homomorphic;
pub mod member;
pub mod merkle;
pub mod poll;
pub mod tally;
mod wire;

pub use classifier::{SecurityLevel, SecurityOptions, VotingMethod};
pub use encoder::VoteIntent;
pub use error::{AggregationError, BallotError, ConfigurationError, IntegrityViolation, StateError};
pub use homomorphic::{KeyPair, PrivateKey, PublicKey};
pub use member::{Authority, Member, Voter};
pub use poll::{Poll, VoteReceipt};
pub use tally::{tally, PollResults, TallyError};
