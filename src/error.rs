//! Central error taxonomy.
//!
//! Grouped by the kind of failure, not the module that raises it, mirroring
//! the engine's own error-handling policy: ballot and state errors are
//! fatal to a single operation and recoverable by the caller; configuration
//! errors prevent construction entirely; integrity errors are never
//! recovered by the engine and are instead surfaced as `bool` from the
//! various `verify*` methods rather than through these enums.

use thiserror::Error;

/// Raised at poll or aggregator construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The voting method's security level is `Insecure` and the poll did
    /// not opt in via `allow_insecure`.
    #[error("voting method is classified Insecure; construct the poll with allow_insecure to permit it")]
    InsecureMethodRejected,
    /// `require_fully_secure` was set but the method's level is `MultiRound`.
    #[error("poll requires a fully-secure method but a multi-round method was given")]
    FullySecureRequired,
    /// Fewer than two choices were supplied.
    #[error("a poll needs at least 2 choices, got {0}")]
    ChoicesTooFew(usize),
    /// `max_weight` was zero or otherwise out of range for a Weighted poll.
    #[error("max_weight must be greater than 0, got {0}")]
    InvalidMaxWeight(u64),
    /// A caller-side integration that gates on `IdProvider::width()` before
    /// constructing members found none configured. `Poll`/`Member` accept
    /// variable-length id bytes directly — every wire format this crate
    /// defines length-prefixes id fields rather than fixing their width —
    /// so this crate never raises this error itself; it exists for
    /// embedders that enforce a fixed-width identifier scheme (e.g. 12- or
    /// 16-byte ids) at their own construction boundary and want a typed
    /// error to report when that policy isn't satisfied.
    #[error("this poll configuration requires an IdProvider and none was supplied")]
    NoIdProvider,
}

/// Raised by `Poll::vote`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BallotError {
    /// The voter key already has a recorded receipt.
    #[error("voter has already cast a ballot in this poll")]
    AlreadyVoted,
    /// The poll's `closedAt` is set.
    #[error("poll is closed and no longer accepts ballots")]
    PollClosed,
    /// A `choiceIndex` or ranking entry fell outside `[0, choices.len())`.
    #[error("choice index {0} is out of range for {1} choices")]
    InvalidChoice(usize, usize),
    /// `weight` was non-positive or exceeded the poll's `maxWeight`.
    #[error("invalid weight {0}, expected 0 < weight <= {1}")]
    InvalidWeight(u64, u64),
    /// Two or more ranking/choice entries named the same candidate.
    #[error("duplicate choice index {0} in rankings")]
    DuplicateRanking(usize),
    /// A field the method requires (`choiceIndex`, `choices`, `rankings`,
    /// `weight`) was absent.
    #[error("missing field required by this voting method: {0}")]
    MissingRequiredField(&'static str),
    /// The submitted `encrypted` ciphertext vector was empty or the wrong length.
    #[error("encrypted ballot payload is empty or has the wrong length")]
    EncryptedPayloadEmpty,
}

/// Raised by state-machine transitions outside the ballot path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// `tally` was invoked before `close`.
    #[error("poll must be closed before it can be tallied")]
    PollNotClosed,
    /// `close` was invoked a second time.
    #[error("poll is already closed")]
    AlreadyClosed,
    /// `getTally` was invoked on an aggregator with no child tally added.
    #[error("aggregator has no child tallies to compose")]
    NoChildren,
}

/// Raised by the hierarchical aggregator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// A child tally's `level` did not match the expected child level for
    /// this aggregator (e.g. a `State` tally fed into a `County`
    /// aggregator).
    #[error("expected a child tally at level {expected:?}, got {actual:?}")]
    LevelMismatch {
        /// The level this aggregator accepts children at.
        expected: crate::aggregator::Level,
        /// The level of the tally actually supplied.
        actual: crate::aggregator::Level,
    },
    /// The same child jurisdiction id was added more than once.
    #[error("jurisdiction {0} was already included in this aggregate")]
    ChildAlreadyIncluded(String),
}

/// The reasons a `verify*` call can fail, surfaced for diagnostics
/// alongside the mandated `bool` contract — callers that only need
/// pass/fail should keep using the `bool`-returning method
/// (e.g. `AuditLog::verify_entry`, `BulletinBoard::verify_merkle_tree`);
/// callers that want to report *why* call its `_detailed` counterpart
/// (`AuditLog::verify_entry_detailed`, `AuditLog::verify_chain_detailed`,
/// `BulletinBoard::verify_entry_detailed`,
/// `BulletinBoard::verify_tally_proof_detailed`,
/// `BulletinBoard::verify_merkle_tree_detailed`), which returns this enum.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// An audit entry's recomputed hash does not match its stored `previousHash` link.
    #[error("audit hash chain is broken at sequence {0}")]
    AuditChainBroken(u64),
    /// An audit entry's authority signature does not verify.
    #[error("audit entry signature invalid at sequence {0}")]
    AuditSignatureInvalid(u64),
    /// A bulletin-board entry's recomputed hash does not match its stored hash.
    #[error("bulletin board entry tampered at sequence {0}")]
    BulletinEntryTampered(u64),
    /// A tally proof's `votesHash` or `decryptionProof` does not match the supplied data.
    #[error("tally proof invalid for poll")]
    TallyProofInvalid,
    /// A sequenced stream skipped or repeated a sequence number.
    #[error("sequence gap at index {0}")]
    SequenceGap(u64),
    /// A recomputed Merkle root does not match the stored root.
    #[error("merkle root mismatch")]
    MerkleRootMismatch,
}
