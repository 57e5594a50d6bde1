//! C4 — Poll core.
//!
//! The authority-owned record of one election: the frozen choice set,
//! the accepted ballots, and the state machine gating them. A `Poll`
//! never holds a private key — only the
//! `votingPublicKey` ballots are encrypted under — so nothing it owns
//! can decrypt a single vote; that capability belongs exclusively to
//! whatever holds the matching [`PrivateKey`] (`crate::tally`).

use std::collections::BTreeMap;

use rand_core::CryptoRngCore;

use crate::{
    audit::AuditLog,
    classifier::{self, SecurityOptions, VotingMethod},
    clock::MonotonicClock,
    crypto::{ed25519::Signature, hash::Hash32},
    encoder::{self, EncryptedVote, VoteIntent},
    error::{BallotError, ConfigurationError, StateError},
    homomorphic::{Ciphertext, PublicKey},
    member::{Authority, Member},
    wire,
};

/// A signed proof that a voter cast a ballot. Reveals only the voter id,
/// poll id, timestamp and nonce — never the ballot contents.
#[derive(Debug, Clone)]
pub struct VoteReceipt {
    /// The voting member's id.
    pub voter_id: Vec<u8>,
    /// The poll the ballot was cast in.
    pub poll_id: Vec<u8>,
    /// Microsecond timestamp the ballot was accepted.
    pub timestamp: u64,
    /// 16 random bytes, freshly sampled per receipt.
    pub nonce: [u8; 16],
    /// Authority signature over `voterId ‖ pollId ‖ uint64(timestamp) ‖ nonce`.
    pub signature: Signature,
}

fn receipt_signing_bytes(voter_id: &[u8], poll_id: &[u8], timestamp: u64, nonce: &[u8; 16]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(voter_id);
    buf.extend_from_slice(poll_id);
    wire::write_u64(&mut buf, timestamp);
    buf.extend_from_slice(nonce);
    buf
}

/// One election over a fixed choice set: `Open` until [`Poll::close`] is
/// called exactly once, after which it may be tallied any number of
/// times but never voted in again.
#[derive(Debug)]
pub struct Poll {
    id: Vec<u8>,
    choices: Vec<String>,
    method: VotingMethod,
    authority_id: Vec<u8>,
    authority_public_key: crate::crypto::ed25519::PublicKey,
    voting_public_key: PublicKey,
    votes: BTreeMap<String, Vec<Ciphertext>>,
    receipts: BTreeMap<String, VoteReceipt>,
    created_at: u64,
    closed_at: Option<u64>,
    max_weight: Option<u64>,
    audit_log: AuditLog,
}

impl Poll {
    /// Construct a poll. Runs the security classifier against `config`
    /// and records a `PollCreated` audit entry.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::ChoicesTooFew`] if fewer than two
    /// choices are given, [`ConfigurationError::InvalidMaxWeight`] if
    /// `max_weight` is `Some(0)`, or the classifier's own errors if
    /// `method`/`config` are incompatible.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Vec<u8>,
        choices: Vec<String>,
        method: VotingMethod,
        authority: &Authority,
        voting_public_key: PublicKey,
        max_weight: Option<u64>,
        config: SecurityOptions,
        clock: &mut MonotonicClock,
    ) -> Result<Self, ConfigurationError> {
        if choices.len() < 2 {
            return Err(ConfigurationError::ChoicesTooFew(choices.len()));
        }
        if max_weight == Some(0) {
            return Err(ConfigurationError::InvalidMaxWeight(0));
        }
        classifier::validate(method, config)?;

        let timestamp = clock.now_micros();
        let mut audit_log = AuditLog::new(authority.public_key());
        audit_log
            .record_poll_created(authority, &id, authority.id(), method, choices.len(), max_weight, timestamp)
            .expect("an Authority always carries a signing key");

        tracing::info!(poll_id = %hex::encode(&id), ?method, choice_count = choices.len(), "poll created");

        Ok(Self {
            id,
            choices,
            method,
            authority_id: authority.id().to_vec(),
            authority_public_key: authority.public_key(),
            voting_public_key,
            votes: BTreeMap::new(),
            receipts: BTreeMap::new(),
            created_at: timestamp,
            closed_at: None,
            max_weight,
            audit_log,
        })
    }

    /// This poll's id.
    #[must_use]
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// The frozen choice labels, in the order ballots index into.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// The voting method this poll was created with.
    #[must_use]
    pub fn method(&self) -> VotingMethod {
        self.method
    }

    /// The configured weight cap, if any.
    #[must_use]
    pub fn max_weight(&self) -> Option<u64> {
        self.max_weight
    }

    /// The homomorphic public key ballots are encrypted under.
    #[must_use]
    pub fn voting_public_key(&self) -> &PublicKey {
        &self.voting_public_key
    }

    /// Microsecond timestamp this poll was created.
    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Microsecond timestamp this poll was closed, if it has been.
    #[must_use]
    pub fn closed_at(&self) -> Option<u64> {
        self.closed_at
    }

    /// The poll's audit log.
    #[must_use]
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    /// Number of distinct voters who have cast a ballot so far.
    #[must_use]
    pub fn voter_count(&self) -> usize {
        self.receipts.len()
    }

    /// A read-only view of every stored ballot, keyed by hex-encoded
    /// voter id. The borrow checker enforces that any mutation attempt
    /// fails to compile — there is no mutable accessor.
    #[must_use]
    pub fn get_encrypted_votes(&self) -> &BTreeMap<String, Vec<Ciphertext>> {
        &self.votes
    }

    /// Cast a ballot. Validates `intent` against this poll's method
    /// (delegating to `crate::encoder`), mints a signed receipt, and
    /// records a `VoteCast` audit entry.
    ///
    /// # Errors
    /// Returns [`BallotError::PollClosed`] if the poll is closed,
    /// [`BallotError::AlreadyVoted`] if `voter` already has a receipt, or
    /// one of the encoder's validation errors if `intent` is malformed
    /// for this poll's method.
    pub fn vote<R: CryptoRngCore>(
        &mut self,
        voter: &dyn Member,
        intent: &VoteIntent,
        authority: &Authority,
        clock: &mut MonotonicClock,
        rng: &mut R,
    ) -> Result<VoteReceipt, BallotError> {
        if self.closed_at.is_some() {
            return Err(BallotError::PollClosed);
        }
        let voter_key = hex::encode(voter.id());
        if self.receipts.contains_key(&voter_key) {
            return Err(BallotError::AlreadyVoted);
        }

        let encoded: EncryptedVote = encoder::encode(
            self.method,
            self.choices.len(),
            intent,
            &self.voting_public_key,
            self.max_weight,
            rng,
        )?;
        if encoded.encrypted.len() != self.choices.len() {
            return Err(BallotError::EncryptedPayloadEmpty);
        }

        let timestamp = clock.now_micros();
        let mut nonce = [0u8; 16];
        rng.fill_bytes(&mut nonce);
        let signing_bytes = receipt_signing_bytes(voter.id(), &self.id, timestamp, &nonce);
        let signature = authority
            .sign(&signing_bytes)
            .expect("an Authority always carries a signing key");
        let receipt = VoteReceipt {
            voter_id: voter.id().to_vec(),
            poll_id: self.id.clone(),
            timestamp,
            nonce,
            signature,
        };

        self.votes.insert(voter_key.clone(), encoded.encrypted);
        self.receipts.insert(voter_key, receipt.clone());

        let voter_id_hash = Hash32::digest(voter.id());
        self.audit_log
            .record_vote_cast(authority, &self.id, voter_id_hash, timestamp)
            .expect("an Authority always carries a signing key");

        tracing::debug!(poll_id = %hex::encode(&self.id), voter_count = self.receipts.len(), "vote cast");
        Ok(receipt)
    }

    /// `true` iff `voter` has a recorded receipt and `receipt`'s signature
    /// verifies against the authority's public key over the canonical
    /// receipt fields.
    #[must_use]
    pub fn verify_receipt(&self, voter: &dyn Member, receipt: &VoteReceipt) -> bool {
        let voter_key = hex::encode(voter.id());
        if !self.receipts.contains_key(&voter_key) {
            return false;
        }
        let signing_bytes = receipt_signing_bytes(&receipt.voter_id, &receipt.poll_id, receipt.timestamp, &receipt.nonce);
        self.authority_public_key.verify(&signing_bytes, &receipt.signature)
    }

    /// Close the poll to further ballots.
    ///
    /// # Errors
    /// Returns [`StateError::AlreadyClosed`] on a second invocation.
    pub fn close(&mut self, authority: &Authority, clock: &mut MonotonicClock) -> Result<(), StateError> {
        if self.closed_at.is_some() {
            return Err(StateError::AlreadyClosed);
        }
        let timestamp = clock.now_micros();
        self.closed_at = Some(timestamp);
        self.audit_log
            .record_poll_closed(authority, &self.id, &self.authority_id, self.receipts.len() as u64, timestamp)
            .expect("an Authority always carries a signing key");

        tracing::info!(poll_id = %hex::encode(&self.id), voter_count = self.receipts.len(), "poll closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{homomorphic::generate_keypair_with_default_rng, member::Voter};

    fn new_poll(method: VotingMethod, choices: &[&str]) -> (Poll, Authority, MonotonicClock) {
        let authority = Authority::generate(vec![1]);
        let voting_keys = generate_keypair_with_default_rng();
        let mut clock = MonotonicClock::new();
        let poll = Poll::new(
            vec![0xAA],
            choices.iter().map(|s| (*s).to_string()).collect(),
            method,
            &authority,
            voting_keys.public_key,
            None,
            SecurityOptions::default(),
            &mut clock,
        )
        .unwrap();
        (poll, authority, clock)
    }

    #[test]
    fn rejects_fewer_than_two_choices() {
        let authority = Authority::generate(vec![1]);
        let voting_keys = generate_keypair_with_default_rng();
        let mut clock = MonotonicClock::new();
        let err = Poll::new(
            vec![0xAA],
            vec!["only one".to_string()],
            VotingMethod::Plurality,
            &authority,
            voting_keys.public_key,
            None,
            SecurityOptions::default(),
            &mut clock,
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::ChoicesTooFew(1));
    }

    #[test]
    fn insecure_method_rejected_without_opt_in() {
        let authority = Authority::generate(vec![1]);
        let voting_keys = generate_keypair_with_default_rng();
        let mut clock = MonotonicClock::new();
        let err = Poll::new(
            vec![0xAA],
            vec!["yes".to_string(), "no".to_string()],
            VotingMethod::Consensus,
            &authority,
            voting_keys.public_key,
            None,
            SecurityOptions::default(),
            &mut clock,
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::InsecureMethodRejected);
    }

    #[test]
    fn second_vote_from_same_voter_is_rejected() {
        let (mut poll, authority, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
        let voter = Voter::new(vec![7]);
        let mut rng = crate::crypto::rng::default_rng();
        let intent = VoteIntent {
            choice_index: Some(0),
            ..Default::default()
        };
        poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
        let err = poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap_err();
        assert_eq!(err, BallotError::AlreadyVoted);
    }

    #[test]
    fn vote_after_close_is_rejected() {
        let (mut poll, authority, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
        poll.close(&authority, &mut clock).unwrap();
        let voter = Voter::new(vec![7]);
        let mut rng = crate::crypto::rng::default_rng();
        let intent = VoteIntent {
            choice_index: Some(0),
            ..Default::default()
        };
        let err = poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap_err();
        assert_eq!(err, BallotError::PollClosed);
    }

    #[test]
    fn closing_twice_fails() {
        let (mut poll, authority, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
        poll.close(&authority, &mut clock).unwrap();
        let err = poll.close(&authority, &mut clock).unwrap_err();
        assert_eq!(err, StateError::AlreadyClosed);
    }

    #[test]
    fn receipt_verifies_and_tampering_breaks_it() {
        let (mut poll, authority, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
        let voter = Voter::new(vec![7]);
        let mut rng = crate::crypto::rng::default_rng();
        let intent = VoteIntent {
            choice_index: Some(0),
            ..Default::default()
        };
        let receipt = poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
        assert!(poll.verify_receipt(&voter, &receipt));

        let mut tampered = receipt;
        tampered.timestamp += 1;
        assert!(!poll.verify_receipt(&voter, &tampered));
    }

    #[test]
    fn audit_log_records_creation_vote_and_close() {
        let (mut poll, authority, mut clock) = new_poll(VotingMethod::Plurality, &["A", "B"]);
        let voter = Voter::new(vec![7]);
        let mut rng = crate::crypto::rng::default_rng();
        let intent = VoteIntent {
            choice_index: Some(0),
            ..Default::default()
        };
        poll.vote(&voter, &intent, &authority, &mut clock, &mut rng).unwrap();
        poll.close(&authority, &mut clock).unwrap();

        assert_eq!(poll.audit_log().entries().len(), 3);
        assert!(poll.audit_log().verify_chain());
    }
}
