//! C6 — Audit log.
//!
//! Append-only, authority-signed, hash-chained record of `PollCreated`,
//! `VoteCast` and `PollClosed` events. Every entry commits to its
//! predecessor's hash, so tampering with any entry's fields or breaking
//! the link is detectable by [`AuditLog::verify_chain`] without needing
//! to trust the storage medium.
//!
//! Verification is decomposed into separately-erroring checks rather
//! than one opaque boolean, so a caller auditing a rejected chain can
//! say *why* — while integrity errors still surface as `verify*`
//! returning false at the top-level `verify_chain`/`verify_entry` calls.

use serde_json::Value;

use crate::{
    classifier::VotingMethod,
    crypto::{
        ed25519::{PublicKey, Signature},
        hash::Hash32,
    },
    error::IntegrityViolation,
    member::Member,
    wire,
};

/// The three events the audit log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventType {
    /// A poll was constructed.
    PollCreated,
    /// A ballot was cast.
    VoteCast,
    /// A poll was closed to further ballots.
    PollClosed,
}

impl AuditEventType {
    fn as_str(self) -> &'static str {
        match self {
            Self::PollCreated => "PollCreated",
            Self::VoteCast => "VoteCast",
            Self::PollClosed => "PollClosed",
        }
    }
}

/// One hash-chained, signed entry in the audit log.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,
    /// The kind of event this entry records.
    pub event_type: AuditEventType,
    /// Microsecond timestamp, non-decreasing across entries.
    pub timestamp: u64,
    /// The poll this entry concerns.
    pub poll_id: Vec<u8>,
    /// Anonymized digest of the voting member's id, present on `VoteCast`.
    pub voter_id_hash: Option<Hash32>,
    /// The poll authority's id, present on `PollCreated`/`PollClosed`.
    pub authority_id: Option<Vec<u8>>,
    /// `entryHash` of the preceding entry, or [`Hash32::ZERO`] for entry 0.
    pub previous_hash: Hash32,
    /// `H(serialize(entry without hash/signature))`.
    pub entry_hash: Hash32,
    /// Authority signature over the serialized entry concatenated with `entry_hash`.
    pub signature: Signature,
    /// Event-specific detail (method/choiceCount/maxWeight, voterCount/closedAt, ...).
    pub metadata: Option<Value>,
}

/// The audit log could not record an entry because the supplied signer
/// carries no signing capability (`Member::sign` returned `None`).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("audit log signer has no signing capability")]
pub struct NoSigningCapability;

/// Append-only, hash-chained, authority-signed event stream.
#[derive(Debug, Clone)]
pub struct AuditLog {
    authority_public_key: PublicKey,
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Construct an empty log that will verify signatures against
    /// `authority_public_key`.
    #[must_use]
    pub fn new(authority_public_key: PublicKey) -> Self {
        Self {
            authority_public_key,
            entries: Vec::new(),
        }
    }

    /// All entries, in sequence order.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Entries concerning a single poll, in sequence order.
    #[must_use]
    pub fn entries_for_poll(&self, poll_id: &[u8]) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.poll_id == poll_id).collect()
    }

    /// Append a `PollCreated` entry.
    ///
    /// # Errors
    /// Returns [`NoSigningCapability`] if `signer` cannot sign.
    pub fn record_poll_created(
        &mut self,
        signer: &dyn Member,
        poll_id: &[u8],
        authority_id: &[u8],
        method: VotingMethod,
        choice_count: usize,
        max_weight: Option<u64>,
        timestamp: u64,
    ) -> Result<&AuditEntry, NoSigningCapability> {
        let metadata = serde_json::json!({
            "method": format!("{method:?}"),
            "choiceCount": choice_count,
            "maxWeight": max_weight,
        });
        self.append(
            signer,
            AuditEventType::PollCreated,
            timestamp,
            poll_id,
            None,
            Some(authority_id),
            Some(metadata),
        )
    }

    /// Append a `VoteCast` entry.
    ///
    /// # Errors
    /// Returns [`NoSigningCapability`] if `signer` cannot sign.
    pub fn record_vote_cast(
        &mut self,
        signer: &dyn Member,
        poll_id: &[u8],
        voter_id_hash: Hash32,
        timestamp: u64,
    ) -> Result<&AuditEntry, NoSigningCapability> {
        self.append(
            signer,
            AuditEventType::VoteCast,
            timestamp,
            poll_id,
            Some(voter_id_hash),
            None,
            None,
        )
    }

    /// Append a `PollClosed` entry.
    ///
    /// # Errors
    /// Returns [`NoSigningCapability`] if `signer` cannot sign.
    pub fn record_poll_closed(
        &mut self,
        signer: &dyn Member,
        poll_id: &[u8],
        authority_id: &[u8],
        voter_count: u64,
        timestamp: u64,
    ) -> Result<&AuditEntry, NoSigningCapability> {
        let metadata = serde_json::json!({
            "voterCount": voter_count,
            "closedAt": timestamp,
        });
        self.append(
            signer,
            AuditEventType::PollClosed,
            timestamp,
            poll_id,
            None,
            Some(authority_id),
            Some(metadata),
        )
    }

    fn append(
        &mut self,
        signer: &dyn Member,
        event_type: AuditEventType,
        timestamp: u64,
        poll_id: &[u8],
        voter_id_hash: Option<Hash32>,
        authority_id: Option<&[u8]>,
        metadata: Option<Value>,
    ) -> Result<&AuditEntry, NoSigningCapability> {
        let sequence = self.entries.len() as u64;
        let previous_hash = self.entries.last().map_or(Hash32::ZERO, |e| e.entry_hash);
        let authority_id = authority_id.map(<[u8]>::to_vec);

        let serialized = serialize_for_hash(
            sequence,
            event_type,
            timestamp,
            poll_id,
            previous_hash,
            voter_id_hash,
            authority_id.as_deref(),
            metadata.as_ref(),
        );
        let entry_hash = Hash32::digest(&serialized);

        let mut signing_input = serialized;
        signing_input.extend_from_slice(entry_hash.as_bytes());
        let signature = signer.sign(&signing_input).ok_or(NoSigningCapability)?;

        self.entries.push(AuditEntry {
            sequence,
            event_type,
            timestamp,
            poll_id: poll_id.to_vec(),
            voter_id_hash,
            authority_id,
            previous_hash,
            entry_hash,
            signature,
            metadata,
        });
        Ok(self.entries.last().expect("just pushed"))
    }

    /// Verify a single entry's hash and signature, independent of its
    /// position in the chain.
    #[must_use]
    pub fn verify_entry(&self, entry: &AuditEntry) -> bool {
        self.verify_entry_detailed(entry).is_ok()
    }

    /// Like [`verify_entry`](Self::verify_entry), but reports *why* a
    /// failing entry failed instead of collapsing to a `bool`.
    ///
    /// # Errors
    /// Returns [`IntegrityViolation::AuditChainBroken`] if the entry's
    /// recomputed hash does not match its stored `entry_hash`, or
    /// [`IntegrityViolation::AuditSignatureInvalid`] if the hash matches
    /// but the authority signature does not verify.
    pub fn verify_entry_detailed(&self, entry: &AuditEntry) -> Result<(), IntegrityViolation> {
        let serialized = serialize_for_hash(
            entry.sequence,
            entry.event_type,
            entry.timestamp,
            &entry.poll_id,
            entry.previous_hash,
            entry.voter_id_hash,
            entry.authority_id.as_deref(),
            entry.metadata.as_ref(),
        );
        if Hash32::digest(&serialized) != entry.entry_hash {
            return Err(IntegrityViolation::AuditChainBroken(entry.sequence));
        }
        let mut signing_input = serialized;
        signing_input.extend_from_slice(entry.entry_hash.as_bytes());
        if !self.authority_public_key.verify(&signing_input, &entry.signature) {
            return Err(IntegrityViolation::AuditSignatureInvalid(entry.sequence));
        }
        Ok(())
    }

    /// Recompute every entry's hash, confirm the chain links to its
    /// predecessor, and verify every signature.
    #[must_use]
    pub fn verify_chain(&self) -> bool {
        self.verify_chain_detailed().is_ok()
    }

    /// Like [`verify_chain`](Self::verify_chain), but reports the first
    /// violation found instead of collapsing to a `bool`.
    ///
    /// # Errors
    /// Returns [`IntegrityViolation::AuditChainBroken`] if an entry's
    /// `previous_hash` does not link to its predecessor,
    /// [`IntegrityViolation::SequenceGap`] if an entry's `sequence` does
    /// not match its position, or an error from
    /// [`verify_entry_detailed`](Self::verify_entry_detailed) for the
    /// first entry that fails its own hash or signature check.
    pub fn verify_chain_detailed(&self) -> Result<(), IntegrityViolation> {
        for (i, entry) in self.entries.iter().enumerate() {
            let expected_previous = if i == 0 {
                Hash32::ZERO
            } else {
                self.entries[i - 1].entry_hash
            };
            if entry.previous_hash != expected_previous {
                return Err(IntegrityViolation::AuditChainBroken(entry.sequence));
            }
            if entry.sequence != i as u64 {
                return Err(IntegrityViolation::SequenceGap(i as u64));
            }
            self.verify_entry_detailed(entry)?;
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn serialize_for_hash(
    sequence: u64,
    event_type: AuditEventType,
    timestamp: u64,
    poll_id: &[u8],
    previous_hash: Hash32,
    voter_id_hash: Option<Hash32>,
    authority_id: Option<&[u8]>,
    metadata: Option<&Value>,
) -> Vec<u8> {
    let mut buf = Vec::new();
    wire::write_u64(&mut buf, sequence);
    wire::write_str(&mut buf, event_type.as_str());
    wire::write_u64(&mut buf, timestamp);
    wire::write_bytes(&mut buf, poll_id);
    buf.extend_from_slice(previous_hash.as_bytes());
    wire::write_optional(&mut buf, voter_id_hash.map(|h| *h.as_bytes()).as_ref().map(|b| b.as_slice()));
    wire::write_optional(&mut buf, authority_id);
    let metadata_json = metadata.map(|m| m.to_string());
    wire::write_optional(&mut buf, metadata_json.as_deref().map(str::as_bytes));
    buf
}
