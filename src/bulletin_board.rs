//! C8 — Bulletin board.
//!
//! Append-only, per-poll-queryable public registry of encrypted votes and
//! tally proofs, Merkle-committed and signed. Anyone
//! holding the exported bytes can recompute every hash, the Merkle root,
//! and verify every signature without ever seeing a private key — this
//! is the artifact a third party audits to confirm an election's
//! integrity end to end.

use anyhow::{Context, Result};

use crate::{
    crypto::{
        ed25519::{PublicKey, Signature},
        hash::Hash32,
    },
    error::IntegrityViolation,
    homomorphic::Ciphertext,
    member::Member,
    merkle,
    wire,
};

/// One published ballot.
#[derive(Debug, Clone)]
pub struct BulletinBoardEntry {
    /// Position in the bulletin board, starting at 0.
    pub sequence: u64,
    /// Microsecond timestamp of publication.
    pub timestamp: u64,
    /// The poll this ballot belongs to.
    pub poll_id: Vec<u8>,
    /// The ballot's ciphertext vector, one slot per choice.
    pub encrypted_vote: Vec<Ciphertext>,
    /// Anonymized digest of the voter's id.
    pub voter_id_hash: Hash32,
    /// Merkle root over every *prior* entry's `entry_hash` (zero for entry 0).
    pub merkle_root: Hash32,
    /// `H(sequence | timestamp | pollId | voterIdHash | merkleRoot | ciphertexts)`.
    pub entry_hash: Hash32,
    /// Authority signature over `entry_hash`.
    pub signature: Signature,
}

/// A published tally, binding the decrypted result to the ballots it was
/// computed from.
#[derive(Debug, Clone)]
pub struct TallyProof {
    /// The poll this tally belongs to.
    pub poll_id: Vec<u8>,
    /// Per-choice tallies, in the poll's choice order.
    pub tallies: Vec<u64>,
    /// The poll's choice labels, carried alongside the tallies so a
    /// verifier does not need the original `Poll` to interpret them.
    pub choices: Vec<String>,
    /// Microsecond timestamp of publication.
    pub timestamp: u64,
    /// `H(concat(all ciphertexts))` — binds the proof to the exact ballots tallied.
    pub votes_hash: Hash32,
    /// `H(ciphertexts ‖ tallies)` — a binding commitment, *not* a
    /// zero-knowledge proof of correct decryption. This is a deliberate
    /// placeholder for a real argument (e.g. a Chaum–Pedersen/DLEQ proof
    /// over the tallier's private key) that would replace only this
    /// field and [`verify_tally_proof`] — every other part of this
    /// struct and the bulletin board's publication flow is unchanged.
    pub decryption_proof: Hash32,
    /// Authority signature over `decryption_proof`.
    pub signature: Signature,
}

/// Append-only, Merkle-committed, signed registry of ballots and tallies.
#[derive(Debug, Clone)]
pub struct BulletinBoard {
    authority_public_key: PublicKey,
    entries: Vec<BulletinBoardEntry>,
    tally_proofs: Vec<TallyProof>,
}

impl BulletinBoard {
    /// Construct an empty board that verifies signatures against
    /// `authority_public_key`.
    #[must_use]
    pub fn new(authority_public_key: PublicKey) -> Self {
        Self {
            authority_public_key,
            entries: Vec::new(),
            tally_proofs: Vec::new(),
        }
    }

    /// All published entries, in sequence order.
    #[must_use]
    pub fn entries(&self) -> &[BulletinBoardEntry] {
        &self.entries
    }

    /// All published tally proofs, in publication order.
    #[must_use]
    pub fn tally_proofs(&self) -> &[TallyProof] {
        &self.tally_proofs
    }

    /// Entries published for a single poll.
    #[must_use]
    pub fn entries_for_poll(&self, poll_id: &[u8]) -> Vec<&BulletinBoardEntry> {
        self.entries.iter().filter(|e| e.poll_id == poll_id).collect()
    }

    /// Publish an encrypted ballot.
    ///
    /// # Errors
    /// Returns an error if `signer` has no signing capability.
    pub fn publish_vote(
        &mut self,
        signer: &dyn Member,
        poll_id: &[u8],
        encrypted_vote: Vec<Ciphertext>,
        voter_id_hash: Hash32,
        timestamp: u64,
    ) -> Result<&BulletinBoardEntry> {
        let sequence = self.entries.len() as u64;
        let merkle_root = self.compute_merkle_root();

        let hash_input = entry_hash_input(sequence, timestamp, poll_id, voter_id_hash, merkle_root, &encrypted_vote);
        let entry_hash = Hash32::digest(&hash_input);
        let signature = signer
            .sign(entry_hash.as_bytes())
            .context("bulletin board signer has no signing capability")?;

        self.entries.push(BulletinBoardEntry {
            sequence,
            timestamp,
            poll_id: poll_id.to_vec(),
            encrypted_vote,
            voter_id_hash,
            merkle_root,
            entry_hash,
            signature,
        });
        Ok(self.entries.last().expect("just pushed"))
    }

    /// Publish a tally proof binding a decrypted result to the ballots it
    /// was computed from.
    ///
    /// # Errors
    /// Returns an error if `signer` has no signing capability.
    pub fn publish_tally(
        &mut self,
        signer: &dyn Member,
        poll_id: &[u8],
        tallies: Vec<u64>,
        choices: Vec<String>,
        encrypted_votes: &[Vec<Ciphertext>],
        timestamp: u64,
    ) -> Result<&TallyProof> {
        let votes_hash = hash_ciphertexts(encrypted_votes.iter().flatten());
        let decryption_proof = decryption_proof_hash(encrypted_votes.iter().flatten(), &tallies);
        let signature = signer
            .sign(decryption_proof.as_bytes())
            .context("bulletin board signer has no signing capability")?;

        self.tally_proofs.push(TallyProof {
            poll_id: poll_id.to_vec(),
            tallies,
            choices,
            timestamp,
            votes_hash,
            decryption_proof,
            signature,
        });
        Ok(self.tally_proofs.last().expect("just pushed"))
    }

    /// Recompute `entry.entry_hash` and verify its signature. Does not
    /// re-derive `entry.merkle_root` against the board's current history —
    /// use [`verify_merkle_tree`](Self::verify_merkle_tree) for that.
    #[must_use]
    pub fn verify_entry(&self, entry: &BulletinBoardEntry) -> bool {
        self.verify_entry_detailed(entry).is_ok()
    }

    /// Like [`verify_entry`](Self::verify_entry), but reports *why* a
    /// failing entry failed instead of collapsing to a `bool`.
    ///
    /// # Errors
    /// Returns [`IntegrityViolation::BulletinEntryTampered`] if the
    /// entry's recomputed hash does not match its stored `entry_hash`, or
    /// if the hash matches but the authority signature does not verify.
    pub fn verify_entry_detailed(&self, entry: &BulletinBoardEntry) -> Result<(), IntegrityViolation> {
        let hash_input = entry_hash_input(
            entry.sequence,
            entry.timestamp,
            &entry.poll_id,
            entry.voter_id_hash,
            entry.merkle_root,
            &entry.encrypted_vote,
        );
        if Hash32::digest(&hash_input) != entry.entry_hash {
            return Err(IntegrityViolation::BulletinEntryTampered(entry.sequence));
        }
        if !self.authority_public_key.verify(entry.entry_hash.as_bytes(), &entry.signature) {
            return Err(IntegrityViolation::BulletinEntryTampered(entry.sequence));
        }
        Ok(())
    }

    /// Verify a tally proof's hashes and signature against the ballots it
    /// claims to summarize.
    #[must_use]
    pub fn verify_tally_proof(&self, proof: &TallyProof, encrypted_votes: &[Vec<Ciphertext>]) -> bool {
        self.verify_tally_proof_detailed(proof, encrypted_votes).is_ok()
    }

    /// Like [`verify_tally_proof`](Self::verify_tally_proof), but reports
    /// *why* a failing proof failed instead of collapsing to a `bool`.
    ///
    /// # Errors
    /// Returns [`IntegrityViolation::TallyProofInvalid`] if `votes_hash`
    /// or `decryption_proof` does not match `encrypted_votes`, or if the
    /// authority signature over `decryption_proof` does not verify.
    pub fn verify_tally_proof_detailed(&self, proof: &TallyProof, encrypted_votes: &[Vec<Ciphertext>]) -> Result<(), IntegrityViolation> {
        let votes_hash = hash_ciphertexts(encrypted_votes.iter().flatten());
        let decryption_proof = decryption_proof_hash(encrypted_votes.iter().flatten(), &proof.tallies);
        if votes_hash != proof.votes_hash || decryption_proof != proof.decryption_proof {
            return Err(IntegrityViolation::TallyProofInvalid);
        }
        if !self.authority_public_key.verify(proof.decryption_proof.as_bytes(), &proof.signature) {
            return Err(IntegrityViolation::TallyProofInvalid);
        }
        Ok(())
    }

    /// For every entry, confirm its stored `merkle_root` equals the root
    /// over all *prior* entries' `entry_hash`, and that the board's own
    /// [`compute_merkle_root`](Self::compute_merkle_root) matches the root
    /// over every entry published so far.
    #[must_use]
    pub fn verify_merkle_tree(&self) -> bool {
        self.verify_merkle_tree_detailed().is_ok()
    }

    /// Like [`verify_merkle_tree`](Self::verify_merkle_tree), but reports
    /// the first mismatched entry instead of collapsing to a `bool`.
    ///
    /// # Errors
    /// Returns [`IntegrityViolation::MerkleRootMismatch`] if any entry's
    /// stored `merkle_root` does not equal the root over its prior
    /// entries' `entry_hash` values.
    pub fn verify_merkle_tree_detailed(&self) -> Result<(), IntegrityViolation> {
        for (i, entry) in self.entries.iter().enumerate() {
            let prior_hashes: Vec<Hash32> = self.entries[..i].iter().map(|e| e.entry_hash).collect();
            if merkle::merkle_root(&prior_hashes) != entry.merkle_root {
                return Err(IntegrityViolation::MerkleRootMismatch);
            }
        }
        Ok(())
    }

    /// The Merkle root over every entry currently published, hex-encoded.
    #[must_use]
    pub fn compute_merkle_root_hex(&self) -> String {
        self.compute_merkle_root().to_hex()
    }

    fn compute_merkle_root(&self) -> Hash32 {
        let hashes: Vec<Hash32> = self.entries.iter().map(|e| e.entry_hash).collect();
        merkle::merkle_root(&hashes)
    }

    /// Serialize the whole board to the length-prefixed binary export
    /// format.
    #[must_use]
    pub fn export(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        wire::write_u64(&mut buf, self.entries.len() as u64);
        for entry in &self.entries {
            encode_entry(&mut buf, entry);
        }
        wire::write_u64(&mut buf, self.tally_proofs.len() as u64);
        for proof in &self.tally_proofs {
            encode_tally_proof(&mut buf, proof);
        }
        buf
    }

    /// Decode a board previously produced by [`export`](Self::export),
    /// re-verifying nothing — callers should run
    /// [`verify_merkle_tree`](Self::verify_merkle_tree) and
    /// [`verify_entry`](Self::verify_entry) on the result before trusting it.
    ///
    /// # Errors
    /// Returns an error if `bytes` is truncated or malformed.
    pub fn import(authority_public_key: PublicKey, bytes: &[u8]) -> Result<Self> {
        let mut cursor = bytes;
        let entry_count = wire::read_u64(&mut cursor)?;
        let mut entries = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            entries.push(decode_entry(&mut cursor)?);
        }
        let proof_count = wire::read_u64(&mut cursor)?;
        let mut tally_proofs = Vec::with_capacity(proof_count as usize);
        for _ in 0..proof_count {
            tally_proofs.push(decode_tally_proof(&mut cursor)?);
        }
        Ok(Self {
            authority_public_key,
            entries,
            tally_proofs,
        })
    }
}

fn entry_hash_input(
    sequence: u64,
    timestamp: u64,
    poll_id: &[u8],
    voter_id_hash: Hash32,
    merkle_root: Hash32,
    encrypted_vote: &[Ciphertext],
) -> Vec<u8> {
    let mut buf = Vec::new();
    wire::write_u64(&mut buf, sequence);
    wire::write_u64(&mut buf, timestamp);
    wire::write_bytes(&mut buf, poll_id);
    buf.extend_from_slice(voter_id_hash.as_bytes());
    buf.extend_from_slice(merkle_root.as_bytes());
    for c in encrypted_vote {
        buf.extend_from_slice(&c.to_bytes());
    }
    buf
}

fn hash_ciphertexts<'a>(ciphertexts: impl Iterator<Item = &'a Ciphertext>) -> Hash32 {
    let mut buf = Vec::new();
    for c in ciphertexts {
        buf.extend_from_slice(&c.to_bytes());
    }
    Hash32::digest(&buf)
}

fn decryption_proof_hash<'a>(ciphertexts: impl Iterator<Item = &'a Ciphertext>, tallies: &[u64]) -> Hash32 {
    let mut buf = Vec::new();
    for c in ciphertexts {
        buf.extend_from_slice(&c.to_bytes());
    }
    for &t in tallies {
        wire::write_u64(&mut buf, t);
    }
    Hash32::digest(&buf)
}

fn encode_entry(buf: &mut Vec<u8>, entry: &BulletinBoardEntry) {
    wire::write_u64(buf, entry.sequence);
    wire::write_u64(buf, entry.timestamp);
    wire::write_bytes(buf, &entry.poll_id);
    wire::write_u64(buf, entry.encrypted_vote.len() as u64);
    for c in &entry.encrypted_vote {
        buf.extend_from_slice(&c.to_bytes());
    }
    wire::write_bytes(buf, entry.voter_id_hash.as_bytes());
    wire::write_bytes(buf, entry.merkle_root.as_bytes());
    wire::write_bytes(buf, entry.entry_hash.as_bytes());
    wire::write_bytes(buf, &entry.signature.to_bytes());
}

fn decode_entry(cursor: &mut &[u8]) -> Result<BulletinBoardEntry> {
    let sequence = wire::read_u64(cursor)?;
    let timestamp = wire::read_u64(cursor)?;
    let poll_id = wire::read_bytes(cursor)?;

    let ciphertext_count = wire::read_u64(cursor)?;
    let mut encrypted_vote = Vec::with_capacity(ciphertext_count as usize);
    for _ in 0..ciphertext_count {
        let bytes: [u8; Ciphertext::BYTES_SIZE] = wire::read_fixed(cursor)?;
        encrypted_vote.push(Ciphertext::from_bytes(&bytes)?);
    }

    let voter_id_hash = Hash32(fixed_32(&wire::read_bytes(cursor)?)?);
    let merkle_root = Hash32(fixed_32(&wire::read_bytes(cursor)?)?);
    let entry_hash = Hash32(fixed_32(&wire::read_bytes(cursor)?)?);
    let signature_bytes = wire::read_bytes(cursor)?;
    let signature = Signature::from_bytes(&fixed_64(&signature_bytes)?);

    Ok(BulletinBoardEntry {
        sequence,
        timestamp,
        poll_id,
        encrypted_vote,
        voter_id_hash,
        merkle_root,
        entry_hash,
        signature,
    })
}

fn encode_tally_proof(buf: &mut Vec<u8>, proof: &TallyProof) {
    wire::write_bytes(buf, &proof.poll_id);
    wire::write_u64(buf, proof.tallies.len() as u64);
    for &t in &proof.tallies {
        wire::write_u64(buf, t);
    }
    wire::write_u64(buf, proof.choices.len() as u64);
    for choice in &proof.choices {
        wire::write_str(buf, choice);
    }
    wire::write_u64(buf, proof.timestamp);
    wire::write_bytes(buf, proof.votes_hash.as_bytes());
    wire::write_bytes(buf, proof.decryption_proof.as_bytes());
    wire::write_bytes(buf, &proof.signature.to_bytes());
}

fn decode_tally_proof(cursor: &mut &[u8]) -> Result<TallyProof> {
    let poll_id = wire::read_bytes(cursor)?;
    let tally_count = wire::read_u64(cursor)?;
    let mut tallies = Vec::with_capacity(tally_count as usize);
    for _ in 0..tally_count {
        tallies.push(wire::read_u64(cursor)?);
    }
    let choice_count = wire::read_u64(cursor)?;
    let mut choices = Vec::with_capacity(choice_count as usize);
    for _ in 0..choice_count {
        choices.push(wire::read_str(cursor)?);
    }
    let timestamp = wire::read_u64(cursor)?;
    let votes_hash = Hash32(fixed_32(&wire::read_bytes(cursor)?)?);
    let decryption_proof = Hash32(fixed_32(&wire::read_bytes(cursor)?)?);
    let signature_bytes = wire::read_bytes(cursor)?;
    let signature = Signature::from_bytes(&fixed_64(&signature_bytes)?);

    Ok(TallyProof {
        poll_id,
        tallies,
        choices,
        timestamp,
        votes_hash,
        decryption_proof,
        signature,
    })
}

fn fixed_32(bytes: &[u8]) -> Result<[u8; 32]> {
    bytes.try_into().context("expected a 32-byte field")
}

fn fixed_64(bytes: &[u8]) -> Result<[u8; 64]> {
    bytes.try_into().context("expected a 64-byte field")
}
