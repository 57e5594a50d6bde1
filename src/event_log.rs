//! C7 — Event logger.
//!
//! A broader, sequence-numbered event taxonomy than the audit log (C6):
//! in addition to the three lifecycle events, it also records
//! `VoteVerified`, `TallyComputed` and `AuditRequested` — operational
//! events useful for monitoring and replay that the audit log's
//! narrower, authority-signed chain deliberately does not carry.
//!
//! Unlike [`crate::audit::AuditLog`], entries here are not individually
//! signed or hash-chained; the contract is purely sequence monotonicity
//! plus a self-describing binary export.

use serde_json::Value;

use crate::{crypto::hash::Hash32, wire};

/// The six kinds of event this logger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// A poll was constructed.
    PollCreated,
    /// A ballot was cast.
    VoteCast,
    /// A poll was closed to further ballots.
    PollClosed,
    /// A receipt was checked against the poll's records.
    VoteVerified,
    /// A tally run completed.
    TallyComputed,
    /// An external party requested an audit of the log.
    AuditRequested,
}

impl EventType {
    fn as_str(self) -> &'static str {
        match self {
            Self::PollCreated => "PollCreated",
            Self::VoteCast => "VoteCast",
            Self::PollClosed => "PollClosed",
            Self::VoteVerified => "VoteVerified",
            Self::TallyComputed => "TallyComputed",
            Self::AuditRequested => "AuditRequested",
        }
    }
}

/// One entry in the event log.
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    /// Position in the log; must equal this entry's index.
    pub sequence: u64,
    /// The kind of event.
    pub event_type: EventType,
    /// Microsecond timestamp.
    pub timestamp: u64,
    /// The poll this event concerns.
    pub poll_id: Vec<u8>,
    /// The id of whoever created the poll, on `PollCreated`.
    pub creator_id: Option<Vec<u8>>,
    /// An opaque per-voter token, on `VoteCast`/`VoteVerified`.
    pub voter_token: Option<Vec<u8>>,
    /// Free-form JSON configuration detail.
    pub configuration: Option<Value>,
    /// The hash of a published tally, on `TallyComputed`.
    pub tally_hash: Option<Hash32>,
    /// Free-form JSON metadata.
    pub metadata: Option<Value>,
}

/// A single event submitted to [`EventLogger::record`], with every
/// optional field defaulting to absent.
#[derive(Debug, Clone, Default)]
pub struct EventFields {
    /// See [`EventLogEntry::creator_id`].
    pub creator_id: Option<Vec<u8>>,
    /// See [`EventLogEntry::voter_token`].
    pub voter_token: Option<Vec<u8>>,
    /// See [`EventLogEntry::configuration`].
    pub configuration: Option<Value>,
    /// See [`EventLogEntry::tally_hash`].
    pub tally_hash: Option<Hash32>,
    /// See [`EventLogEntry::metadata`].
    pub metadata: Option<Value>,
}

/// Sequence-numbered, append-only event stream with a binary export.
#[derive(Debug, Clone, Default)]
pub struct EventLogger {
    entries: Vec<EventLogEntry>,
}

impl EventLogger {
    /// Construct an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, in sequence order.
    #[must_use]
    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    /// Append an event, returning the entry just recorded.
    pub fn record(&mut self, event_type: EventType, poll_id: &[u8], timestamp: u64, fields: EventFields) -> &EventLogEntry {
        let sequence = self.entries.len() as u64;
        self.entries.push(EventLogEntry {
            sequence,
            event_type,
            timestamp,
            poll_id: poll_id.to_vec(),
            creator_id: fields.creator_id,
            voter_token: fields.voter_token,
            configuration: fields.configuration,
            tally_hash: fields.tally_hash,
            metadata: fields.metadata,
        });
        self.entries.last().expect("just pushed")
    }

    /// `true` iff `entries[i].sequence == i` for every recorded entry;
    /// always true for a logger only ever mutated through
    /// [`record`](Self::record), but exposed so a log rebuilt from an
    /// untrusted export can be checked before use.
    #[must_use]
    pub fn verify_sequence(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, e)| e.sequence == i as u64)
    }

    /// Serialize to the self-describing binary export format.
    #[must_use]
    pub fn export(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        wire::write_u64(&mut buf, self.entries.len() as u64);
        for entry in &self.entries {
            encode_entry(&mut buf, entry);
        }
        buf
    }

    /// Decode a logger previously produced by [`export`](Self::export).
    ///
    /// # Errors
    /// Returns an error if `bytes` is truncated or malformed.
    pub fn import(bytes: &[u8]) -> anyhow::Result<Self> {
        let mut cursor = bytes;
        let count = wire::read_u64(&mut cursor)?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(decode_entry(&mut cursor)?);
        }
        Ok(Self { entries })
    }
}

fn encode_entry(buf: &mut Vec<u8>, entry: &EventLogEntry) {
    wire::write_u64(buf, entry.sequence);
    wire::write_u64(buf, entry.timestamp);
    wire::write_str(buf, entry.event_type.as_str());
    wire::write_bytes(buf, &entry.poll_id);
    wire::write_optional(buf, entry.creator_id.as_deref());
    wire::write_optional(buf, entry.voter_token.as_deref());
    let configuration_json = entry.configuration.as_ref().map(Value::to_string);
    wire::write_optional(buf, configuration_json.as_deref().map(str::as_bytes));
    wire::write_optional(buf, entry.tally_hash.as_ref().map(Hash32::as_bytes).map(|b| b.as_slice()));
    let metadata_json = entry.metadata.as_ref().map(Value::to_string);
    wire::write_optional(buf, metadata_json.as_deref().map(str::as_bytes));
}

fn decode_entry(cursor: &mut &[u8]) -> anyhow::Result<EventLogEntry> {
    let sequence = wire::read_u64(cursor)?;
    let timestamp = wire::read_u64(cursor)?;
    let event_type = parse_event_type(&wire::read_str(cursor)?)?;
    let poll_id = wire::read_bytes(cursor)?;
    let creator_id = wire::read_optional(cursor)?;
    let voter_token = wire::read_optional(cursor)?;
    let configuration = wire::read_optional(cursor)?
        .map(|bytes| serde_json::from_slice(&bytes))
        .transpose()?;
    let tally_hash = wire::read_optional(cursor)?
        .map(|bytes| -> anyhow::Result<Hash32> {
            let array: [u8; 32] = bytes.try_into().map_err(|_| anyhow::anyhow!("tallyHash must be 32 bytes"))?;
            Ok(Hash32(array))
        })
        .transpose()?;
    let metadata = wire::read_optional(cursor)?
        .map(|bytes| serde_json::from_slice(&bytes))
        .transpose()?;

    Ok(EventLogEntry {
        sequence,
        event_type,
        timestamp,
        poll_id,
        creator_id,
        voter_token,
        configuration,
        tally_hash,
        metadata,
    })
}

fn parse_event_type(s: &str) -> anyhow::Result<EventType> {
    Ok(match s {
        "PollCreated" => EventType::PollCreated,
        "VoteCast" => EventType::VoteCast,
        "PollClosed" => EventType::PollClosed,
        "VoteVerified" => EventType::VoteVerified,
        "TallyComputed" => EventType::TallyComputed,
        "AuditRequested" => EventType::AuditRequested,
        other => anyhow::bail!("unknown event type: {other}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let mut log = EventLogger::new();
        log.record(EventType::PollCreated, b"poll-1", 1, EventFields::default());
        log.record(EventType::VoteCast, b"poll-1", 2, EventFields::default());
        log.record(EventType::PollClosed, b"poll-1", 3, EventFields::default());
        assert!(log.verify_sequence());
        assert_eq!(log.entries()[2].sequence, 2);
    }

    #[test]
    fn export_import_round_trips_optional_fields() {
        let mut log = EventLogger::new();
        log.record(
            EventType::TallyComputed,
            b"poll-1",
            5,
            EventFields {
                tally_hash: Some(Hash32::digest(b"tally")),
                metadata: Some(serde_json::json!({"winner": 0})),
                ..Default::default()
            },
        );
        let bytes = log.export();
        let imported = EventLogger::import(&bytes).unwrap();
        assert_eq!(imported.entries().len(), 1);
        assert_eq!(imported.entries()[0].tally_hash, Some(Hash32::digest(b"tally")));
        assert_eq!(imported.entries()[0].metadata, Some(serde_json::json!({"winner": 0})));
    }

    #[test]
    fn export_import_round_trips_absent_optional_fields() {
        let mut log = EventLogger::new();
        log.record(EventType::PollCreated, b"poll-1", 1, EventFields::default());
        let bytes = log.export();
        let imported = EventLogger::import(&bytes).unwrap();
        assert_eq!(imported.entries()[0].creator_id, None);
        assert_eq!(imported.entries()[0].metadata, None);
    }
}
