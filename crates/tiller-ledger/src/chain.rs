//! [`AuditLedger`] – append-only hash-chained audit log.
//!
//! Every committed tick appends a fixed set of entries. Each entry's `hash`
//! covers the entry's own content *and* the hash of its predecessor, so
//! editing, dropping, or reordering any historical entry breaks every hash
//! after it. The first entry links to [`GENESIS_HASH`].
//!
//! # Hash material
//!
//! SHA-256 (hex-encoded) over the compact JSON serialization of an object
//! with these keys:
//!
//! | key         | value                                   |
//! |-------------|-----------------------------------------|
//! | `id`        | entry UUID                              |
//! | `tick`      | owning tick                             |
//! | `timestamp` | RFC-3339 UTC commit time                |
//! | `kind`      | entry kind label (e.g. `"risk"`)        |
//! | `payload`   | the opaque payload object               |
//! | `prev_hash` | the predecessor's hash                  |
//!
//! `serde_json` keeps object keys lexicographically ordered, so the same
//! logical content always serializes to the same bytes and therefore the
//! same hash.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use serde_json::json;
//! use tiller_ledger::AuditLedger;
//!
//! let mut ledger = AuditLedger::new();
//! ledger.append(1, Utc::now(), "frame", json!({ "stream_count": 1 }));
//! ledger.append(1, Utc::now(), "risk", json!({ "score": 12.5 }));
//!
//! assert_eq!(ledger.len(), 2);
//! assert!(ledger.verify().is_ok());
//! ```

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tiller_types::{AuditEntry, TickId};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Genesis sentinel & error type
// ─────────────────────────────────────────────────────────────────────────────

/// The `prev_hash` of the first entry in any chain: 64 zero characters,
/// the width of a hex-encoded SHA-256 digest.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Chain verification failures. Either one means the entry sequence can no
/// longer be trusted; nothing attempts repair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The entry's stored hash does not match the hash recomputed from its
    /// content — the entry itself was altered.
    #[error("entry {index}: stored hash does not match recomputed hash")]
    HashMismatch { index: usize },

    /// The entry's `prev_hash` does not match its predecessor's stored hash —
    /// an entry was altered, inserted, or removed before this point.
    #[error("entry {index}: prev_hash does not match predecessor")]
    LinkMismatch { index: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Hashing
// ─────────────────────────────────────────────────────────────────────────────

fn entry_hash(
    id: &Uuid,
    tick: TickId,
    timestamp: &DateTime<Utc>,
    kind: &str,
    payload: &Value,
    prev_hash: &str,
) -> String {
    let material = json!({
        "id": id,
        "tick": tick,
        "timestamp": timestamp,
        "kind": kind,
        "payload": payload,
        "prev_hash": prev_hash,
    });
    let mut hasher = Sha256::new();
    hasher.update(material.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

// ─────────────────────────────────────────────────────────────────────────────
// AuditLedger
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory append-only hash chain of [`AuditEntry`] records.
///
/// Owned exclusively by one orchestrator instance; there is no update or
/// delete surface. Persistence is the caller's concern — a reloaded entry
/// sequence can be checked with [`verify_entries`] without a ledger.
#[derive(Debug, Default, Clone)]
pub struct AuditLedger {
    entries: Vec<AuditEntry>,
}

impl AuditLedger {
    /// Create an empty ledger whose first entry will link to [`GENESIS_HASH`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `tick`, chaining it to the current head.
    ///
    /// The entry id is freshly generated; the hash is computed over the
    /// canonical form described in the module docs. Returns the stored entry.
    pub fn append(
        &mut self,
        tick: TickId,
        timestamp: DateTime<Utc>,
        kind: &str,
        payload: Value,
    ) -> &AuditEntry {
        let id = Uuid::new_v4();
        let prev_hash = self.head_hash().to_string();
        let hash = entry_hash(&id, tick, &timestamp, kind, &payload, &prev_hash);
        self.entries.push(AuditEntry {
            id,
            tick,
            timestamp,
            kind: kind.to_string(),
            payload,
            prev_hash,
            hash,
        });
        // Just pushed, so the vector is non-empty.
        &self.entries[self.entries.len() - 1]
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of entries in the chain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of the most recent entry, or [`GENESIS_HASH`] for an empty chain.
    pub fn head_hash(&self) -> &str {
        self.entries
            .last()
            .map_or(GENESIS_HASH, |entry| entry.hash.as_str())
    }

    /// Recompute and check the whole chain.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::HashMismatch`] – an entry's content was altered.
    /// - [`LedgerError::LinkMismatch`] – the chain linkage was broken.
    pub fn verify(&self) -> Result<(), LedgerError> {
        verify_entries(&self.entries)
    }
}

/// Verify any entry sequence against its own hashes and linkage, starting
/// from [`GENESIS_HASH`]. Works on sequences held outside a ledger (e.g.
/// entries reloaded after a restart).
///
/// # Errors
///
/// The first violation found, with the offending index: a
/// [`LedgerError::LinkMismatch`] when `prev_hash` disagrees with the
/// predecessor, otherwise a [`LedgerError::HashMismatch`] when the stored
/// hash disagrees with the recomputed one.
pub fn verify_entries(entries: &[AuditEntry]) -> Result<(), LedgerError> {
    let mut prev = GENESIS_HASH;
    for (index, entry) in entries.iter().enumerate() {
        if entry.prev_hash != prev {
            return Err(LedgerError::LinkMismatch { index });
        }
        let recomputed = entry_hash(
            &entry.id,
            entry.tick,
            &entry.timestamp,
            &entry.kind,
            &entry.payload,
            &entry.prev_hash,
        );
        if recomputed != entry.hash {
            return Err(LedgerError::HashMismatch { index });
        }
        prev = entry.hash.as_str();
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_ledger(entries: usize) -> AuditLedger {
        let mut ledger = AuditLedger::new();
        for i in 0..entries {
            ledger.append(1, Utc::now(), "frame", json!({ "seq": i }));
        }
        ledger
    }

    // ── appending ────────────────────────────────────────────────────────────

    #[test]
    fn first_entry_links_to_genesis() {
        let ledger = seeded_ledger(1);
        assert_eq!(ledger.entries()[0].prev_hash, GENESIS_HASH);
    }

    #[test]
    fn entries_link_to_their_predecessor() {
        let ledger = seeded_ledger(3);
        let entries = ledger.entries();
        assert_eq!(entries[1].prev_hash, entries[0].hash);
        assert_eq!(entries[2].prev_hash, entries[1].hash);
    }

    #[test]
    fn head_hash_tracks_last_entry() {
        let mut ledger = AuditLedger::new();
        assert_eq!(ledger.head_hash(), GENESIS_HASH);
        ledger.append(1, Utc::now(), "frame", json!({}));
        assert_eq!(ledger.head_hash(), ledger.entries()[0].hash);
    }

    #[test]
    fn append_returns_the_stored_entry() {
        let mut ledger = AuditLedger::new();
        let hash = ledger
            .append(7, Utc::now(), "risk", json!({ "score": 42.0 }))
            .hash
            .clone();
        assert_eq!(ledger.entries()[0].hash, hash);
        assert_eq!(ledger.entries()[0].tick, 7);
    }

    // ── verification ─────────────────────────────────────────────────────────

    #[test]
    fn empty_chain_verifies() {
        assert!(AuditLedger::new().verify().is_ok());
    }

    #[test]
    fn appended_chain_verifies() {
        assert!(seeded_ledger(5).verify().is_ok());
    }

    #[test]
    fn verify_entries_works_on_detached_slice() {
        let ledger = seeded_ledger(4);
        let detached: Vec<AuditEntry> = ledger.entries().to_vec();
        assert!(verify_entries(&detached).is_ok());
    }

    #[test]
    fn tampered_payload_is_detected() {
        let ledger = seeded_ledger(3);
        let mut entries = ledger.entries().to_vec();
        entries[1].payload = json!({ "seq": 999 });
        assert_eq!(
            verify_entries(&entries),
            Err(LedgerError::HashMismatch { index: 1 })
        );
    }

    #[test]
    fn tampered_hash_is_detected_at_its_own_index() {
        let ledger = seeded_ledger(3);
        let mut entries = ledger.entries().to_vec();
        entries[0].hash = "ff".repeat(32);
        // Entry 0 no longer matches its recomputed hash; the link check for
        // entry 1 would also fire, but the earlier violation wins.
        assert_eq!(
            verify_entries(&entries),
            Err(LedgerError::HashMismatch { index: 0 })
        );
    }

    #[test]
    fn tampered_link_is_detected() {
        let ledger = seeded_ledger(3);
        let mut entries = ledger.entries().to_vec();
        entries[2].prev_hash = "ab".repeat(32);
        assert_eq!(
            verify_entries(&entries),
            Err(LedgerError::LinkMismatch { index: 2 })
        );
    }

    #[test]
    fn dropped_entry_is_detected() {
        let ledger = seeded_ledger(3);
        let mut entries = ledger.entries().to_vec();
        entries.remove(1);
        assert_eq!(
            verify_entries(&entries),
            Err(LedgerError::LinkMismatch { index: 1 })
        );
    }

    #[test]
    fn first_entry_must_link_to_genesis() {
        let ledger = seeded_ledger(2);
        let mut entries = ledger.entries().to_vec();
        entries[0].prev_hash = "11".repeat(32);
        assert_eq!(
            verify_entries(&entries),
            Err(LedgerError::LinkMismatch { index: 0 })
        );
    }

    // ── canonical form ───────────────────────────────────────────────────────

    #[test]
    fn payload_key_order_is_canonical() {
        // serde_json orders object keys, so insertion order cannot leak into
        // the hash material.
        let a = json!({ "b": 1, "a": 2 });
        assert_eq!(a.to_string(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn hash_is_sha256_hex_width() {
        let ledger = seeded_ledger(1);
        let hash = &ledger.entries()[0].hash;
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
