//! `tiller-ledger` – The Audit Trail.
//!
//! An append-only, hash-chained record of everything the kernel decided,
//! kept in memory and verifiable after the fact.
//!
//! # Modules
//!
//! - [`chain`] – [`AuditLedger`][chain::AuditLedger]: appends one
//!   [`AuditEntry`][tiller_types::AuditEntry] per stage record, chaining each
//!   entry to its predecessor by SHA-256 over a canonical JSON form, and
//!   [`verify_entries`][chain::verify_entries]: recomputes the whole chain to
//!   detect tampering in any entry sequence, whether held by a ledger or
//!   reloaded from elsewhere.

pub mod chain;

pub use chain::{AuditLedger, GENESIS_HASH, LedgerError, verify_entries};
