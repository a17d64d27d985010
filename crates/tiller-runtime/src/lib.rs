//! `tiller-runtime` – The Tick Engine.
//!
//! Drives the signal → perception → risk → policy → proposal → governance →
//! actuation cycle around the pluggable stage ports, committing every
//! completed tick to the hash-chained audit ledger.
//!
//! # Modules
//!
//! - [`orchestrator`] – [`Orchestrator`][orchestrator::Orchestrator]: runs
//!   the seven stages in fixed order with per-stage contract checks, stamps
//!   proposals from decisions, appends six audit entries per committed tick,
//!   and owns all cross-tick state (tick counter, previous world, ledger).
//!   Failed ticks commit nothing and consume no tick id.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter.
//!   Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export to any
//!   OTLP-compatible collector.

pub mod orchestrator;
pub mod telemetry;

pub use orchestrator::{AUDIT_ENTRIES_PER_TICK, Orchestrator};
