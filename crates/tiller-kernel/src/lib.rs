//! `tiller-kernel` – Safety & Sequencing primitives.
//!
//! The parts of the decision loop that must never surprise anyone. Nothing
//! here performs I/O; the orchestrator in `tiller-runtime` wires these
//! pieces around the pluggable stage implementations.
//!
//! # Modules
//!
//! - [`gate`] – [`evaluate`][gate::evaluate]: the pure governance state
//!   machine that maps one proposal plus the tick's risk onto a
//!   [`GateRuling`][gate::GateRuling], with a strict precedence order
//!   (hard block, closed gate, auto-approval envelope).
//! - [`ports`] – the seven single-method stage traits the orchestrator
//!   depends on ([`SignalSource`][ports::SignalSource] through
//!   [`Actuation`][ports::Actuation]), bundled in a
//!   [`StageSet`][ports::StageSet], plus the [`Clock`][ports::Clock]
//!   abstraction that keeps wall time injectable.
//! - [`contract`] – one check per stage output; a violated contract is
//!   reported as the owning stage's failure and aborts the tick.
//! - [`monitor`] – [`StageMonitor`][monitor::StageMonitor]: warn-only
//!   per-stage duration budgets.

pub mod contract;
pub mod gate;
pub mod monitor;
pub mod ports;

pub use gate::GateRuling;
pub use monitor::StageMonitor;
pub use ports::{
    Actuation, Clock, Governance, Perception, Policy, ProposalSynthesizer, RiskScorer,
    SignalSource, StageSet, SystemClock,
};
