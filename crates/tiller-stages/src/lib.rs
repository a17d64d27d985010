//! `tiller-stages` – Default stage implementations.
//!
//! Toy but complete strategies behind every stage port, so the full decision
//! loop runs without any live integration. Each module holds one
//! implementation; [`standard`] wires all seven into a
//! [`StageSet`][tiller_kernel::StageSet].
//!
//! # Modules
//!
//! - [`signal`] – [`SyntheticSignalSource`][signal::SyntheticSignalSource]:
//!   seeded synthetic `ops` telemetry.
//! - [`perception`] – [`OpsPerception`][perception::OpsPerception]: maps the
//!   `ops` stream onto subsystem health scores.
//! - [`risk`] – [`WeightedRiskScorer`][risk::WeightedRiskScorer]: fixed-weight
//!   blend of health deficits into a 0–100 score.
//! - [`policy`] – [`TieredPolicy`][policy::TieredPolicy]: baseline `CONTINUE`
//!   plus escalation intents keyed on the risk band.
//! - [`proposal`] – [`CatalogSynthesizer`][proposal::CatalogSynthesizer]:
//!   intent-kind → action catalog.
//! - [`governance`] – [`ThresholdGovernance`][governance::ThresholdGovernance]:
//!   runs the kernel gate per proposal.
//! - [`actuation`] – [`DirectActuation`][actuation::DirectActuation]: one
//!   `EXECUTE` command per auto-approved decision.

use tiller_kernel::StageSet;

pub mod actuation;
pub mod governance;
pub mod perception;
pub mod policy;
pub mod proposal;
pub mod risk;
pub mod signal;

pub use actuation::DirectActuation;
pub use governance::ThresholdGovernance;
pub use perception::OpsPerception;
pub use policy::TieredPolicy;
pub use proposal::CatalogSynthesizer;
pub use risk::WeightedRiskScorer;
pub use signal::SyntheticSignalSource;

/// The default wiring: synthetic signals plus every default strategy, ready
/// to hand to the orchestrator. `seed` drives the synthetic source.
pub fn standard(seed: u64) -> StageSet {
    StageSet {
        signal: Box::new(SyntheticSignalSource::new(seed)),
        perception: Box::new(OpsPerception),
        risk: Box::new(WeightedRiskScorer),
        policy: Box::new(TieredPolicy),
        proposal: Box::new(CatalogSynthesizer),
        governance: Box::new(ThresholdGovernance),
        actuation: Box::new(DirectActuation),
    }
}
