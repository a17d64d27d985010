//! Stage ports – the seams between the orchestrator and its collaborators.
//!
//! One single-method trait per stage, in tick order: [`SignalSource`],
//! [`Perception`], [`RiskScorer`], [`Policy`], [`ProposalSynthesizer`],
//! [`Governance`], [`Actuation`]. The orchestrator depends on these
//! abstractly and never on a concrete strategy; `tiller-stages` ships the
//! default implementations and tests swap in stubs.
//!
//! Every method returns `Result<_, TillerError>` so a failing stage can
//! abort the tick with a typed error. Each stage sees only the outputs of
//! earlier stages of the *same* tick, plus the previous tick's committed
//! [`WorldState`] where noted.
//!
//! [`Clock`] isolates wall time: production wiring uses [`SystemClock`],
//! deterministic tests inject a fixed clock.

use chrono::{DateTime, Utc};
use tiller_types::{
    ActuationCommand, Decision, GovernanceConfig, Intent, Proposal, RiskReport, SignalFrame,
    TickId, TillerError, WorldState,
};

// ────────────────────────────────────────────────────────────────────────────
// Clock
// ────────────────────────────────────────────────────────────────────────────

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stage traits
// ────────────────────────────────────────────────────────────────────────────

/// Produces the raw [`SignalFrame`] that starts a tick.
///
/// Takes `&mut self`: the boundary with the nondeterministic world may hold
/// state such as a seeded random generator or a device handle.
pub trait SignalSource: Send {
    fn read(
        &mut self,
        tick: TickId,
        prev_world: Option<&WorldState>,
    ) -> Result<SignalFrame, TillerError>;
}

/// Interprets a [`SignalFrame`] into a semantic [`WorldState`].
pub trait Perception: Send {
    fn interpret(
        &self,
        frame: &SignalFrame,
        prev_world: Option<&WorldState>,
    ) -> Result<WorldState, TillerError>;
}

/// Scores a [`WorldState`] into a [`RiskReport`].
pub trait RiskScorer: Send {
    fn assess(&self, world: &WorldState) -> Result<RiskReport, TillerError>;
}

/// Derives behavioral [`Intent`]s from the world and its risk.
///
/// Must emit exactly one baseline `CONTINUE` intent per tick and order the
/// result by descending priority (stable on ties); the contract check
/// rejects anything else.
pub trait Policy: Send {
    fn derive(&self, world: &WorldState, risk: &RiskReport) -> Result<Vec<Intent>, TillerError>;
}

/// Turns intents into concrete [`Proposal`]s, one per intent, same order.
pub trait ProposalSynthesizer: Send {
    fn synthesize(
        &self,
        intents: &[Intent],
        world: &WorldState,
        risk: &RiskReport,
    ) -> Result<Vec<Proposal>, TillerError>;
}

/// Adjudicates proposals into [`Decision`]s, one per proposal, same order.
///
/// Implementations must not mutate the proposals they are shown; the
/// orchestrator stamps each proposal's status from its decision afterwards.
pub trait Governance: Send {
    fn adjudicate(
        &self,
        proposals: &[Proposal],
        world: &WorldState,
        risk: &RiskReport,
        config: &GovernanceConfig,
    ) -> Result<Vec<Decision>, TillerError>;
}

/// Emits [`ActuationCommand`]s for auto-approved decisions: at most one per
/// decision, and none for anything that was not auto-approved.
pub trait Actuation: Send {
    fn dispatch(
        &self,
        decisions: &[Decision],
        world: &WorldState,
    ) -> Result<Vec<ActuationCommand>, TillerError>;
}

// ────────────────────────────────────────────────────────────────────────────
// StageSet
// ────────────────────────────────────────────────────────────────────────────

/// One boxed implementation of each stage port, ready to hand to the
/// orchestrator. `tiller-stages` builds the default set via `standard`.
pub struct StageSet {
    pub signal: Box<dyn SignalSource>,
    pub perception: Box<dyn Perception>,
    pub risk: Box<dyn RiskScorer>,
    pub policy: Box<dyn Policy>,
    pub proposal: Box<dyn ProposalSynthesizer>,
    pub governance: Box<dyn Governance>,
    pub actuation: Box<dyn Actuation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_does_not_run_backwards() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
