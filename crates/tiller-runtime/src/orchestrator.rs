//! [`Orchestrator`] – one full decision cycle per [`step`][Orchestrator::step].
//!
//! Each tick runs the seven stage ports in a fixed order:
//!
//! 1. **Signal** – read a [`SignalFrame`] for the candidate tick.
//! 2. **Perception** – interpret the frame into a [`WorldState`].
//! 3. **Risk** – score the world into a [`RiskReport`].
//! 4. **Policy** – derive the tick's [`Intent`]s.
//! 5. **Proposal** – synthesize one [`Proposal`] per intent.
//! 6. **Governance** – adjudicate proposals into [`Decision`]s.
//! 7. **Actuation** – dispatch commands for auto-approved decisions.
//!
//! Every stage output is validated against its contract
//! ([`tiller_kernel::contract`]); a violation counts as that stage's failure.
//! Only after all seven stages pass does the orchestrator commit: six audit
//! entries are appended to the [`AuditLedger`] in a fixed kind order, the
//! proposals are stamped from their decisions, the previous world state is
//! replaced, and the tick counter advances.
//!
//! # Failure semantics
//!
//! A failed tick commits nothing: no audit entries, no world advance, and the
//! tick counter stays where it was — the increment is deferred until the tick
//! fully commits, so a retry reuses the same tick id and the audit chain only
//! ever contains completed ticks. The caller decides whether to halt or keep
//! stepping; the orchestrator never retries on its own.
//!
//! # Example
//!
//! ```rust
//! use tiller_runtime::Orchestrator;
//! use tiller_types::GovernanceConfig;
//!
//! let stages = tiller_stages::standard(42);
//! let mut orchestrator = Orchestrator::new(stages, GovernanceConfig::default()).unwrap();
//!
//! let snapshot = orchestrator.step().unwrap();
//! assert_eq!(snapshot.tick, 1);
//! assert_eq!(snapshot.audit.len(), 6);
//! ```

use std::time::Instant;

use serde_json::json;
use tiller_kernel::contract;
use tiller_kernel::monitor::StageMonitor;
use tiller_kernel::ports::{Clock, StageSet, SystemClock};
use tiller_ledger::AuditLedger;
use tiller_types::{
    GovernanceConfig, ProposalStatus, Stage, TickId, TickSnapshot, TillerError, WorldState,
};
use tracing::{debug, info, warn};

/// Audit entries committed per successful tick, in this kind order:
/// `frame`, `risk`, `intents`, `proposals`, `decisions`, `actuation`.
pub const AUDIT_ENTRIES_PER_TICK: usize = 6;

/// Drives the tick cycle and owns all cross-tick state: the tick counter,
/// the previous world state, and the audit ledger. `&mut self` on
/// [`step`][Self::step] and [`replace_config`][Self::replace_config] makes
/// a mid-tick configuration swap unrepresentable.
pub struct Orchestrator {
    stages: StageSet,
    config: GovernanceConfig,
    clock: Box<dyn Clock>,
    monitor: StageMonitor,
    ledger: AuditLedger,
    /// Id of the last successfully committed tick; 0 before the first.
    last_tick: TickId,
    prev_world: Option<WorldState>,
}

impl Orchestrator {
    /// Build an orchestrator over `stages`, gated by `config`, using the
    /// system clock.
    ///
    /// # Errors
    ///
    /// [`TillerError::Config`] when the governance thresholds fail
    /// validation.
    pub fn new(stages: StageSet, config: GovernanceConfig) -> Result<Self, TillerError> {
        Self::with_clock(stages, config, Box::new(SystemClock))
    }

    /// Like [`new`][Self::new] with an injected [`Clock`], so tests can pin
    /// every timestamp.
    pub fn with_clock(
        stages: StageSet,
        config: GovernanceConfig,
        clock: Box<dyn Clock>,
    ) -> Result<Self, TillerError> {
        config.validate()?;
        warn_if_inverted(&config);
        Ok(Self {
            stages,
            config,
            clock,
            monitor: StageMonitor::new(),
            ledger: AuditLedger::new(),
            last_tick: 0,
            prev_world: None,
        })
    }

    /// Run one full tick and return its snapshot.
    ///
    /// # Errors
    ///
    /// [`TillerError::Stage`] when a stage port fails or its output violates
    /// the stage contract. Nothing is committed for a failed tick.
    pub fn step(&mut self) -> Result<TickSnapshot, TillerError> {
        let tick = self.last_tick + 1;

        // ── 1. Signal ─────────────────────────────────────────────────────────
        let started = Instant::now();
        let frame = self.stages.signal.read(tick, self.prev_world.as_ref())?;
        self.finish_stage(Stage::Signal, started);
        contract::check_frame(&frame, tick)?;

        // ── 2. Perception ─────────────────────────────────────────────────────
        let started = Instant::now();
        let world = self
            .stages
            .perception
            .interpret(&frame, self.prev_world.as_ref())?;
        self.finish_stage(Stage::Perception, started);
        contract::check_world(&world, tick)?;

        // ── 3. Risk ───────────────────────────────────────────────────────────
        let started = Instant::now();
        let risk = self.stages.risk.assess(&world)?;
        self.finish_stage(Stage::Risk, started);
        contract::check_risk(&risk, tick)?;

        // ── 4. Policy ─────────────────────────────────────────────────────────
        let started = Instant::now();
        let intents = self.stages.policy.derive(&world, &risk)?;
        self.finish_stage(Stage::Policy, started);
        contract::check_intents(&intents)?;

        // ── 5. Proposal ───────────────────────────────────────────────────────
        let started = Instant::now();
        let mut proposals = self.stages.proposal.synthesize(&intents, &world, &risk)?;
        self.finish_stage(Stage::Proposal, started);
        contract::check_proposals(&proposals, &intents, tick)?;

        // ── 6. Governance ─────────────────────────────────────────────────────
        let started = Instant::now();
        let decisions = self
            .stages
            .governance
            .adjudicate(&proposals, &world, &risk, &self.config)?;
        self.finish_stage(Stage::Governance, started);
        contract::check_decisions(&decisions, &proposals, tick)?;

        // ── 7. Actuation ──────────────────────────────────────────────────────
        let started = Instant::now();
        let commands = self.stages.actuation.dispatch(&decisions, &world)?;
        self.finish_stage(Stage::Actuation, started);
        contract::check_actuation(&commands, &decisions, tick)?;

        // All stages passed: stamp each proposal from its decision so the two
        // records can never disagree on a committed tick.
        for (proposal, decision) in proposals.iter_mut().zip(&decisions) {
            proposal.status = decision.status;
            proposal.governance_notes = decision.comment.clone();
        }

        // ── Audit commit ──────────────────────────────────────────────────────
        let timestamp = self.clock.now();
        let auto_approved = decisions
            .iter()
            .filter(|d| d.status == ProposalStatus::AutoApproved)
            .count();
        self.ledger.append(
            tick,
            timestamp,
            "frame",
            json!({
                "stream_count": frame.streams.len(),
                "streams": frame.streams.keys().collect::<Vec<_>>(),
            }),
        );
        self.ledger.append(
            tick,
            timestamp,
            "risk",
            json!({ "score": risk.score, "level": risk.level }),
        );
        self.ledger
            .append(tick, timestamp, "intents", json!({ "count": intents.len() }));
        self.ledger.append(
            tick,
            timestamp,
            "proposals",
            json!({ "count": proposals.len() }),
        );
        self.ledger.append(
            tick,
            timestamp,
            "decisions",
            json!({ "count": decisions.len() }),
        );
        self.ledger.append(
            tick,
            timestamp,
            "actuation",
            json!({ "count": commands.len() }),
        );
        let audit = self.ledger.entries()[self.ledger.len() - AUDIT_ENTRIES_PER_TICK..].to_vec();

        info!(
            tick,
            risk_score = risk.score,
            risk_level = %risk.level,
            proposals = proposals.len(),
            auto_approved,
            actuation = commands.len(),
            "tick committed"
        );

        self.prev_world = Some(world.clone());
        self.last_tick = tick;

        Ok(TickSnapshot {
            tick,
            frame,
            world,
            risk,
            intents,
            proposals,
            decisions,
            commands,
            audit,
        })
    }

    /// Swap the governance configuration between ticks.
    ///
    /// # Errors
    ///
    /// [`TillerError::Config`] when the new thresholds fail validation; the
    /// previous configuration stays in force.
    pub fn replace_config(&mut self, config: GovernanceConfig) -> Result<(), TillerError> {
        config.validate()?;
        warn_if_inverted(&config);
        self.config = config;
        Ok(())
    }

    /// The governance configuration in force.
    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Read access to the audit ledger.
    pub fn ledger(&self) -> &AuditLedger {
        &self.ledger
    }

    /// Id of the last successfully committed tick; 0 before the first.
    pub fn last_tick(&self) -> TickId {
        self.last_tick
    }

    /// The committed world state of the last successful tick, if any.
    pub fn previous_world(&self) -> Option<&WorldState> {
        self.prev_world.as_ref()
    }

    /// The per-stage duration monitor.
    pub fn monitor(&self) -> &StageMonitor {
        &self.monitor
    }

    /// Adjust one stage's duration budget. Overruns only warn; they never
    /// abort a tick.
    pub fn set_stage_budget(&mut self, stage: Stage, budget: std::time::Duration) {
        self.monitor.set_budget(stage, budget);
    }

    fn finish_stage(&mut self, stage: Stage, started: Instant) {
        let elapsed = started.elapsed();
        self.monitor.record(stage, elapsed);
        debug!(stage = %stage, elapsed_us = elapsed.as_micros() as u64, "stage complete");
    }
}

fn warn_if_inverted(config: &GovernanceConfig) {
    if config.hard_block_risk < config.max_auto_risk {
        warn!(
            max_auto_risk = config.max_auto_risk,
            hard_block_risk = config.hard_block_risk,
            "hard_block_risk below max_auto_risk; hard blocks still take precedence"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
