use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Identifiers & operator labels
// ────────────────────────────────────────────────────────────────────────────

/// Monotonically increasing cycle counter. The first successful cycle is 1;
/// a failed cycle consumes no identifier.
pub type TickId = u64;

/// Operator label stamped on decisions the gate approved automatically.
pub const OPERATOR_AUTO: &str = "AUTO";

/// Operator label stamped on decisions parked for a human reviewer.
pub const OPERATOR_HUMAN_REVIEW: &str = "HUMAN_REVIEW";

/// The baseline intent kind every policy must emit exactly once per tick.
pub const INTENT_CONTINUE: &str = "CONTINUE";

// ────────────────────────────────────────────────────────────────────────────
// Closed enums
// ────────────────────────────────────────────────────────────────────────────

/// Coarse risk band derived from the numeric risk score by fixed thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Stable,
    Elevated,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a score in `[0.0, 100.0]` onto its band: below 25 is
    /// [`RiskLevel::Stable`], below 50 [`RiskLevel::Elevated`], below 75
    /// [`RiskLevel::High`], everything else [`RiskLevel::Critical`].
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            RiskLevel::Stable
        } else if score < 50.0 {
            RiskLevel::Elevated
        } else if score < 75.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Stable => "STABLE",
            RiskLevel::Elevated => "ELEVATED",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        write!(f, "{label}")
    }
}

/// Lifecycle of a proposal through the governance gate.
///
/// `Pending` exists only between synthesis and adjudication; callers of the
/// orchestrator never observe it on a committed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    AutoApproved,
    RequiresHuman,
    Blocked,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProposalStatus::Pending => "PENDING",
            ProposalStatus::AutoApproved => "AUTO_APPROVED",
            ProposalStatus::RequiresHuman => "REQUIRES_HUMAN",
            ProposalStatus::Blocked => "BLOCKED",
        };
        write!(f, "{label}")
    }
}

/// The seven stages of one tick, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Signal,
    Perception,
    Risk,
    Policy,
    Proposal,
    Governance,
    Actuation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Signal => "signal",
            Stage::Perception => "perception",
            Stage::Risk => "risk",
            Stage::Policy => "policy",
            Stage::Proposal => "proposal",
            Stage::Governance => "governance",
            Stage::Actuation => "actuation",
        };
        write!(f, "{label}")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-tick records
// ────────────────────────────────────────────────────────────────────────────

/// Raw signals captured at the start of a tick, keyed by stream name.
/// Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalFrame {
    pub tick: TickId,
    pub timestamp: DateTime<Utc>,
    pub streams: BTreeMap<String, Value>,
}

/// Semantic interpretation of a [`SignalFrame`]: derived facts plus a
/// per-subsystem health score in `[0.0, 1.0]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub tick: TickId,
    pub timestamp: DateTime<Utc>,
    pub facts: BTreeMap<String, Value>,
    pub health: BTreeMap<String, f64>,
}

/// Risk assessment of a [`WorldState`].
///
/// `score` and `clarity` live in `[0.0, 100.0]`; `drivers` names the
/// contribution of each factor to the blended score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub tick: TickId,
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub level: RiskLevel,
    pub clarity: f64,
    pub drivers: BTreeMap<String, f64>,
    pub notes: String,
}

/// A behavioral goal derived by policy. Kinds are an open vocabulary
/// (the governance config names the ones that force human review);
/// higher `priority` sorts first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub id: Uuid,
    pub kind: String,
    pub priority: u32,
    pub params: BTreeMap<String, Value>,
    pub rationale: String,
}

/// A concrete, bounded action synthesized from exactly one [`Intent`].
///
/// Fresh proposals carry [`ProposalStatus::Pending`] and empty
/// `governance_notes`; the orchestrator stamps both from the matching
/// [`Decision`] after adjudication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Uuid,
    pub tick: TickId,
    pub source_intent: String,
    pub action: String,
    pub bounds: BTreeMap<String, Value>,
    pub expected_effect: BTreeMap<String, f64>,
    pub status: ProposalStatus,
    pub governance_notes: String,
}

/// The gate's verdict on one [`Proposal`]. `operator` is
/// [`OPERATOR_AUTO`] or [`OPERATOR_HUMAN_REVIEW`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub tick: TickId,
    pub status: ProposalStatus,
    pub operator: String,
    pub comment: String,
}

/// An executable command emitted for an auto-approved [`Decision`].
/// At most one per decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuationCommand {
    pub id: Uuid,
    pub tick: TickId,
    pub decision_id: Uuid,
    pub channel: String,
    pub payload: Value,
}

/// One link of the hash-chained audit ledger.
///
/// `hash` is SHA-256 over the canonical JSON form of the remaining fields
/// (including `prev_hash`), hex-encoded. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub tick: TickId,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub payload: Value,
    pub prev_hash: String,
    pub hash: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Governance configuration
// ────────────────────────────────────────────────────────────────────────────

/// Tunable thresholds and switches consulted by the governance gate.
///
/// Swapped only between ticks. `hard_block_risk` is operationally expected
/// to sit at or above `max_auto_risk`, but an inversion is accepted (the
/// gate's precedence already guarantees hard blocks win); the orchestrator
/// logs a warning instead of rejecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Highest risk score at which a proposal may still be auto-approved.
    pub max_auto_risk: f64,
    /// Risk score at or above which every proposal is blocked outright.
    pub hard_block_risk: f64,
    /// Intent kinds that always require human review, regardless of score.
    pub require_human_for: BTreeSet<String>,
    /// Master switch: while closed, nothing is auto-approved.
    pub gate_open: bool,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            max_auto_risk: 40.0,
            hard_block_risk: 80.0,
            require_human_for: BTreeSet::from(["RETREAT".to_string(), "EMERGENCY".to_string()]),
            gate_open: false,
        }
    }
}

impl GovernanceConfig {
    /// Check threshold sanity: both must be finite and within `[0.0, 100.0]`.
    ///
    /// # Errors
    ///
    /// [`TillerError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), TillerError> {
        for (name, value) in [
            ("max_auto_risk", self.max_auto_risk),
            ("hard_block_risk", self.hard_block_risk),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(TillerError::Config(format!(
                    "{name} must be finite and within [0, 100], got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tick snapshot
// ────────────────────────────────────────────────────────────────────────────

/// Read-only aggregate of everything one committed tick produced, including
/// the audit entries appended for it. Never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: TickId,
    pub frame: SignalFrame,
    pub world: WorldState,
    pub risk: RiskReport,
    pub intents: Vec<Intent>,
    pub proposals: Vec<Proposal>,
    pub decisions: Vec<Decision>,
    pub commands: Vec<ActuationCommand>,
    pub audit: Vec<AuditEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Kernel error
// ────────────────────────────────────────────────────────────────────────────

/// Error type spanning stage failures and configuration rejections.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TillerError {
    /// A stage port failed or returned data violating its output contract.
    /// Aborts the tick; nothing is committed.
    #[error("stage {stage} failed: {details}")]
    Stage { stage: Stage, details: String },

    /// Governance configuration failed validation. Rejected at construction
    /// or replace time, never mid-tick.
    #[error("invalid governance config: {0}")]
    Config(String),
}

impl TillerError {
    /// Shorthand for a [`TillerError::Stage`] with an owned message.
    pub fn stage(stage: Stage, details: impl Into<String>) -> Self {
        TillerError::Stage {
            stage,
            details: details.into(),
        }
    }
}
