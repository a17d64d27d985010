//! Governance gate – the pure core of the approval state machine.
//!
//! [`evaluate`] maps one [`Proposal`], the tick's [`RiskReport`], and the
//! active [`GovernanceConfig`] onto a [`GateRuling`]. Checks run in strict
//! precedence order; the first that applies wins:
//!
//! 1. **Hard block** – risk score at or above `hard_block_risk` blocks the
//!    proposal outright, regardless of every other setting.
//! 2. **Closed gate** – while `gate_open` is `false`, nothing is
//!    auto-approved; the proposal is parked for human review.
//! 3. **Auto-approval envelope** – a risk score strictly above
//!    `max_auto_risk`, or an intent kind listed in `require_human_for`,
//!    parks the proposal for human review. A score exactly equal to
//!    `max_auto_risk` is still auto-eligible.
//! 4. **Auto-approved** – everything else.
//!
//! The function is total and deterministic: identical inputs always produce
//! identical rulings, and no input can make it fail. Contract checks in
//! [`contract`](crate::contract) run before its inputs ever reach it.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use chrono::Utc;
//! use tiller_kernel::gate;
//! use tiller_types::{GovernanceConfig, Proposal, ProposalStatus, RiskLevel, RiskReport};
//! use uuid::Uuid;
//!
//! let proposal = Proposal {
//!     id: Uuid::new_v4(),
//!     tick: 1,
//!     source_intent: "CONTINUE".to_string(),
//!     action: "Maintain current profile".to_string(),
//!     bounds: BTreeMap::new(),
//!     expected_effect: BTreeMap::new(),
//!     status: ProposalStatus::Pending,
//!     governance_notes: String::new(),
//! };
//! let risk = RiskReport {
//!     tick: 1,
//!     timestamp: Utc::now(),
//!     score: 12.0,
//!     level: RiskLevel::Stable,
//!     clarity: 92.8,
//!     drivers: BTreeMap::new(),
//!     notes: String::new(),
//! };
//! let config = GovernanceConfig { gate_open: true, ..GovernanceConfig::default() };
//!
//! let ruling = gate::evaluate(&proposal, &risk, &config);
//! assert_eq!(ruling.status, ProposalStatus::AutoApproved);
//! ```

use tiller_types::{GovernanceConfig, Proposal, ProposalStatus, RiskReport};

/// The gate's verdict on one proposal: the final status plus a
/// human-readable comment naming the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRuling {
    pub status: ProposalStatus,
    pub comment: String,
}

/// Run the precedence checks described in the module docs against one
/// proposal. Never returns [`ProposalStatus::Pending`].
pub fn evaluate(proposal: &Proposal, risk: &RiskReport, config: &GovernanceConfig) -> GateRuling {
    if risk.score >= config.hard_block_risk {
        return GateRuling {
            status: ProposalStatus::Blocked,
            comment: format!(
                "risk {:.1} at or above hard block {:.1}",
                risk.score, config.hard_block_risk
            ),
        };
    }

    if !config.gate_open {
        return GateRuling {
            status: ProposalStatus::RequiresHuman,
            comment: "human gate closed; auto-approval disabled".to_string(),
        };
    }

    if risk.score > config.max_auto_risk {
        return GateRuling {
            status: ProposalStatus::RequiresHuman,
            comment: format!(
                "risk {:.1} above auto-approval ceiling {:.1}",
                risk.score, config.max_auto_risk
            ),
        };
    }

    if config.require_human_for.contains(&proposal.source_intent) {
        return GateRuling {
            status: ProposalStatus::RequiresHuman,
            comment: format!(
                "intent kind {} always requires human review",
                proposal.source_intent
            ),
        };
    }

    GateRuling {
        status: ProposalStatus::AutoApproved,
        comment: "within auto-approval envelope".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tiller_types::RiskLevel;
    use uuid::Uuid;

    fn proposal_of_kind(kind: &str) -> Proposal {
        Proposal {
            id: Uuid::new_v4(),
            tick: 1,
            source_intent: kind.to_string(),
            action: "test action".to_string(),
            bounds: BTreeMap::new(),
            expected_effect: BTreeMap::new(),
            status: ProposalStatus::Pending,
            governance_notes: String::new(),
        }
    }

    fn risk_scored(score: f64) -> RiskReport {
        RiskReport {
            tick: 1,
            timestamp: Utc::now(),
            score,
            level: RiskLevel::from_score(score),
            clarity: 80.0,
            drivers: BTreeMap::new(),
            notes: String::new(),
        }
    }

    fn open_gate() -> GovernanceConfig {
        GovernanceConfig {
            gate_open: true,
            ..GovernanceConfig::default()
        }
    }

    // ── rule 1: hard block ───────────────────────────────────────────────────

    #[test]
    fn score_at_hard_block_is_blocked() {
        // The hard-block comparison is inclusive.
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(80.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::Blocked);
        assert!(ruling.comment.contains("hard block"));
    }

    #[test]
    fn score_above_hard_block_is_blocked() {
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(95.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::Blocked);
    }

    #[test]
    fn hard_block_wins_over_closed_gate() {
        let config = GovernanceConfig::default(); // gate closed
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(90.0), &config);
        assert_eq!(ruling.status, ProposalStatus::Blocked);
    }

    #[test]
    fn hard_block_wins_over_forced_review_kind() {
        let ruling = evaluate(&proposal_of_kind("RETREAT"), &risk_scored(90.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::Blocked);
    }

    // ── rule 2: closed gate ──────────────────────────────────────────────────

    #[test]
    fn closed_gate_forces_human_review_even_at_low_risk() {
        let config = GovernanceConfig::default(); // gate closed
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(5.0), &config);
        assert_eq!(ruling.status, ProposalStatus::RequiresHuman);
        assert!(ruling.comment.contains("gate closed"));
    }

    // ── rule 3: auto-approval envelope ───────────────────────────────────────

    #[test]
    fn score_above_max_auto_requires_human() {
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(40.1), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::RequiresHuman);
        assert!(ruling.comment.contains("ceiling"));
    }

    #[test]
    fn score_exactly_at_max_auto_is_auto_approved() {
        // The ceiling comparison is strict: equality stays auto-eligible.
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(40.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::AutoApproved);
    }

    #[test]
    fn forced_review_kind_requires_human_at_low_risk() {
        let ruling = evaluate(&proposal_of_kind("RETREAT"), &risk_scored(5.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::RequiresHuman);
        assert!(ruling.comment.contains("RETREAT"));
    }

    #[test]
    fn emergency_kind_requires_human_by_default_set() {
        let ruling = evaluate(&proposal_of_kind("EMERGENCY"), &risk_scored(5.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::RequiresHuman);
    }

    #[test]
    fn kind_outside_forced_set_follows_thresholds() {
        let ruling = evaluate(&proposal_of_kind("SLOW_ROLL"), &risk_scored(10.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::AutoApproved);
    }

    // ── rule 4: auto approval ────────────────────────────────────────────────

    #[test]
    fn low_risk_open_gate_plain_kind_is_auto_approved() {
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(12.0), &open_gate());
        assert_eq!(ruling.status, ProposalStatus::AutoApproved);
        assert!(ruling.comment.contains("envelope"));
    }

    // ── determinism ──────────────────────────────────────────────────────────

    #[test]
    fn identical_inputs_produce_identical_rulings() {
        let proposal = proposal_of_kind("CONTINUE");
        let risk = risk_scored(33.0);
        let config = open_gate();
        let first = evaluate(&proposal, &risk, &config);
        let second = evaluate(&proposal, &risk, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn inverted_thresholds_still_hard_block_first() {
        // max_auto above hard_block is odd but allowed; precedence keeps the
        // hard block in charge.
        let config = GovernanceConfig {
            max_auto_risk: 90.0,
            hard_block_risk: 50.0,
            gate_open: true,
            ..GovernanceConfig::default()
        };
        let ruling = evaluate(&proposal_of_kind("CONTINUE"), &risk_scored(60.0), &config);
        assert_eq!(ruling.status, ProposalStatus::Blocked);
    }
}
