//! [`ThresholdGovernance`] – the default governance stage.
//!
//! Runs the kernel gate ([`gate::evaluate`]) once per proposal, in proposal
//! order, and wraps each ruling in a [`Decision`]. The operator label is
//! `AUTO` for auto-approved proposals and `HUMAN_REVIEW` for everything
//! else (blocked proposals are parked for a human to look at too). Proposals
//! are never mutated here; the orchestrator stamps them from the decisions
//! afterwards.

use tiller_kernel::gate;
use tiller_kernel::ports::Governance;
use tiller_types::{
    Decision, GovernanceConfig, OPERATOR_AUTO, OPERATOR_HUMAN_REVIEW, Proposal, ProposalStatus,
    RiskReport, TillerError, WorldState,
};
use uuid::Uuid;

/// Default [`Governance`]: one gate evaluation per proposal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThresholdGovernance;

impl Governance for ThresholdGovernance {
    fn adjudicate(
        &self,
        proposals: &[Proposal],
        _world: &WorldState,
        risk: &RiskReport,
        config: &GovernanceConfig,
    ) -> Result<Vec<Decision>, TillerError> {
        let decisions = proposals
            .iter()
            .map(|proposal| {
                let ruling = gate::evaluate(proposal, risk, config);
                let operator = if ruling.status == ProposalStatus::AutoApproved {
                    OPERATOR_AUTO
                } else {
                    OPERATOR_HUMAN_REVIEW
                };
                Decision {
                    id: Uuid::new_v4(),
                    proposal_id: proposal.id,
                    tick: proposal.tick,
                    status: ruling.status,
                    operator: operator.to_string(),
                    comment: ruling.comment,
                }
            })
            .collect();

        Ok(decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tiller_types::RiskLevel;

    fn proposal_of_kind(kind: &str) -> Proposal {
        Proposal {
            id: Uuid::new_v4(),
            tick: 4,
            source_intent: kind.to_string(),
            action: "test action".to_string(),
            bounds: BTreeMap::new(),
            expected_effect: BTreeMap::new(),
            status: ProposalStatus::Pending,
            governance_notes: String::new(),
        }
    }

    fn world() -> WorldState {
        WorldState {
            tick: 4,
            timestamp: Utc::now(),
            facts: BTreeMap::new(),
            health: BTreeMap::new(),
        }
    }

    fn risk_scored(score: f64) -> RiskReport {
        RiskReport {
            tick: 4,
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

    #[test]
    fn one_decision_per_proposal_in_order() {
        let proposals = vec![proposal_of_kind("SLOW_ROLL"), proposal_of_kind("CONTINUE")];
        let decisions = ThresholdGovernance
            .adjudicate(&proposals, &world(), &risk_scored(10.0), &open_gate())
            .unwrap();
        assert_eq!(decisions.len(), 2);
        for (decision, proposal) in decisions.iter().zip(&proposals) {
            assert_eq!(decision.proposal_id, proposal.id);
            assert_eq!(decision.tick, proposal.tick);
        }
    }

    #[test]
    fn auto_approval_is_stamped_auto() {
        let proposals = vec![proposal_of_kind("CONTINUE")];
        let decisions = ThresholdGovernance
            .adjudicate(&proposals, &world(), &risk_scored(10.0), &open_gate())
            .unwrap();
        assert_eq!(decisions[0].status, ProposalStatus::AutoApproved);
        assert_eq!(decisions[0].operator, OPERATOR_AUTO);
    }

    #[test]
    fn forced_review_kind_is_parked_for_a_human() {
        let proposals = vec![proposal_of_kind("RETREAT")];
        let decisions = ThresholdGovernance
            .adjudicate(&proposals, &world(), &risk_scored(10.0), &open_gate())
            .unwrap();
        assert_eq!(decisions[0].status, ProposalStatus::RequiresHuman);
        assert_eq!(decisions[0].operator, OPERATOR_HUMAN_REVIEW);
    }

    #[test]
    fn blocked_proposal_also_names_the_human_reviewer() {
        let proposals = vec![proposal_of_kind("CONTINUE")];
        let decisions = ThresholdGovernance
            .adjudicate(&proposals, &world(), &risk_scored(95.0), &open_gate())
            .unwrap();
        assert_eq!(decisions[0].status, ProposalStatus::Blocked);
        assert_eq!(decisions[0].operator, OPERATOR_HUMAN_REVIEW);
    }

    #[test]
    fn decision_carries_the_gate_comment() {
        let proposals = vec![proposal_of_kind("CONTINUE")];
        let decisions = ThresholdGovernance
            .adjudicate(&proposals, &world(), &risk_scored(95.0), &open_gate())
            .unwrap();
        assert!(decisions[0].comment.contains("hard block"));
    }

    #[test]
    fn proposals_in_one_tick_share_the_risk_verdict() {
        // The gate sees the same risk for every proposal of a tick, so kinds
        // outside the forced set all land on the same side of the thresholds.
        let proposals = vec![proposal_of_kind("SLOW_ROLL"), proposal_of_kind("CONTINUE")];
        let decisions = ThresholdGovernance
            .adjudicate(&proposals, &world(), &risk_scored(55.0), &open_gate())
            .unwrap();
        assert!(decisions
            .iter()
            .all(|d| d.status == ProposalStatus::RequiresHuman));
    }
}
