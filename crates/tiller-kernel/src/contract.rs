//! Per-stage output contracts.
//!
//! The orchestrator runs the matching check after every stage; a violation
//! is reported as that stage's failure ([`TillerError::Stage`]) and aborts
//! the tick before anything is committed. Checks are deliberately dumb:
//! they restate the structural invariants of the data model and nothing
//! else.

use std::collections::BTreeSet;

use tiller_types::{
    ActuationCommand, Decision, INTENT_CONTINUE, Intent, Proposal, ProposalStatus, RiskLevel,
    RiskReport, SignalFrame, Stage, TickId, TillerError, WorldState,
};

/// The frame must belong to the running tick.
pub fn check_frame(frame: &SignalFrame, tick: TickId) -> Result<(), TillerError> {
    if frame.tick != tick {
        return Err(TillerError::stage(
            Stage::Signal,
            format!("frame carries tick {}, expected {tick}", frame.tick),
        ));
    }
    Ok(())
}

/// The world state must belong to the running tick and keep every subsystem
/// health score finite and within `[0.0, 1.0]`.
pub fn check_world(world: &WorldState, tick: TickId) -> Result<(), TillerError> {
    if world.tick != tick {
        return Err(TillerError::stage(
            Stage::Perception,
            format!("world state carries tick {}, expected {tick}", world.tick),
        ));
    }
    for (subsystem, score) in &world.health {
        if !score.is_finite() || !(0.0..=1.0).contains(score) {
            return Err(TillerError::stage(
                Stage::Perception,
                format!("health score for {subsystem} outside [0, 1]: {score}"),
            ));
        }
    }
    Ok(())
}

/// Score and clarity must be finite and within `[0.0, 100.0]`, and the level
/// must agree with the fixed score thresholds.
pub fn check_risk(risk: &RiskReport, tick: TickId) -> Result<(), TillerError> {
    if risk.tick != tick {
        return Err(TillerError::stage(
            Stage::Risk,
            format!("risk report carries tick {}, expected {tick}", risk.tick),
        ));
    }
    for (name, value) in [("score", risk.score), ("clarity", risk.clarity)] {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(TillerError::stage(
                Stage::Risk,
                format!("{name} outside [0, 100]: {value}"),
            ));
        }
    }
    let expected = RiskLevel::from_score(risk.score);
    if risk.level != expected {
        return Err(TillerError::stage(
            Stage::Risk,
            format!(
                "level {} inconsistent with score {:.1} (expected {})",
                risk.level, risk.score, expected
            ),
        ));
    }
    Ok(())
}

/// Exactly one baseline `CONTINUE` intent, and priorities in non-increasing
/// order (ties keep generation order, which this check cannot see — it only
/// rejects an outright ascending step).
pub fn check_intents(intents: &[Intent]) -> Result<(), TillerError> {
    let baselines = intents
        .iter()
        .filter(|intent| intent.kind == INTENT_CONTINUE)
        .count();
    if baselines != 1 {
        return Err(TillerError::stage(
            Stage::Policy,
            format!("expected exactly one {INTENT_CONTINUE} intent, found {baselines}"),
        ));
    }
    for pair in intents.windows(2) {
        if pair[0].priority < pair[1].priority {
            return Err(TillerError::stage(
                Stage::Policy,
                format!(
                    "intents not in descending priority order ({} before {})",
                    pair[0].priority, pair[1].priority
                ),
            ));
        }
    }
    Ok(())
}

/// One proposal per intent, in the same order, each still unstamped.
pub fn check_proposals(
    proposals: &[Proposal],
    intents: &[Intent],
    tick: TickId,
) -> Result<(), TillerError> {
    if proposals.len() != intents.len() {
        return Err(TillerError::stage(
            Stage::Proposal,
            format!(
                "{} proposals for {} intents",
                proposals.len(),
                intents.len()
            ),
        ));
    }
    for (index, (proposal, intent)) in proposals.iter().zip(intents).enumerate() {
        if proposal.tick != tick {
            return Err(TillerError::stage(
                Stage::Proposal,
                format!(
                    "proposal {index} carries tick {}, expected {tick}",
                    proposal.tick
                ),
            ));
        }
        if proposal.source_intent != intent.kind {
            return Err(TillerError::stage(
                Stage::Proposal,
                format!(
                    "proposal {index} sourced from {}, expected intent kind {}",
                    proposal.source_intent, intent.kind
                ),
            ));
        }
        if proposal.status != ProposalStatus::Pending {
            return Err(TillerError::stage(
                Stage::Proposal,
                format!("proposal {index} arrived pre-stamped as {}", proposal.status),
            ));
        }
        if !proposal.governance_notes.is_empty() {
            return Err(TillerError::stage(
                Stage::Proposal,
                format!("proposal {index} arrived with governance notes"),
            ));
        }
    }
    Ok(())
}

/// One decision per proposal, in the same order, none left pending.
pub fn check_decisions(
    decisions: &[Decision],
    proposals: &[Proposal],
    tick: TickId,
) -> Result<(), TillerError> {
    if decisions.len() != proposals.len() {
        return Err(TillerError::stage(
            Stage::Governance,
            format!(
                "{} decisions for {} proposals",
                decisions.len(),
                proposals.len()
            ),
        ));
    }
    for (index, (decision, proposal)) in decisions.iter().zip(proposals).enumerate() {
        if decision.tick != tick {
            return Err(TillerError::stage(
                Stage::Governance,
                format!(
                    "decision {index} carries tick {}, expected {tick}",
                    decision.tick
                ),
            ));
        }
        if decision.proposal_id != proposal.id {
            return Err(TillerError::stage(
                Stage::Governance,
                format!("decision {index} does not reference proposal {index}"),
            ));
        }
        if decision.status == ProposalStatus::Pending {
            return Err(TillerError::stage(
                Stage::Governance,
                format!("decision {index} left the proposal pending"),
            ));
        }
    }
    Ok(())
}

/// Every command must reference a distinct auto-approved decision of this
/// tick. Zero commands is always valid.
pub fn check_actuation(
    commands: &[ActuationCommand],
    decisions: &[Decision],
    tick: TickId,
) -> Result<(), TillerError> {
    let approved: BTreeSet<_> = decisions
        .iter()
        .filter(|decision| decision.status == ProposalStatus::AutoApproved)
        .map(|decision| decision.id)
        .collect();
    let mut dispatched = BTreeSet::new();
    for (index, command) in commands.iter().enumerate() {
        if command.tick != tick {
            return Err(TillerError::stage(
                Stage::Actuation,
                format!(
                    "command {index} carries tick {}, expected {tick}",
                    command.tick
                ),
            ));
        }
        if !approved.contains(&command.decision_id) {
            return Err(TillerError::stage(
                Stage::Actuation,
                format!("command {index} references a decision that was not auto-approved"),
            ));
        }
        if !dispatched.insert(command.decision_id) {
            return Err(TillerError::stage(
                Stage::Actuation,
                format!(
                    "more than one command for decision {}",
                    command.decision_id
                ),
            ));
        }
    }
    Ok(())
}
