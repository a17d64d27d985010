//! [`DirectActuation`] – one `EXECUTE` command per auto-approved decision.
//!
//! Decisions that were blocked or parked for human review produce nothing;
//! a tick with no auto approvals dispatches zero commands. Every command
//! goes out on the `core` channel with the proposal reference and the
//! execution mode in its payload.

use serde_json::json;
use tiller_kernel::ports::Actuation;
use tiller_types::{ActuationCommand, Decision, ProposalStatus, TillerError, WorldState};
use uuid::Uuid;

/// Channel every default command is dispatched on.
pub const CHANNEL_CORE: &str = "core";

/// Default [`Actuation`]: direct dispatch of approved decisions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectActuation;

impl Actuation for DirectActuation {
    fn dispatch(
        &self,
        decisions: &[Decision],
        _world: &WorldState,
    ) -> Result<Vec<ActuationCommand>, TillerError> {
        let commands = decisions
            .iter()
            .filter(|decision| decision.status == ProposalStatus::AutoApproved)
            .map(|decision| ActuationCommand {
                id: Uuid::new_v4(),
                tick: decision.tick,
                decision_id: decision.id,
                channel: CHANNEL_CORE.to_string(),
                payload: json!({
                    "proposal_id": decision.proposal_id,
                    "mode": "EXECUTE",
                }),
            })
            .collect();

        Ok(commands)
    }
}
