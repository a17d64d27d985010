//! [`CatalogSynthesizer`] – maps intent kinds to concrete proposals.
//!
//! | kind        | action                     | bounds                          |
//! |-------------|----------------------------|---------------------------------|
//! | `CONTINUE`  | "Maintain current profile" | `max_delta: "minimal"`          |
//! | `SLOW_ROLL` | "Reduce operational rate"  | `rate_multiplier` from the intent (0.6 fallback) |
//! | `EMERGENCY` | "Enter safe hold"          | `hold: true`                    |
//! | other       | "Custom action for {kind}" | none                            |
//!
//! Every proposal leaves this stage [`ProposalStatus::Pending`] with empty
//! governance notes; the gate fills both in later.

use std::collections::BTreeMap;

use serde_json::json;
use tiller_kernel::ports::ProposalSynthesizer;
use tiller_types::{
    INTENT_CONTINUE, Intent, Proposal, ProposalStatus, RiskReport, TillerError, WorldState,
};
use uuid::Uuid;

/// Default [`ProposalSynthesizer`] backed by a fixed action catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogSynthesizer;

impl ProposalSynthesizer for CatalogSynthesizer {
    fn synthesize(
        &self,
        intents: &[Intent],
        world: &WorldState,
        _risk: &RiskReport,
    ) -> Result<Vec<Proposal>, TillerError> {
        let proposals = intents
            .iter()
            .map(|intent| {
                let (action, bounds) = match intent.kind.as_str() {
                    INTENT_CONTINUE => (
                        "Maintain current profile".to_string(),
                        BTreeMap::from([("max_delta".to_string(), json!("minimal"))]),
                    ),
                    "SLOW_ROLL" => {
                        let rate = intent
                            .params
                            .get("rate_multiplier")
                            .cloned()
                            .unwrap_or(json!(0.6));
                        (
                            "Reduce operational rate".to_string(),
                            BTreeMap::from([("rate_multiplier".to_string(), rate)]),
                        )
                    }
                    "EMERGENCY" => (
                        "Enter safe hold".to_string(),
                        BTreeMap::from([("hold".to_string(), json!(true))]),
                    ),
                    other => (format!("Custom action for {other}"), BTreeMap::new()),
                };

                Proposal {
                    id: Uuid::new_v4(),
                    tick: world.tick,
                    source_intent: intent.kind.clone(),
                    action,
                    bounds,
                    expected_effect: BTreeMap::from([
                        ("risk_delta".to_string(), -10.0),
                        ("clarity_delta".to_string(), 5.0),
                    ]),
                    status: ProposalStatus::Pending,
                    governance_notes: String::new(),
                }
            })
            .collect();

        Ok(proposals)
    }
}
