//! [`WeightedRiskScorer`] – fixed-weight blend of health deficits.
//!
//! Each subsystem contributes its deficit (`1 − health`) to the score:
//! compute 35%, environment 40%, comms 25%. The blended score is scaled to
//! `[0.0, 100.0]` and rounded to one decimal; clarity decays with the score
//! (`100 − 0.6·score`, floored at 30; within [0, 100] the decay itself
//! bottoms out at 40). Subsystems missing from the world default to
//! health 0.8.

use std::collections::BTreeMap;

use tiller_kernel::ports::RiskScorer;
use tiller_types::{RiskLevel, RiskReport, TillerError, WorldState};

const WEIGHT_COMPUTE: f64 = 0.35;
const WEIGHT_ENVIRONMENT: f64 = 0.40;
const WEIGHT_COMMS: f64 = 0.25;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Default [`RiskScorer`] over the three synthetic subsystems.
#[derive(Debug, Default, Clone, Copy)]
pub struct WeightedRiskScorer;

impl RiskScorer for WeightedRiskScorer {
    fn assess(&self, world: &WorldState) -> Result<RiskReport, TillerError> {
        let health = |subsystem: &str| world.health.get(subsystem).copied().unwrap_or(0.8);
        let compute_deficit = 1.0 - health("compute");
        let environment_deficit = 1.0 - health("environment");
        let comms_deficit = 1.0 - health("comms");

        let raw = (100.0
            * (WEIGHT_COMPUTE * compute_deficit
                + WEIGHT_ENVIRONMENT * environment_deficit
                + WEIGHT_COMMS * comms_deficit))
            .clamp(0.0, 100.0);
        let score = round1(raw);
        let clarity = round1((100.0 - 0.6 * raw).max(30.0));

        let drivers = BTreeMap::from([
            ("compute".to_string(), round1(compute_deficit * 100.0)),
            (
                "environment".to_string(),
                round1(environment_deficit * 100.0),
            ),
            ("comms".to_string(), round1(comms_deficit * 100.0)),
        ]);

        Ok(RiskReport {
            tick: world.tick,
            timestamp: world.timestamp,
            score,
            level: RiskLevel::from_score(score),
            clarity,
            drivers,
            notes: "synthetic risk blend".to_string(),
        })
    }
}
