//! [`TieredPolicy`] – escalation ladder keyed on the risk band.
//!
//! Always emits the baseline `CONTINUE` intent (priority 10). At
//! [`RiskLevel::High`] it adds `SLOW_ROLL` (priority 50, halve the rate);
//! at [`RiskLevel::Critical`] it also adds `EMERGENCY` (priority 90, hold).
//! The result is sorted by descending priority; the sort is stable, so
//! intents of equal priority keep their generation order.

use std::collections::BTreeMap;

use serde_json::json;
use tiller_kernel::ports::Policy;
use tiller_types::{INTENT_CONTINUE, Intent, RiskLevel, RiskReport, TillerError, WorldState};
use uuid::Uuid;

/// Default [`Policy`]: baseline plus risk-banded escalations.
#[derive(Debug, Default, Clone, Copy)]
pub struct TieredPolicy;

impl Policy for TieredPolicy {
    fn derive(
        &self,
        _world: &WorldState,
        risk: &RiskReport,
    ) -> Result<Vec<Intent>, TillerError> {
        let mut intents = vec![Intent {
            id: Uuid::new_v4(),
            kind: INTENT_CONTINUE.to_string(),
            priority: 10,
            params: BTreeMap::new(),
            rationale: "baseline keep-going behavior".to_string(),
        }];

        if matches!(risk.level, RiskLevel::High | RiskLevel::Critical) {
            intents.push(Intent {
                id: Uuid::new_v4(),
                kind: "SLOW_ROLL".to_string(),
                priority: 50,
                params: BTreeMap::from([("rate_multiplier".to_string(), json!(0.5))]),
                rationale: format!("risk {:.1} in {} band; slow the system", risk.score, risk.level),
            });
        }

        if risk.level == RiskLevel::Critical {
            intents.push(Intent {
                id: Uuid::new_v4(),
                kind: "EMERGENCY".to_string(),
                priority: 90,
                params: BTreeMap::from([("mode".to_string(), json!("HOLD"))]),
                rationale: "critical risk; hold until operator review".to_string(),
            });
        }

        intents.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn world() -> WorldState {
        WorldState {
            tick: 1,
            timestamp: Utc::now(),
            facts: BTreeMap::new(),
            health: BTreeMap::new(),
        }
    }

    fn risk_at(score: f64) -> RiskReport {
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

    #[test]
    fn stable_risk_yields_only_the_baseline() {
        let intents = TieredPolicy.derive(&world(), &risk_at(10.0)).unwrap();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].kind, INTENT_CONTINUE);
        assert_eq!(intents[0].priority, 10);
    }

    #[test]
    fn elevated_risk_still_yields_only_the_baseline() {
        let intents = TieredPolicy.derive(&world(), &risk_at(40.0)).unwrap();
        assert_eq!(intents.len(), 1);
    }

    #[test]
    fn high_risk_adds_slow_roll_ahead_of_baseline() {
        let intents = TieredPolicy.derive(&world(), &risk_at(60.0)).unwrap();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].kind, "SLOW_ROLL");
        assert_eq!(intents[0].params["rate_multiplier"], json!(0.5));
        assert_eq!(intents[1].kind, INTENT_CONTINUE);
    }

    #[test]
    fn critical_risk_adds_emergency_on_top() {
        let intents = TieredPolicy.derive(&world(), &risk_at(90.0)).unwrap();
        let kinds: Vec<&str> = intents.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(kinds, ["EMERGENCY", "SLOW_ROLL", "CONTINUE"]);
        assert_eq!(intents[0].params["mode"], json!("HOLD"));
    }

    #[test]
    fn priorities_descend() {
        let intents = TieredPolicy.derive(&world(), &risk_at(90.0)).unwrap();
        for pair in intents.windows(2) {
            assert!(pair[0].priority >= pair[1].priority);
        }
    }

    #[test]
    fn exactly_one_baseline_at_every_band() {
        for score in [0.0, 30.0, 60.0, 95.0] {
            let intents = TieredPolicy.derive(&world(), &risk_at(score)).unwrap();
            let baselines = intents.iter().filter(|i| i.kind == INTENT_CONTINUE).count();
            assert_eq!(baselines, 1, "score {score}");
        }
    }
}
