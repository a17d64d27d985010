//! [`OpsPerception`] – health mapping over the `ops` stream.
//!
//! Interprets the synthetic telemetry into three subsystem health scores,
//! each clamped to `[0.0, 1.0]`:
//!
//! | subsystem     | derivation            |
//! |---------------|-----------------------|
//! | `compute`     | `1 − system_load`     |
//! | `environment` | `1 − env_stress`      |
//! | `comms`       | `comms_quality` as-is |
//!
//! Missing signals fall back to neutral defaults (load/stress 0.5, quality
//! 0.8) so a sparse frame still produces a usable world. The raw `ops`
//! object is preserved under `facts.raw_ops` for later inspection.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use tiller_kernel::ports::Perception;
use tiller_types::{SignalFrame, TillerError, WorldState};

/// Default [`Perception`] over the synthetic `ops` stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpsPerception;

impl Perception for OpsPerception {
    fn interpret(
        &self,
        frame: &SignalFrame,
        _prev_world: Option<&WorldState>,
    ) -> Result<WorldState, TillerError> {
        let ops = frame
            .streams
            .get("ops")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let signal = |name: &str, fallback: f64| -> f64 {
            ops.get(name).and_then(Value::as_f64).unwrap_or(fallback)
        };

        let health = BTreeMap::from([
            (
                "compute".to_string(),
                (1.0 - signal("system_load", 0.5)).clamp(0.0, 1.0),
            ),
            (
                "environment".to_string(),
                (1.0 - signal("env_stress", 0.5)).clamp(0.0, 1.0),
            ),
            (
                "comms".to_string(),
                signal("comms_quality", 0.8).clamp(0.0, 1.0),
            ),
        ]);
        let facts = BTreeMap::from([
            ("raw_ops".to_string(), ops),
            ("alerts".to_string(), json!([])),
        ]);

        Ok(WorldState {
            tick: frame.tick,
            timestamp: frame.timestamp,
            facts,
            health,
        })
    }
}
