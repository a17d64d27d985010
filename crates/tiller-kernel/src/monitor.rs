//! [`StageMonitor`] – per-stage duration observation.
//!
//! The orchestrator records how long each stage of the current tick took.
//! A stage that exceeds its budget is logged at `warn` level and reported
//! by [`StageMonitor::over_budget`]; the monitor never aborts anything.
//! The loop stays synchronous, so a genuinely hung stage still hangs the
//! tick — the budgets exist to make slow stages visible, not to stop them.

use std::collections::HashMap;
use std::time::Duration;

use tiller_types::Stage;
use tracing::warn;

/// Warn-only duration budgets, one per [`Stage`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tiller_kernel::monitor::StageMonitor;
/// use tiller_types::Stage;
///
/// let mut monitor = StageMonitor::new();
/// monitor.record(Stage::Risk, Duration::from_millis(3));
///
/// assert!(monitor.over_budget().is_empty());
/// ```
pub struct StageMonitor {
    default_budget: Duration,
    budgets: HashMap<Stage, Duration>,
    last: HashMap<Stage, Duration>,
}

impl StageMonitor {
    /// Budget applied to every stage unless overridden.
    pub const DEFAULT_BUDGET: Duration = Duration::from_millis(250);

    /// Monitor with [`StageMonitor::DEFAULT_BUDGET`] for every stage.
    pub fn new() -> Self {
        Self::with_default_budget(Self::DEFAULT_BUDGET)
    }

    /// Monitor with a custom default budget for every stage.
    pub fn with_default_budget(budget: Duration) -> Self {
        Self {
            default_budget: budget,
            budgets: HashMap::new(),
            last: HashMap::new(),
        }
    }

    /// Override the budget for one stage.
    pub fn set_budget(&mut self, stage: Stage, budget: Duration) {
        self.budgets.insert(stage, budget);
    }

    /// The budget in force for `stage`.
    pub fn budget(&self, stage: Stage) -> Duration {
        self.budgets
            .get(&stage)
            .copied()
            .unwrap_or(self.default_budget)
    }

    /// Record the elapsed duration of one stage invocation, replacing the
    /// previous recording for that stage. Logs a warning on overrun.
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        let budget = self.budget(stage);
        if elapsed > budget {
            warn!(
                stage = %stage,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "stage exceeded its duration budget"
            );
        }
        self.last.insert(stage, elapsed);
    }

    /// Most recent recorded duration for `stage`, if it has run.
    pub fn last_duration(&self, stage: Stage) -> Option<Duration> {
        self.last.get(&stage).copied()
    }

    /// Stages whose most recent recording exceeded their budget, with the
    /// recorded duration. Order is unspecified.
    pub fn over_budget(&self) -> Vec<(Stage, Duration)> {
        self.last
            .iter()
            .filter(|(stage, elapsed)| **elapsed > self.budget(**stage))
            .map(|(stage, elapsed)| (*stage, *elapsed))
            .collect()
    }
}

impl Default for StageMonitor {
    fn default() -> Self {
        Self::new()
    }
}
