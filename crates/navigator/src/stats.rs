//! Per-navigator counters.

/// Counters accumulated over the lifetime of one [`crate::Navigator`].
///
/// Plain integers: a navigator is only ever driven through `&mut self`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigatorStats {
    /// Routes planned by the orchestrator (base destinations and side goals).
    pub route_plans: u64,
    /// Routes planned by the executor for a single leg.
    pub step_plans: u64,
    /// Planner calls that found no route.
    pub failed_plans: u64,
    pub move_commands: u64,
    pub interactions: u64,
    pub nudges: u64,
    pub maintenance_runs: u64,
    pub grid_builds: u64,
}

impl NavigatorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_plans(&self) -> u64 {
        self.route_plans + self.step_plans
    }
}
