use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub cost: usize,
    pub makespan: usize,
    pub time_us: usize,
    pub high_level_expanded: usize,
    pub high_level_generated: usize,
    pub low_level_expanded: usize,
    /// CBS children dropped because their replanning failed.
    pub discarded_branches: usize,
}

impl Stats {
    pub fn print(&self, solver: &str) {
        info!(
            "{solver}: cost {:?} makespan {:?} time(microseconds) {:?} high level expanded {:?} generated {:?} discarded {:?} low level expanded {:?}",
            self.cost,
            self.makespan,
            self.time_us,
            self.high_level_expanded,
            self.high_level_generated,
            self.discarded_branches,
            self.low_level_expanded
        );
    }
}
