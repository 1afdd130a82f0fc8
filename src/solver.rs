mod cbs;
mod pp;

pub use cbs::CBS;
pub use pp::{Reservation, PP};

use crate::common::Solution;
use crate::error::PlanResult;
use crate::stat::Stats;

use serde::{Deserialize, Serialize};

/// Search limits shared by every solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Expansions allowed per single-agent search, 10x the grid cells if unset.
    pub low_level_budget: Option<usize>,
    /// Constraint tree nodes CBS may expand, unbounded if unset.
    pub high_level_budget: Option<usize>,
}

pub trait Solver {
    fn solve(&mut self) -> PlanResult<Solution>;

    fn stats(&self) -> &Stats;
}
