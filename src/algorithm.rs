mod astar;
mod frontier;

pub use astar::{default_budget, multi_a_star};
pub(crate) use frontier::Frontier;
