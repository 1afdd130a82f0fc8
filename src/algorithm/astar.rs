use super::Frontier;
use crate::common::{ConstraintStore, LowLevelNode, Path};
use crate::error::{PlanError, PlanResult};
use crate::heuristic::heuristic;
use crate::instance::Instance;
use crate::map::Point;
use crate::stat::Stats;

use std::collections::HashSet;
use tracing::{debug, instrument, trace};

/// Expansion budget used when the caller gives none.
pub fn default_budget(instance: &Instance) -> usize {
    instance.grid().num_cells() * 10
}

/// Shortest path from `start` through every point of `goal_sequence` in
/// order, honouring the constraints of `agent`. The agent may only stop at
/// the last goal once nothing forbids it from resting there.
#[instrument(skip_all, name = "multi_a_star", fields(agent = agent, start = format!("{start}"), goals = goal_sequence.len()), level = "debug")]
pub fn multi_a_star(
    agent: usize,
    start: Point,
    goal_sequence: &[Point],
    instance: &Instance,
    constraints: &ConstraintStore,
    budget: Option<usize>,
    stats: &mut Stats,
) -> PlanResult<Path> {
    if goal_sequence.is_empty() {
        return Err(PlanError::InvalidInput(format!(
            "the goal sequence of agent {agent} is empty"
        )));
    }
    if !instance.is_valid(start) {
        return Err(PlanError::InvalidInput(format!(
            "agent {agent} starts on {start}, which is not walkable"
        )));
    }
    let h_table = instance.h_table();
    if let Some(goal) = goal_sequence.iter().find(|&&goal| !h_table.is_target(goal)) {
        return Err(PlanError::InvalidInput(format!(
            "goal {goal} of agent {agent} is not a point of interest"
        )));
    }

    // Nothing can move an agent off its start before time 0.
    if constraints
        .at(0)
        .iter()
        .any(|c| c.agent == agent && c.to == start)
    {
        debug!("start is forbidden at time 0");
        return Err(PlanError::NoPathFound { agent });
    }

    let budget = budget
        .filter(|&budget| budget > 0)
        .unwrap_or_else(|| default_budget(instance));
    debug!("budget: {budget}, constraints: {}", constraints.len());

    let mut frontier = Frontier::new();
    let mut explored = HashSet::new();
    let mut expansions = 0;

    let root_h_cost = heuristic(start, 0, h_table, goal_sequence)
        .ok_or(PlanError::NoPathFound { agent })?;
    frontier.push(LowLevelNode::root(start, root_h_cost));

    while let Some(mut current) = frontier.pop() {
        if expansions >= budget {
            debug!("budget exhausted, frontier size {}", frontier.len());
            return Err(PlanError::SearchTimeout { agent, expansions });
        }
        expansions += 1;
        stats.low_level_expanded += 1;
        trace!("expand node: {:?}", current.key());

        let key = current.key();

        if goal_sequence.get(current.label) == Some(&current.location) {
            current.label += 1;
        }

        if current.label == goal_sequence.len() {
            if constraints.allows_rest(agent, current.location, current.g_cost) {
                debug!("found path of length {}", current.path.len());
                return Ok(current.path);
            }
            // Someone passes here later: the last goal must be visited again.
            current.label -= 1;
        }

        explored.insert(key);

        let next_time = current.g_cost + 1;
        for neighbor in instance.grid().get_neighbors(current.location) {
            if constraints.forbids_move(agent, current.location, neighbor, next_time) {
                continue;
            }

            let Some(h_cost) = heuristic(neighbor, current.label, h_table, goal_sequence) else {
                continue;
            };
            let child = current.child(neighbor, h_cost);
            let child_key = child.key();

            if !explored.contains(&child_key) && !frontier.contains(&child_key) {
                frontier.push(child);
            } else {
                frontier.replace_if_more_expensive(child);
            }
        }
    }

    debug!("cannot find solution");
    Err(PlanError::NoPathFound { agent })
}
