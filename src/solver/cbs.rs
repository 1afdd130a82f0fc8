use super::{Solver, SolverOptions};
use crate::common::{agents_from_waypoints, Agent, HighLevelNode, Solution};
use crate::error::{PlanError, PlanResult};
use crate::instance::Instance;
use crate::map::Point;
use crate::stat::Stats;

use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;

pub struct CBS<'a> {
    agents: Vec<Agent>,
    instance: &'a Instance,
    options: SolverOptions,
    stats: Stats,
}

impl<'a> CBS<'a> {
    /// `waypoints[i]` is the ordered waypoint sequence of agent `i`,
    /// starting with its current position.
    pub fn new(
        instance: &'a Instance,
        waypoints: &[Vec<Point>],
        options: SolverOptions,
    ) -> PlanResult<Self> {
        Ok(CBS {
            agents: agents_from_waypoints(waypoints)?,
            instance,
            options,
            stats: Stats::default(),
        })
    }
}

impl Solver for CBS<'_> {
    fn solve(&mut self) -> PlanResult<Solution> {
        let total_solve_start_time = Instant::now();
        let budget = self.options.low_level_budget;
        let high_level_budget = self
            .options
            .high_level_budget
            .filter(|&limit| limit > 0)
            .unwrap_or(usize::MAX);

        let mut open = BTreeSet::new();
        let root = HighLevelNode::new(&self.agents, self.instance, budget, &mut self.stats)?;
        self.stats.high_level_generated += 1;
        let mut next_id = root.id + 1;
        open.insert(root);

        while let Some(current_node) = open.pop_first() {
            if self.stats.high_level_expanded >= high_level_budget {
                debug!("high level budget exhausted, open size {}", open.len() + 1);
                break;
            }
            self.stats.high_level_expanded += 1;

            let Some(conflict) = current_node.conflict else {
                // No conflicts, return solution.
                self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
                self.stats.cost = current_node.cost;
                self.stats.makespan = current_node.makespan;
                self.stats.print("cbs");

                return Ok(Solution {
                    paths: current_node.paths,
                    makespan: current_node.makespan,
                    cost: current_node.cost,
                });
            };

            debug!(
                "expand node {}: cost {}, conflicts {}, branch on {conflict:?}",
                current_node.id, current_node.cost, current_node.num_conflicts
            );

            for resolve_first in [true, false] {
                match current_node.update_constraint(
                    &conflict,
                    resolve_first,
                    next_id,
                    &self.agents,
                    self.instance,
                    budget,
                    &mut self.stats,
                ) {
                    Ok(child) => {
                        open.insert(child);
                        self.stats.high_level_generated += 1;
                    }
                    Err(err) if err.is_branch_local() => {
                        debug!("discard child {next_id}: {err}");
                        self.stats.discarded_branches += 1;
                    }
                    Err(err) => return Err(err),
                }
                next_id += 1;
            }
        }

        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        debug!("cbs fails after {} expansions", self.stats.high_level_expanded);
        Err(PlanError::NoSolutionFound)
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
