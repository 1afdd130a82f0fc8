use super::{Solver, SolverOptions};
use crate::common::{
    agents_from_waypoints, entries_into, Agent, Constraint, ConstraintStore, Path, Solution,
};
use crate::error::{PlanError, PlanResult};
use crate::instance::Instance;
use crate::map::Point;
use crate::stat::Stats;

use std::time::Instant;
use tracing::debug;

/// How a planned agent keeps lower-priority agents off its resting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// Final constraints on every entry into the resting cell.
    FinalConstraint,
    /// Final constraints, and the resting cell becomes a wall of the working
    /// copy of the instance.
    Wall,
}

/// Prioritized planning: agents are planned one by one in input order, each
/// avoiding every agent planned before it.
pub struct PP {
    agents: Vec<Agent>,
    /// Owned so that walling cells never touches the caller's instance.
    working: Instance,
    options: SolverOptions,
    reservation: Reservation,
    stats: Stats,
}

impl PP {
    pub fn new(
        instance: &Instance,
        waypoints: &[Vec<Point>],
        options: SolverOptions,
    ) -> PlanResult<Self> {
        Self::with_reservation(instance, waypoints, options, Reservation::FinalConstraint)
    }

    pub fn with_reservation(
        instance: &Instance,
        waypoints: &[Vec<Point>],
        options: SolverOptions,
        reservation: Reservation,
    ) -> PlanResult<Self> {
        Ok(PP {
            agents: agents_from_waypoints(waypoints)?,
            working: instance.clone(),
            options,
            reservation,
            stats: Stats::default(),
        })
    }

    fn name(&self) -> &'static str {
        match self.reservation {
            Reservation::FinalConstraint => "pp",
            Reservation::Wall => "pbs",
        }
    }
}

impl Solver for PP {
    fn solve(&mut self) -> PlanResult<Solution> {
        let total_solve_start_time = Instant::now();
        let mut constraints = ConstraintStore::new();
        let mut paths = Vec::with_capacity(self.agents.len());

        for agent in &self.agents {
            // A walled start means a higher-priority agent rests on it.
            if !self.working.is_valid(agent.start) {
                return Err(PlanError::NoPathFound { agent: agent.id });
            }

            let path = agent.plan(
                &self.working,
                &constraints,
                self.options.low_level_budget,
                &mut self.stats,
            )?;
            debug!(
                "agent {} planned: length {}, constraints {}",
                agent.id,
                path.len(),
                constraints.len()
            );

            for lower in (agent.id + 1)..self.agents.len() {
                constraints.add_all(reserve_path(&path, lower, &self.working));
            }
            if self.reservation == Reservation::Wall {
                if let Some(&rest) = path.last() {
                    self.working.wall(rest)?;
                }
            }

            paths.push(path);
        }

        let solution = Solution::from_paths(paths);
        self.stats.time_us = total_solve_start_time.elapsed().as_micros() as usize;
        self.stats.cost = solution.cost;
        self.stats.makespan = solution.makespan;
        self.stats.print(self.name());
        Ok(solution)
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}

/// Constraints that keep `agent` off `path`: no entering a path point when it
/// is occupied, no swapping along a transition of the path, and no entering
/// the last point from its time step on.
pub(crate) fn reserve_path(path: &Path, agent: usize, instance: &Instance) -> Vec<Constraint> {
    let mut reserved = Vec::new();

    for (time_step, &point) in path.iter().enumerate() {
        let is_last = time_step + 1 == path.len();
        for from in entries_into(point, instance) {
            reserved.push(if is_last {
                Constraint::permanent(agent, time_step, from, point)
            } else {
                Constraint::new(agent, time_step, from, point)
            });
        }

        if let Some(&previous) = time_step.checked_sub(1).and_then(|t| path.get(t)) {
            if previous != point {
                reserved.push(Constraint::new(agent, time_step, point, previous));
            }
        }
    }

    reserved
}
