mod conflict;
mod constraint;
mod highlevel;
mod lowlevel;

pub use conflict::{
    count_conflicts, detect_conflict, first_conflict, position_at, Conflict, ConflictType,
};
pub use constraint::{Constraint, ConstraintKind, ConstraintStore};
pub(crate) use highlevel::{entries_into, HighLevelNode};
pub(crate) use lowlevel::{LowLevelNode, SearchKey};

use crate::algorithm::multi_a_star;
use crate::error::{PlanError, PlanResult};
use crate::instance::Instance;
use crate::map::Point;
use crate::stat::Stats;

use serde::Serialize;
use tracing::debug;

/// One point per time step, starting at time 0.
pub type Path = Vec<Point>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: usize,
    pub start: Point,
    /// Points to visit in order; the agent rests at the last one.
    pub goals: Vec<Point>,
}

impl Agent {
    /// Builds an agent from its waypoint sequence. Element 0 is where the
    /// agent stands, so it is not a goal. An agent without further waypoints
    /// stays where it is.
    pub fn from_waypoints(id: usize, waypoints: &[Point]) -> PlanResult<Self> {
        let (&start, rest) = waypoints.split_first().ok_or_else(|| {
            PlanError::InvalidInput(format!("the waypoint sequence of agent {id} is empty"))
        })?;

        let goals = if rest.is_empty() {
            vec![start]
        } else {
            rest.to_vec()
        };

        Ok(Agent { id, start, goals })
    }

    pub fn plan(
        &self,
        instance: &Instance,
        constraints: &ConstraintStore,
        budget: Option<usize>,
        stats: &mut Stats,
    ) -> PlanResult<Path> {
        multi_a_star(
            self.id,
            self.start,
            &self.goals,
            instance,
            constraints,
            budget,
            stats,
        )
    }
}

pub fn agents_from_waypoints(waypoints: &[Vec<Point>]) -> PlanResult<Vec<Agent>> {
    waypoints
        .iter()
        .enumerate()
        .map(|(id, sequence)| Agent::from_waypoints(id, sequence))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub paths: Vec<Path>,
    pub makespan: usize,
    pub cost: usize,
}

impl Solution {
    pub fn from_paths(paths: Vec<Path>) -> Self {
        Solution {
            makespan: paths.iter().map(Vec::len).max().unwrap_or(0),
            cost: paths.iter().map(Vec::len).sum(),
            paths,
        }
    }

    /// Checks that every agent leaves from its start, only waits or steps to
    /// a walkable neighbour, and never collides with another agent.
    pub fn verify(&self, instance: &Instance) -> bool {
        if self.paths.len() != instance.num_agents() {
            debug!(
                "solution has {} paths for {} agents",
                self.paths.len(),
                instance.num_agents()
            );
            return false;
        }

        for (agent, (path, &start)) in self.paths.iter().zip(instance.agents()).enumerate() {
            if path.first() != Some(&start) {
                debug!("agent {agent} does not leave from {start}");
                return false;
            }
            if let Some(&p) = path.iter().find(|&&p| !instance.is_valid(p)) {
                debug!("agent {agent} visits {p}, which is not walkable");
                return false;
            }
            if let Some(step) = path.windows(2).find(|step| !step[0].is_one_step_from(step[1])) {
                debug!("agent {agent} jumps from {} to {}", step[0], step[1]);
                return false;
            }
        }

        if let Some(conflict) = first_conflict(&self.paths) {
            debug!("solution has conflict: {conflict:?}");
            return false;
        }

        *self == Solution::from_paths(self.paths.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::load_small;

    fn p(row: i32, col: i32) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn test_agent_from_waypoints() {
        let agent = Agent::from_waypoints(3, &[p(1, 1), p(1, 2), p(3, 2)]).unwrap();
        assert_eq!(agent.id, 3);
        assert_eq!(agent.start, p(1, 1));
        assert_eq!(agent.goals, vec![p(1, 2), p(3, 2)]);

        let idle = Agent::from_waypoints(0, &[p(1, 3)]).unwrap();
        assert_eq!(idle.goals, vec![p(1, 3)]);

        assert!(matches!(
            Agent::from_waypoints(0, &[]),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_idle_agent_stays() {
        let instance = load_small();
        let agent = Agent::from_waypoints(1, &[p(1, 3)]).unwrap();
        let path = agent
            .plan(&instance, &ConstraintStore::new(), None, &mut Stats::default())
            .unwrap();
        assert_eq!(path, vec![p(1, 3)]);
    }

    #[test]
    fn test_solution_cost_and_makespan() {
        let solution = Solution::from_paths(vec![
            vec![p(1, 1), p(1, 2)],
            vec![p(1, 3), p(2, 3), p(3, 3), p(3, 2)],
        ]);
        assert_eq!(solution.cost, 6);
        assert_eq!(solution.makespan, 4);
        assert_eq!(Solution::from_paths(vec![]).makespan, 0);
    }

    #[test]
    fn test_verify() {
        let instance = load_small();
        let good = Solution::from_paths(vec![
            vec![p(1, 1), p(1, 2)],
            vec![p(1, 3), p(2, 3), p(3, 3)],
        ]);
        assert!(good.verify(&instance));

        let wrong_start = Solution::from_paths(vec![vec![p(1, 2)], vec![p(1, 3)]]);
        assert!(!wrong_start.verify(&instance));

        let jump = Solution::from_paths(vec![vec![p(1, 1), p(3, 1)], vec![p(1, 3)]]);
        assert!(!jump.verify(&instance));

        let through_wall = Solution::from_paths(vec![vec![p(1, 1), p(0, 1)], vec![p(1, 3)]]);
        assert!(!through_wall.verify(&instance));

        let collision = Solution::from_paths(vec![
            vec![p(1, 1), p(1, 2)],
            vec![p(1, 3), p(1, 2)],
        ]);
        assert!(!collision.verify(&instance));

        let mut wrong_cost = good.clone();
        wrong_cost.cost += 1;
        assert!(!wrong_cost.verify(&instance));
    }
}
