use crate::error::{PlanError, PlanResult};
use crate::instance::{Instance, Task};
use crate::map::Point;

use tracing::{debug, info};

/// Distributes the tasks of an instance over its agents.
///
/// The result holds one waypoint sequence per agent, starting with the
/// agent's start point. Every task is visited by exactly one agent, its pickup
/// before its delivery, and no agent ever carries more than `capacity` tasks
/// at once.
pub trait TaskAssigner {
    fn assign(&self, instance: &Instance, capacity: usize) -> PlanResult<Vec<Vec<Point>>>;
}

/// Gives each task, in input order, to the agent that would finish it first.
/// Tasks are collected per agent in batches of `capacity`: all pickups of a
/// batch, then all its deliveries.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyAssigner;

#[derive(Debug, Clone)]
struct Route {
    waypoints: Vec<Point>,
    /// Last point of `waypoints`.
    tail: Point,
    /// Moves needed to visit `waypoints`.
    committed: usize,
    batch: Vec<Task>,
}

impl Route {
    fn new(start: Point) -> Self {
        Route {
            waypoints: vec![start],
            tail: start,
            committed: 0,
            batch: Vec::new(),
        }
    }

    /// Moves to finish the route once `extra` joins the open batch.
    fn cost_with(&self, extra: Option<Task>, instance: &Instance) -> Option<usize> {
        let tasks: Vec<Task> = self.batch.iter().copied().chain(extra).collect();
        let pickups = tasks.iter().map(|&(pickup, _)| pickup);
        let deliveries = tasks.iter().map(|&(_, delivery)| delivery);

        let mut cost = self.committed;
        let mut from = self.tail;
        for to in pickups.chain(deliveries) {
            cost += instance.h_table().distance(from, to)?;
            from = to;
        }
        Some(cost)
    }

    fn close_batch(&mut self, instance: &Instance) {
        if self.batch.is_empty() {
            return;
        }
        self.committed = self.cost_with(None, instance).unwrap_or(self.committed);
        let batch = std::mem::take(&mut self.batch);
        self.waypoints.extend(batch.iter().map(|&(pickup, _)| pickup));
        self.waypoints.extend(batch.iter().map(|&(_, delivery)| delivery));
        self.tail = self.waypoints.last().copied().unwrap_or(self.tail);
    }
}

impl TaskAssigner for GreedyAssigner {
    fn assign(&self, instance: &Instance, capacity: usize) -> PlanResult<Vec<Vec<Point>>> {
        if capacity == 0 {
            return Err(PlanError::InvalidInput(
                "capacity must be positive".to_string(),
            ));
        }

        let mut routes: Vec<Route> = instance.agents().iter().map(|&a| Route::new(a)).collect();

        for (index, &task) in instance.tasks().iter().enumerate() {
            let best = routes
                .iter()
                .enumerate()
                .filter_map(|(agent, route)| Some((route.cost_with(Some(task), instance)?, agent)))
                .min();
            let Some((cost, agent)) = best else {
                return Err(PlanError::InvalidInput(format!(
                    "task {index} cannot be reached by any agent"
                )));
            };
            debug!("task {index} -> agent {agent}, finishing after {cost} moves");

            let route = &mut routes[agent];
            route.batch.push(task);
            if route.batch.len() == capacity {
                route.close_batch(instance);
            }
        }

        for route in &mut routes {
            route.close_batch(instance);
        }

        info!(
            "assigned {} tasks to {} agents with capacity {capacity}",
            instance.num_tasks(),
            instance.num_agents()
        );
        Ok(routes.into_iter().map(|route| route.waypoints).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::load_small;

    fn p(row: i32, col: i32) -> Point {
        Point::new(row, col)
    }

    /// Checks the assignment contract for `instance`.
    fn check_contract(instance: &Instance, waypoints: &[Vec<Point>], capacity: usize) {
        assert_eq!(waypoints.len(), instance.num_agents());
        for (sequence, &start) in waypoints.iter().zip(instance.agents()) {
            assert_eq!(sequence[0], start);
        }

        for &(pickup, delivery) in instance.tasks() {
            let owners: Vec<_> = waypoints
                .iter()
                .filter(|sequence| sequence[1..].contains(&pickup))
                .collect();
            assert_eq!(owners.len(), 1);
            let sequence = owners[0];
            let pickup_at = sequence[1..].iter().position(|&q| q == pickup).unwrap();
            let delivery_at = sequence[1..].iter().position(|&q| q == delivery).unwrap();
            assert!(pickup_at < delivery_at);
        }

        for sequence in waypoints {
            let mut carried = 0usize;
            for q in &sequence[1..] {
                if instance.tasks().iter().any(|&(pickup, _)| pickup == *q) {
                    carried += 1;
                } else {
                    carried -= 1;
                }
                assert!(carried <= capacity);
            }
        }
    }

    #[test]
    fn test_greedy_capacity_one() {
        let instance = load_small();
        let waypoints = GreedyAssigner.assign(&instance, 1).unwrap();
        assert_eq!(
            waypoints,
            vec![
                vec![p(1, 1), p(1, 2), p(3, 2)],
                vec![p(1, 3), p(3, 1), p(3, 3)],
            ]
        );
        check_contract(&instance, &waypoints, 1);
    }

    #[test]
    fn test_greedy_batches() {
        let instance = load_small();
        let waypoints = GreedyAssigner.assign(&instance, 2).unwrap();
        // Both tasks fit in one batch of the first agent.
        assert_eq!(
            waypoints,
            vec![
                vec![p(1, 1), p(1, 2), p(3, 1), p(3, 2), p(3, 3)],
                vec![p(1, 3)],
            ]
        );
        check_contract(&instance, &waypoints, 2);
    }

    #[test]
    fn test_greedy_invalid_capacity() {
        let instance = load_small();
        assert!(matches!(
            GreedyAssigner.assign(&instance, 0),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_greedy_unreachable_task() {
        let grid = "OO#OO\n".parse().unwrap();
        let instance = Instance::new(grid, vec![p(0, 0)], vec![(p(0, 3), p(0, 4))]).unwrap();
        assert!(matches!(
            GreedyAssigner.assign(&instance, 1),
            Err(PlanError::InvalidInput(_))
        ));
    }
}
