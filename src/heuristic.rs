use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::map::{Grid, Point, MOVES};

/// Exact 4-connected distances from every reachable cell to every point of
/// interest.
#[derive(Debug, Clone, Default)]
pub struct HeuristicTable {
    distances: HashMap<Point, HashMap<Point, usize>>,
}

impl HeuristicTable {
    /// One breadth-first search per point of interest.
    pub fn compute(grid: &Grid, points_of_interest: &[Point]) -> Self {
        let mut table = HeuristicTable::default();
        let mut depth = vec![usize::MAX; grid.num_cells()];
        let mut queue = VecDeque::new();

        for &target in points_of_interest {
            if !grid.is_valid(target) || table.is_target(target) {
                continue;
            }

            depth.iter_mut().for_each(|d| *d = usize::MAX);
            queue.clear();

            // `ravel` cannot fail for valid points.
            let Ok(root) = grid.ravel(target) else { continue };
            depth[root] = 0;
            queue.push_back(target);

            while let Some(current) = queue.pop_front() {
                let Ok(index) = grid.ravel(current) else { continue };
                let cost = depth[index];
                table
                    .distances
                    .entry(current)
                    .or_default()
                    .insert(target, cost);

                for &step in &MOVES[1..] {
                    let next = current.offset(step);
                    if !grid.is_valid(next) {
                        continue;
                    }
                    let Ok(next_index) = grid.ravel(next) else { continue };
                    if depth[next_index] == usize::MAX {
                        depth[next_index] = cost + 1;
                        queue.push_back(next);
                    }
                }
            }
        }

        debug!(
            "heuristic table: {} cells, {} points of interest",
            table.distances.len(),
            points_of_interest.len()
        );
        table
    }

    pub fn distance(&self, from: Point, to: Point) -> Option<usize> {
        self.distances.get(&from)?.get(&to).copied()
    }

    /// True if distances towards `p` were computed.
    pub fn is_target(&self, p: Point) -> bool {
        self.distance(p, p).is_some()
    }

    pub fn num_cells(&self) -> usize {
        self.distances.len()
    }
}

/// Distance from `location` to `goal_sequence[label]` plus the remaining
/// inter-goal distances. `None` when some leg is unreachable.
pub fn heuristic(
    location: Point,
    label: usize,
    table: &HeuristicTable,
    goal_sequence: &[Point],
) -> Option<usize> {
    let next_goal = *goal_sequence.get(label)?;
    let mut h = table.distance(location, next_goal)?;
    for leg in goal_sequence[label..].windows(2) {
        h += table.distance(leg[0], leg[1])?;
    }
    Some(h)
}
