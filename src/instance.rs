use std::fmt;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{PlanError, PlanResult};
use crate::heuristic::HeuristicTable;
use crate::map::{Cell, Grid, Point};

/// A pickup point and its delivery point.
pub type Task = (Point, Point);

/// A grid with agents, tasks and the distances between them.
#[derive(Debug, Clone)]
pub struct Instance {
    grid: Grid,
    agents: Vec<Point>,
    tasks: Vec<Task>,
    h_table: HeuristicTable,
}

impl Instance {
    pub fn new(mut grid: Grid, agents: Vec<Point>, tasks: Vec<Task>) -> PlanResult<Self> {
        let endpoints = tasks.iter().flat_map(|&(pickup, delivery)| [pickup, delivery]);
        for p in agents.iter().copied().chain(endpoints) {
            if !grid.is_valid(p) {
                return Err(PlanError::InvalidInput(format!(
                    "{p} is not a free cell of the map"
                )));
            }
        }

        for &agent in &agents {
            grid.mark(agent, Cell::Agent)?;
        }
        for &(pickup, delivery) in &tasks {
            grid.mark(pickup, Cell::Task)?;
            grid.mark(delivery, Cell::Task)?;
        }

        let mut instance = Instance {
            grid,
            agents,
            tasks,
            h_table: HeuristicTable::default(),
        };
        instance.h_table = HeuristicTable::compute(&instance.grid, &instance.points_of_interest());
        Ok(instance)
    }

    pub fn from_files(
        instance_path: impl AsRef<Path>,
        map_path: impl AsRef<Path>,
    ) -> PlanResult<Self> {
        let grid = Grid::from_file(map_path)?;
        let instance_path = instance_path.as_ref();
        let content = fs::read_to_string(instance_path).map_err(|source| PlanError::Io {
            path: instance_path.to_path_buf(),
            source,
        })?;
        let instance = Self::parse(grid, &content)?;
        info!(
            "Load instance {instance_path:?}: {} agents, {} tasks",
            instance.num_agents(),
            instance.num_tasks()
        );
        Ok(instance)
    }

    /// Reads `numAgents numTasks`, then one `row col` line per agent and one
    /// `startRow startCol goalRow goalCol` line per task.
    pub fn parse(grid: Grid, content: &str) -> PlanResult<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let mut next_numbers = |expected: usize, what: &str| -> PlanResult<Vec<i64>> {
            let (row, line) = lines
                .next()
                .ok_or_else(|| PlanError::parse(0, 0, format!("missing {what} line")))?;
            let numbers = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<i64>().map_err(|_| {
                        PlanError::parse(row, 0, format!("{token:?} is not an integer"))
                    })
                })
                .collect::<PlanResult<Vec<_>>>()?;
            if numbers.len() != expected {
                return Err(PlanError::parse(
                    row,
                    0,
                    format!("expected {expected} numbers for {what}, got {}", numbers.len()),
                ));
            }
            Ok(numbers)
        };

        let header = next_numbers(2, "header")?;
        let (num_agents, num_tasks) = (header[0], header[1]);
        if num_agents <= 0 || num_tasks <= 0 {
            return Err(PlanError::InvalidInput(format!(
                "agent and task counts must be positive, got {num_agents} and {num_tasks}"
            )));
        }

        let point = |row: i64, col: i64| -> PlanResult<Point> {
            let row = i32::try_from(row)
                .map_err(|_| PlanError::InvalidInput(format!("row {row} out of range")))?;
            let col = i32::try_from(col)
                .map_err(|_| PlanError::InvalidInput(format!("column {col} out of range")))?;
            Ok(Point::new(row, col))
        };

        let mut agents = Vec::with_capacity(num_agents as usize);
        for _ in 0..num_agents {
            let n = next_numbers(2, "agent")?;
            agents.push(point(n[0], n[1])?);
        }

        let mut tasks = Vec::with_capacity(num_tasks as usize);
        for _ in 0..num_tasks {
            let n = next_numbers(4, "task")?;
            tasks.push((point(n[0], n[1])?, point(n[2], n[3])?));
        }

        Self::new(grid, agents, tasks)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.height
    }

    pub fn cols(&self) -> usize {
        self.grid.width
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn agents(&self) -> &[Point] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn h_table(&self) -> &HeuristicTable {
        &self.h_table
    }

    /// Agent starts, then every pickup and delivery.
    pub fn points_of_interest(&self) -> Vec<Point> {
        let mut poi = self.agents.clone();
        for &(pickup, delivery) in &self.tasks {
            poi.push(pickup);
            poi.push(delivery);
        }
        poi
    }

    pub fn is_inside(&self, p: Point) -> bool {
        self.grid.is_inside(p)
    }

    pub fn is_valid(&self, p: Point) -> bool {
        self.grid.is_valid(p)
    }

    /// Blocks `p` for every later search. The heuristic table is left as is,
    /// so distances through `p` stay optimistic.
    pub fn wall(&mut self, p: Point) -> PlanResult<()> {
        self.grid.wall(p)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::load_small;

    #[test]
    fn test_load_instance() {
        let instance = load_small();
        assert_eq!(instance.rows(), 5);
        assert_eq!(instance.cols(), 5);
        assert_eq!(instance.num_agents(), 2);
        assert_eq!(instance.num_tasks(), 2);
        assert_eq!(instance.agents(), &[Point::new(1, 1), Point::new(1, 3)]);
        assert_eq!(
            instance.tasks(),
            &[
                (Point::new(1, 2), Point::new(3, 2)),
                (Point::new(3, 1), Point::new(3, 3)),
            ]
        );
        assert_eq!(instance.to_string(), "#####\n ata \n# # #\n ttt \n#####\n");
    }

    #[test]
    fn test_valid_points() {
        let instance = load_small();
        for p in [(-1, -1), (2, -1), (-1, 2), (6, 3), (3, 6), (6, 6), (2, 2)] {
            assert!(!instance.is_valid(Point::from(p)), "{p:?}");
        }
        assert!(instance.is_valid(Point::new(2, 1)));
        assert!(instance.is_valid(Point::new(1, 1)));
    }

    #[test]
    fn test_heuristic_table_is_built() {
        let instance = load_small();
        let table = instance.h_table();
        assert_eq!(table.distance(Point::new(1, 1), Point::new(3, 2)), Some(3));
        assert_eq!(table.distance(Point::new(1, 0), Point::new(3, 1)), Some(3));
        assert_eq!(table.distance(Point::new(1, 3), Point::new(3, 1)), Some(4));
    }

    #[test]
    fn test_missing_files() {
        let err = Instance::from_files("map_file/test/nope.instance", "map_file/test/small.map")
            .unwrap_err();
        assert!(matches!(err, PlanError::Io { .. }));
        let err = Instance::from_files("map_file/test/small.instance", "map_file/test/nope.map")
            .unwrap_err();
        assert!(matches!(err, PlanError::Io { .. }));
    }

    #[test]
    fn test_malformed_instance() {
        let grid: Grid = "OOO\nOOO\n".parse().unwrap();
        assert!(matches!(
            Instance::parse(grid.clone(), "1 1\n0 0\n0 1 x 2\n"),
            Err(PlanError::Parse { row: 2, .. })
        ));
        assert!(matches!(
            Instance::parse(grid.clone(), "1 1\n0 0\n"),
            Err(PlanError::Parse { .. })
        ));
        assert!(matches!(
            Instance::parse(grid.clone(), "0 1\n0 1 1 2\n"),
            Err(PlanError::InvalidInput(_))
        ));
        assert!(matches!(
            Instance::parse(grid, "1 1\n5 5\n0 1 1 2\n"),
            Err(PlanError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_wall_working_copy() {
        let instance = load_small();
        let mut working = instance.clone();
        working.wall(Point::new(3, 2)).unwrap();
        assert!(!working.is_valid(Point::new(3, 2)));
        assert!(instance.is_valid(Point::new(3, 2)));
    }
}
