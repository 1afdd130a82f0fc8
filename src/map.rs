use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Stay, right, down, left, up.
pub const MOVES: [(i32, i32); 5] = [(0, 0), (0, 1), (1, 0), (0, -1), (-1, 0)];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Point { row, col }
    }

    pub fn offset(self, (d_row, d_col): (i32, i32)) -> Self {
        Point {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// True if `other` is reachable from `self` in one step (including staying).
    pub fn is_one_step_from(self, other: Point) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() <= 1
    }
}

impl From<(i32, i32)> for Point {
    fn from((row, col): (i32, i32)) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Free,
    Agent,
    Task,
}

impl Cell {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Cell::Wall),
            // 'O' only marks a cell where agents or tasks may be placed.
            ' ' | 'O' => Some(Cell::Free),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Free => ' ',
            Cell::Agent => 'a',
            Cell::Task => 't',
        }
    }

    pub fn is_passable(self) -> bool {
        self != Cell::Wall
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn from_file(path: impl AsRef<Path>) -> PlanResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PlanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    pub fn is_inside(&self, p: Point) -> bool {
        p.row >= 0 && p.col >= 0 && (p.row as usize) < self.height && (p.col as usize) < self.width
    }

    /// Inside the grid and not a wall.
    pub fn is_valid(&self, p: Point) -> bool {
        self.cell(p).is_some_and(Cell::is_passable)
    }

    pub fn cell(&self, p: Point) -> Option<Cell> {
        if self.is_inside(p) {
            Some(self.cells[p.row as usize][p.col as usize])
        } else {
            None
        }
    }

    pub fn num_cells(&self) -> usize {
        self.height * self.width
    }

    pub fn num_free_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| cell.is_passable())
            .count()
    }

    /// Row-major linear index of `p`.
    pub fn ravel(&self, p: Point) -> PlanResult<usize> {
        if !self.is_inside(p) {
            return Err(PlanError::InvalidInput(format!(
                "cannot ravel {p}: outside a {}x{} grid",
                self.height, self.width
            )));
        }
        Ok(p.row as usize * self.width + p.col as usize)
    }

    pub fn unravel(&self, index: usize) -> PlanResult<Point> {
        if index >= self.num_cells() {
            return Err(PlanError::InvalidInput(format!(
                "cannot unravel {index}: grid has {} cells",
                self.num_cells()
            )));
        }
        Ok(Point::new(
            (index / self.width) as i32,
            (index % self.width) as i32,
        ))
    }

    /// Positions reachable from `p` in one time step, staying included.
    pub fn get_neighbors(&self, p: Point) -> Vec<Point> {
        MOVES
            .iter()
            .map(|&step| p.offset(step))
            .filter(|&next| self.is_valid(next))
            .collect()
    }

    /// Turns a walkable cell into a wall.
    pub fn wall(&mut self, p: Point) -> PlanResult<()> {
        self.mark(p, Cell::Wall)
    }

    pub(crate) fn mark(&mut self, p: Point, cell: Cell) -> PlanResult<()> {
        if !self.is_inside(p) {
            return Err(PlanError::InvalidInput(format!("{p} is outside the grid")));
        }
        self.cells[p.row as usize][p.col as usize] = cell;
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = PlanError;

    fn from_str(s: &str) -> PlanResult<Self> {
        let mut rows: Vec<&str> = s.lines().map(|line| line.trim_end_matches('\r')).collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        if rows.is_empty() {
            return Err(PlanError::parse(0, 0, "map has no rows"));
        }

        let mut cells = Vec::with_capacity(rows.len());
        let mut width = None;
        for (row, line) in rows.iter().enumerate() {
            let tiles = line
                .chars()
                .enumerate()
                .map(|(col, ch)| {
                    Cell::from_char(ch)
                        .ok_or_else(|| PlanError::parse(row, col, format!("invalid character {ch:?}")))
                })
                .collect::<PlanResult<Vec<_>>>()?;

            match width {
                None if tiles.is_empty() => return Err(PlanError::parse(row, 0, "empty row")),
                None => width = Some(tiles.len()),
                Some(width) if width != tiles.len() => {
                    return Err(PlanError::parse(
                        row,
                        tiles.len().min(width),
                        format!("row has {} cells, expected {width}", tiles.len()),
                    ))
                }
                Some(_) => {}
            }
            cells.push(tiles);
        }

        Ok(Grid {
            height: cells.len(),
            width: width.unwrap_or_default(),
            cells,
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().map(|cell| cell.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_map() {
        let grid = Grid::from_file("map_file/test/plus.map").unwrap();

        assert_eq!(grid.height, 5);
        assert_eq!(grid.width, 5);

        assert!(!grid.is_valid(Point::new(0, 0)));
        assert!(grid.is_valid(Point::new(0, 2)));
        assert!(grid.is_valid(Point::new(2, 2)));
        assert!(!grid.is_valid(Point::new(-1, 2)));
        assert!(!grid.is_valid(Point::new(2, 5)));

        let neighbors = grid.get_neighbors(Point::new(2, 2));
        assert_eq!(neighbors.len(), 5);
        let neighbors = grid.get_neighbors(Point::new(0, 2));
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&Point::new(0, 2)));
        assert!(neighbors.contains(&Point::new(1, 2)));
    }

    #[test]
    fn test_missing_map_file() {
        let err = Grid::from_file("map_file/test/does-not-exist.map").unwrap_err();
        assert!(matches!(err, PlanError::Io { .. }));
    }

    #[test]
    fn test_invalid_character_reports_position() {
        let err = "###\n#x#\n###\n".parse::<Grid>().unwrap_err();
        match err {
            PlanError::Parse { row, col, .. } => assert_eq!((row, col), (1, 1)),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = "###\n#O\n###\n".parse::<Grid>().unwrap_err();
        assert!(matches!(err, PlanError::Parse { row: 1, .. }));
        assert!("".parse::<Grid>().is_err());
    }

    #[test]
    fn test_ravel_roundtrip() {
        let grid: Grid = "OOOO\nO##O\nOOOO\n".parse().unwrap();
        for row in 0..grid.height as i32 {
            for col in 0..grid.width as i32 {
                let p = Point::new(row, col);
                assert_eq!(grid.unravel(grid.ravel(p).unwrap()).unwrap(), p);
            }
        }
        assert_eq!(grid.ravel(Point::new(1, 2)).unwrap(), 6);
        assert!(grid.ravel(Point::new(3, 0)).is_err());
        assert!(grid.ravel(Point::new(0, -1)).is_err());
        assert!(grid.unravel(12).is_err());
    }

    #[test]
    fn test_wall() {
        let mut grid: Grid = "OOO\nOOO\n".parse().unwrap();
        assert_eq!(grid.num_free_cells(), 6);
        grid.wall(Point::new(0, 1)).unwrap();
        assert!(!grid.is_valid(Point::new(0, 1)));
        assert_eq!(grid.num_free_cells(), 5);
        assert_eq!(grid.to_string(), " # \n   \n");
        assert!(grid.wall(Point::new(5, 5)).is_err());
    }
}
