use crate::map::Point;

use super::Path;

/// Identity of a search state in the frontier and the explored set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SearchKey {
    pub(crate) location: Point,
    pub(crate) g_cost: usize,
    pub(crate) label: usize,
}

/// Time-expanded A* state. `g_cost` is also the time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LowLevelNode {
    pub(crate) location: Point,
    pub(crate) path: Path,
    /// Goals of the sequence already visited by `path`.
    pub(crate) label: usize,
    pub(crate) g_cost: usize,
    pub(crate) h_cost: usize,
}

impl LowLevelNode {
    pub(crate) fn root(location: Point, h_cost: usize) -> Self {
        LowLevelNode {
            location,
            path: vec![location],
            label: 0,
            g_cost: 0,
            h_cost,
        }
    }

    pub(crate) fn child(&self, location: Point, h_cost: usize) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(location);

        LowLevelNode {
            location,
            path,
            label: self.label,
            g_cost: self.g_cost + 1,
            h_cost,
        }
    }

    pub(crate) fn f_cost(&self) -> usize {
        self.g_cost + self.h_cost
    }

    pub(crate) fn key(&self) -> SearchKey {
        SearchKey {
            location: self.location,
            g_cost: self.g_cost,
            label: self.label,
        }
    }
}
