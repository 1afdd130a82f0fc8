use crate::map::Point;

use super::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictType {
    /// Both agents occupy `position`.
    Vertex { position: Point },
    /// The first agent moves `from` -> `to` while the second moves `to` -> `from`.
    Edge { from: Point, to: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Conflict {
    pub agent_1: usize,
    pub agent_2: usize,
    pub time_step: usize,
    pub conflict_type: ConflictType,
}

impl Conflict {
    /// Vertex: the shared cell. Edge: where the first agent comes from.
    pub fn first_position(&self) -> Point {
        match self.conflict_type {
            ConflictType::Vertex { position } => position,
            ConflictType::Edge { from, .. } => from,
        }
    }

    /// Vertex: the shared cell. Edge: where the first agent goes to.
    pub fn second_position(&self) -> Point {
        match self.conflict_type {
            ConflictType::Vertex { position } => position,
            ConflictType::Edge { to, .. } => to,
        }
    }
}

/// Position at `time_step`; finished agents wait at their last point.
pub fn position_at(path: &Path, time_step: usize) -> Option<Point> {
    path.get(time_step).or_else(|| path.last()).copied()
}

/// First collision between two paths, scanning time steps in order.
pub fn detect_conflict(
    agent_1: usize,
    agent_2: usize,
    path_1: &Path,
    path_2: &Path,
) -> Option<Conflict> {
    let length = path_1.len().max(path_2.len());

    for time_step in 0..length {
        let pos_1 = position_at(path_1, time_step)?;
        let pos_2 = position_at(path_2, time_step)?;

        if pos_1 == pos_2 {
            return Some(Conflict {
                agent_1,
                agent_2,
                time_step,
                conflict_type: ConflictType::Vertex { position: pos_1 },
            });
        }

        if time_step + 1 < length {
            let next_1 = position_at(path_1, time_step + 1)?;
            let next_2 = position_at(path_2, time_step + 1)?;
            if pos_1 == next_2 && pos_2 == next_1 {
                return Some(Conflict {
                    agent_1,
                    agent_2,
                    time_step: time_step + 1,
                    conflict_type: ConflictType::Edge {
                        from: pos_1,
                        to: next_1,
                    },
                });
            }
        }
    }

    None
}

/// Earliest conflict over every pair, ties broken by pair order.
pub fn first_conflict(paths: &[Path]) -> Option<Conflict> {
    let mut first: Option<Conflict> = None;
    for i in 0..paths.len() {
        for j in (i + 1)..paths.len() {
            if let Some(conflict) = detect_conflict(i, j, &paths[i], &paths[j]) {
                if first.map_or(true, |best| conflict.time_step < best.time_step) {
                    first = Some(conflict);
                }
            }
        }
    }
    first
}

/// Number of agent pairs whose paths collide at least once.
pub fn count_conflicts(paths: &[Path]) -> usize {
    let mut count = 0;
    for i in 0..paths.len() {
        for j in (i + 1)..paths.len() {
            if detect_conflict(i, j, &paths[i], &paths[j]).is_some() {
                count += 1;
            }
        }
    }
    count
}
