use std::collections::BTreeMap;

use crate::map::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    /// Forbids the move at exactly `time_step`.
    Instant,
    /// Forbids the move at `time_step` and every later time step.
    Final,
}

/// Agent `agent` may not move from `from` to `to` arriving at `time_step`.
/// A vertex constraint is the set of such moves into one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    pub agent: usize,
    pub time_step: usize,
    pub from: Point,
    pub to: Point,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub fn new(agent: usize, time_step: usize, from: Point, to: Point) -> Self {
        Constraint {
            agent,
            time_step,
            from,
            to,
            kind: ConstraintKind::Instant,
        }
    }

    pub fn permanent(agent: usize, time_step: usize, from: Point, to: Point) -> Self {
        Constraint {
            kind: ConstraintKind::Final,
            ..Constraint::new(agent, time_step, from, to)
        }
    }

    pub fn is_final(&self) -> bool {
        self.kind == ConstraintKind::Final
    }

    pub fn is_violated(&self, agent: usize, from: Point, to: Point, time_step: usize) -> bool {
        if agent != self.agent || from != self.from || to != self.to {
            return false;
        }

        match self.kind {
            ConstraintKind::Instant => time_step == self.time_step,
            ConstraintKind::Final => time_step >= self.time_step,
        }
    }
}

/// Constraints bucketed by time step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintStore {
    buckets: BTreeMap<usize, Vec<Constraint>>,
    len: usize,
    num_final: usize,
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.buckets
            .entry(constraint.time_step)
            .or_default()
            .push(constraint);
        self.len += 1;
        if constraint.is_final() {
            self.num_final += 1;
        }
    }

    pub fn add_all(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        for constraint in constraints {
            self.add(constraint);
        }
    }

    pub fn at(&self, time_step: usize) -> &[Constraint] {
        self.buckets
            .get(&time_step)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn at_or_after(&self, time_step: usize) -> impl Iterator<Item = &Constraint> + '_ {
        self.buckets
            .range(time_step..)
            .flat_map(|(_, bucket)| bucket.iter())
    }

    pub fn at_or_before(&self, time_step: usize) -> impl Iterator<Item = &Constraint> + '_ {
        self.buckets
            .range(..=time_step)
            .flat_map(|(_, bucket)| bucket.iter())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> + '_ {
        self.buckets.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if `agent` may not arrive at `to` from `from` at `time_step`.
    pub fn forbids_move(&self, agent: usize, from: Point, to: Point, time_step: usize) -> bool {
        if self
            .at(time_step)
            .iter()
            .any(|c| c.is_violated(agent, from, to, time_step))
        {
            return true;
        }

        // Final constraints from the past still apply.
        self.num_final > 0
            && self
                .at_or_before(time_step)
                .any(|c| c.is_final() && c.is_violated(agent, from, to, time_step))
    }

    /// True if `agent` may stop at `location` forever from `time_step` on,
    /// i.e. no constraint forbids it to stay there afterwards.
    pub fn allows_rest(&self, agent: usize, location: Point, time_step: usize) -> bool {
        let is_wait_here = |c: &&Constraint| c.agent == agent && c.from == location && c.to == location;
        let blocked_later = self.at_or_after(time_step).any(|c| is_wait_here(&c));
        let blocked_forever = self.num_final > 0
            && self
                .at_or_before(time_step)
                .any(|c| c.is_final() && is_wait_here(&c));
        !blocked_later && !blocked_forever
    }
}

impl Extend<Constraint> for ConstraintStore {
    fn extend<T: IntoIterator<Item = Constraint>>(&mut self, iter: T) {
        self.add_all(iter);
    }
}

impl FromIterator<Constraint> for ConstraintStore {
    fn from_iter<T: IntoIterator<Item = Constraint>>(iter: T) -> Self {
        let mut store = ConstraintStore::new();
        store.add_all(iter);
        store
    }
}
