use super::{count_conflicts, first_conflict, Agent, Conflict, ConflictType, Constraint};
use super::{ConstraintStore, Path};
use crate::error::PlanResult;
use crate::instance::Instance;
use crate::map::{Point, MOVES};
use crate::stat::Stats;

use std::cmp::Ordering;
use tracing::debug;

/// Node of the constraint tree. Immutable once built: branching creates new
/// nodes that copy what they inherit.
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct HighLevelNode {
    pub(crate) id: usize,
    pub(crate) paths: Vec<Path>,
    pub(crate) constraints: ConstraintStore,
    pub(crate) cost: usize,
    pub(crate) makespan: usize,
    pub(crate) num_conflicts: usize,
    /// Earliest conflict, the one the node branches on.
    pub(crate) conflict: Option<Conflict>,
}

impl Ord for HighLevelNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.num_conflicts.cmp(&other.num_conflicts))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for HighLevelNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl HighLevelNode {
    /// Root node: every agent planned on its own.
    pub(crate) fn new(
        agents: &[Agent],
        instance: &Instance,
        budget: Option<usize>,
        stats: &mut Stats,
    ) -> PlanResult<Self> {
        let constraints = ConstraintStore::new();
        let paths = agents
            .iter()
            .map(|agent| agent.plan(instance, &constraints, budget, stats))
            .collect::<PlanResult<Vec<_>>>()?;

        Ok(Self::with_paths(0, paths, constraints))
    }

    fn with_paths(id: usize, paths: Vec<Path>, constraints: ConstraintStore) -> Self {
        let conflict = first_conflict(&paths);
        let num_conflicts = if conflict.is_some() {
            count_conflicts(&paths)
        } else {
            0
        };

        HighLevelNode {
            id,
            cost: paths.iter().map(Vec::len).sum(),
            makespan: paths.iter().map(Vec::len).max().unwrap_or(0),
            paths,
            constraints,
            num_conflicts,
            conflict,
        }
    }

    /// Child that resolves `conflict` by constraining its first agent when
    /// `resolve_first` is set, its second agent otherwise. Only that agent is
    /// replanned.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn update_constraint(
        &self,
        conflict: &Conflict,
        resolve_first: bool,
        id: usize,
        agents: &[Agent],
        instance: &Instance,
        budget: Option<usize>,
        stats: &mut Stats,
    ) -> PlanResult<HighLevelNode> {
        let agent = if resolve_first {
            conflict.agent_1
        } else {
            conflict.agent_2
        };

        let mut constraints = self.constraints.clone();
        constraints.add_all(resolve_constraints(conflict, resolve_first, instance));

        let new_path = agents[agent].plan(instance, &constraints, budget, stats)?;
        debug!(
            "replan agent {agent}: length {} -> {}",
            self.paths[agent].len(),
            new_path.len()
        );

        let mut paths = self.paths.clone();
        paths[agent] = new_path;

        Ok(Self::with_paths(id, paths, constraints))
    }
}

/// Constraints that forbid the chosen agent's side of `conflict`.
pub(crate) fn resolve_constraints(
    conflict: &Conflict,
    resolve_first: bool,
    instance: &Instance,
) -> Vec<Constraint> {
    let (agent, time_step) = if resolve_first {
        (conflict.agent_1, conflict.time_step)
    } else {
        (conflict.agent_2, conflict.time_step)
    };

    match conflict.conflict_type {
        ConflictType::Edge { from, to } => {
            let (from, to) = if resolve_first { (from, to) } else { (to, from) };
            vec![Constraint::new(agent, time_step, from, to)]
        }
        ConflictType::Vertex { position } => entries_into(position, instance)
            .map(|from| Constraint::new(agent, time_step, from, position))
            .collect(),
    }
}

/// Every walkable cell an agent can come from to stand on `position`,
/// `position` itself included.
pub(crate) fn entries_into(
    position: Point,
    instance: &Instance,
) -> impl Iterator<Item = Point> + '_ {
    MOVES
        .iter()
        .map(move |&step| position.offset(step))
        .filter(|&from| instance.is_valid(from))
}
