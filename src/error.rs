use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error at {row}:{col}: {reason}")]
    Parse {
        row: usize,
        col: usize,
        reason: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("search timeout for agent {agent} after {expansions} expansions")]
    SearchTimeout { agent: usize, expansions: usize },

    #[error("no path found for agent {agent}")]
    NoPathFound { agent: usize },

    #[error("no conflict-free solution found")]
    NoSolutionFound,
}

impl PlanError {
    pub(crate) fn parse(row: usize, col: usize, reason: impl Into<String>) -> Self {
        PlanError::Parse {
            row,
            col,
            reason: reason.into(),
        }
    }

    /// Errors raised by the single-agent search that only invalidate the
    /// branch that produced them.
    pub fn is_branch_local(&self) -> bool {
        matches!(
            self,
            PlanError::SearchTimeout { .. } | PlanError::NoPathFound { .. }
        )
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
