//! Error taxonomy for the ranking engine.
//!
//! Every fallible operation in this crate returns [`Result`]. Variants carry
//! enough context (sizes, indices, names) to reproduce the failing call; no
//! operation returns a partial result alongside an error.

use crate::solver::{Program, SolverError};

/// Errors produced by graph construction, tiering and ordering solvers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
    /// Malformed input: ragged or non-square matrix, name-count mismatch,
    /// out-of-range index, or a negative / non-finite weight.
    #[error("shape error: {0}")]
    Shape(String),

    /// A partition failed validation (empty group, duplicate or missing
    /// entity).
    #[error("invalid partition: {0}")]
    InvalidPartition(String),

    /// The requested tier count cannot be satisfied with non-empty tiers.
    #[error("cannot split {entities} entities into {tiers} non-empty tiers")]
    InfeasiblePartition { entities: usize, tiers: usize },

    /// The constraint solver reported an infeasible model. Any total order is
    /// feasible, so this indicates a model-construction defect.
    #[error(
        "solver {solver} reported an infeasible model ({entities} entities, {variables} variables, {constraints} constraints)"
    )]
    SolverInfeasible {
        solver: &'static str,
        entities: usize,
        variables: usize,
        constraints: usize,
    },

    /// The constraint solver reported an unbounded objective. Objectives here
    /// are bounded below by zero, so this indicates a model-construction
    /// defect.
    #[error(
        "solver {solver} reported an unbounded objective ({entities} entities, {variables} variables, {constraints} constraints)"
    )]
    SolverUnbounded {
        solver: &'static str,
        entities: usize,
        variables: usize,
        constraints: usize,
    },

    /// Any other solver failure (unsupported program, exhausted limit,
    /// backend error).
    #[error("solver {solver} failed: {source}")]
    Solver {
        solver: &'static str,
        #[source]
        source: SolverError,
    },

    /// The weak-ordering step received a residual graph containing a cycle
    /// longer than a mutual tie.
    #[error("residual graph contains a cycle through {}", members.join(", "))]
    UnexpectedCycle { members: Vec<String> },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RankError>;

impl RankError {
    /// Attach the model size to a solver failure.
    pub(crate) fn from_solver(
        solver: &'static str,
        err: SolverError,
        entities: usize,
        program: &Program,
    ) -> Self {
        let (variables, constraints) = (program.variable_count(), program.constraint_count());
        match err {
            SolverError::Infeasible => Self::SolverInfeasible {
                solver,
                entities,
                variables,
                constraints,
            },
            SolverError::Unbounded => Self::SolverUnbounded {
                solver,
                entities,
                variables,
                constraints,
            },
            source => Self::Solver { solver, source },
        }
    }
}
