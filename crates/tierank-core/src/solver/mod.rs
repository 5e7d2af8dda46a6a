//! Pluggable constraint-solver capability.
//!
//! # Overview
//!
//! Exact and relaxed ranking formulations are expressed as a [`Program`]:
//! bounded variables, linear constraints and an objective. Any
//! [`ConstraintSolver`] can then be asked to optimize it. Two
//! implementations ship with the crate:
//!
//! | Solver            | Variables            | Objective          | Notes |
//! |-------------------|----------------------|--------------------|-------|
//! | [`LinearSolver`]  | binary + continuous  | linear             | good_lp with the pure-Rust microlp backend (MIP and LP). |
//! | [`BranchAndBound`]| binary only          | linear or custom   | depth-first search with activity-bound propagation and node/time limits. |
//!
//! Solvers report [`SolverError::Infeasible`] / [`SolverError::Unbounded`]
//! rather than returning partial data. Callers in this crate map those to
//! [`crate::error::RankError`] with the program size attached.

pub mod branch;
pub mod linear;

use std::fmt;
use std::sync::Arc;

pub use branch::{BranchAndBound, BranchConfig};
pub use linear::LinearSolver;

/// Index of a variable inside a [`Program`].
pub type VarId = usize;

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarKind {
    /// 0/1 integer variable.
    Binary,
    /// Real variable in `[lower, upper]`.
    Continuous { lower: f64, upper: f64 },
}

/// A named decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
}

/// Comparison operator of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

/// `Σ coef · var  (relation)  rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Left-hand side evaluated at `values`.
    #[must_use]
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, c)| c * values[v]).sum()
    }

    /// Returns `true` if `values` satisfy the constraint within `tolerance`.
    #[must_use]
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.activity(values);
        match self.relation {
            Relation::Le => lhs <= self.rhs + tolerance,
            Relation::Ge => lhs >= self.rhs - tolerance,
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Objective evaluated on a complete assignment.
pub type CustomObjective = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// What the solver optimizes.
#[derive(Clone)]
pub enum Objective {
    /// `constant + Σ coef · var`.
    Linear {
        terms: Vec<(VarId, f64)>,
        constant: f64,
    },
    /// Arbitrary function of a complete assignment. Only search-based
    /// solvers can optimize it.
    Custom(CustomObjective),
}

impl fmt::Debug for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear { terms, constant } => f
                .debug_struct("Linear")
                .field("terms", &terms.len())
                .field("constant", constant)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// A complete optimization model.
#[derive(Debug, Clone)]
pub struct Program {
    pub variables: Vec<Variable>,
    pub constraints: Vec<LinearConstraint>,
    pub objective: Objective,
    pub sense: Sense,
}

impl Program {
    /// Empty program with a zero linear objective.
    #[must_use]
    pub const fn new(sense: Sense) -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Objective::Linear {
                terms: Vec::new(),
                constant: 0.0,
            },
            sense,
        }
    }

    /// Add a binary variable and return its id.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            kind: VarKind::Binary,
        });
        self.variables.len() - 1
    }

    /// Add a bounded continuous variable and return its id.
    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            kind: VarKind::Continuous { lower, upper },
        });
        self.variables.len() - 1
    }

    /// Add a linear constraint.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            terms,
            relation,
            rhs,
        });
    }

    /// Replace the objective with `constant + Σ terms`.
    pub fn set_linear_objective(&mut self, terms: Vec<(VarId, f64)>, constant: f64) {
        self.objective = Objective::Linear { terms, constant };
    }

    /// Replace the objective with an arbitrary function of the assignment.
    pub fn set_custom_objective(&mut self, objective: CustomObjective) {
        self.objective = Objective::Custom(objective);
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Copy of this program with every binary variable relaxed to `[0, 1]`.
    #[must_use]
    pub fn relaxed(&self) -> Self {
        let mut program = self.clone();
        for var in &mut program.variables {
            if var.kind == VarKind::Binary {
                var.kind = VarKind::Continuous {
                    lower: 0.0,
                    upper: 1.0,
                };
            }
        }
        program
    }

    /// Objective value at `values`.
    #[must_use]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        match &self.objective {
            Objective::Linear { terms, constant } => {
                constant + terms.iter().map(|&(v, c)| c * values[v]).sum::<f64>()
            }
            Objective::Custom(f) => f(values),
        }
    }

    /// Returns `true` if `values` respect every bound and constraint.
    #[must_use]
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.variables.len()
            && self.variables.iter().zip(values).all(|(var, &x)| match var.kind {
                VarKind::Binary => x.abs() <= tolerance || (x - 1.0).abs() <= tolerance,
                VarKind::Continuous { lower, upper } => {
                    x >= lower - tolerance && x <= upper + tolerance
                }
            })
            && self.constraints.iter().all(|c| c.is_satisfied(values, tolerance))
    }
}

/// How a solve finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// A node or time limit stopped the search; the assignment is the best
    /// incumbent found.
    LimitReached,
}

/// Assignment returned by a solver.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSolution {
    /// Value per variable, indexed by [`VarId`].
    pub values: Vec<f64>,
    /// Objective at `values`.
    pub objective: f64,
    pub status: SolveStatus,
    /// Search nodes explored (0 for solvers that do not report it).
    pub nodes: u64,
}

/// Failures reported by a [`ConstraintSolver`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("model is infeasible")]
    Infeasible,

    #[error("objective is unbounded")]
    Unbounded,

    /// The solver cannot handle this kind of program.
    #[error("unsupported program: {0}")]
    Unsupported(String),

    /// A limit stopped the search before any feasible assignment was found.
    #[error("search limit reached after {nodes} nodes without a feasible assignment")]
    LimitReached { nodes: u64 },

    #[error("backend error: {0}")]
    Backend(String),
}

/// An optimization oracle over [`Program`]s.
pub trait ConstraintSolver: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    /// Optimize `program`.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the program is infeasible, unbounded,
    /// unsupported by this solver, or the backend fails.
    fn solve(&self, program: &Program) -> Result<ProgramSolution, SolverError>;
}
