//! Bidirectional feedback arc set (B-FASP).
//!
//! # Model
//!
//! One binary `y_ij` per ordered pair `i ≠ j`, read as "i is ranked at or
//! above j". The objective charges every arc that points against the chosen
//! ranking:
//!
//! ```text
//! minimize   Σ w_ij (1 − y_ij)
//! subject to y_ij + y_ji ≥ 1          if i → j and j → i both carry weight
//!            y_ij + y_ji = 1          otherwise
//!            y_ij − y_ik − y_kj ≥ −1  for every ordered triple of distinct i, j, k
//! ```
//!
//! The `≥ 1` rows let a mutual pair stay tied (both arcs kept). Every total
//! order is feasible, so an infeasible or unbounded report from a solver
//! means the model is wrong, and it is surfaced as a [`RankError`] carrying
//! the model size.
//!
//! [`solve_exact`] solves the integer program, [`solve_relaxed`] its LP
//! relaxation, and [`exhaustive_fas`] is a solver-free oracle for small
//! graphs.

mod exhaustive;

pub use exhaustive::{ExhaustiveFas, MAX_EXHAUSTIVE_ENTITIES, exhaustive_fas};

use std::cmp::Reverse;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{RankError, Result};
use crate::graph::{WeightedArc, WeightedDigraph};
use crate::solver::{ConstraintSolver, Program, Relation, Sense, SolveStatus, VarId};

/// The B-FASP integer program for one graph.
#[derive(Debug, Clone)]
pub struct FasFormulation {
    n: usize,
    /// `y_ij` id at `i * n + j`; `None` on the diagonal.
    vars: Vec<Option<VarId>>,
    program: Program,
}

impl FasFormulation {
    /// Build the program for `graph`.
    #[must_use]
    pub fn new(graph: &WeightedDigraph) -> Self {
        let n = graph.node_count();
        let mut program = Program::new(Sense::Minimize);
        let mut vars = vec![None; n * n];

        // y_ij and y_ji are created next to each other so branch-and-bound
        // settles one pair at a time.
        for i in 0..n {
            for j in (i + 1)..n {
                vars[i * n + j] = Some(program.add_binary(format!("y_{i}_{j}")));
                vars[j * n + i] = Some(program.add_binary(format!("y_{j}_{i}")));
            }
        }
        let y = |i: usize, j: usize| vars[i * n + j].unwrap_or_default();

        for i in 0..n {
            for j in (i + 1)..n {
                let terms = vec![(y(i, j), 1.0), (y(j, i), 1.0)];
                if graph.is_mutual(i, j) {
                    program.add_constraint(format!("bidirectional_{i}_{j}"), terms, Relation::Ge, 1.0);
                } else {
                    program.add_constraint(format!("unidirectional_{i}_{j}"), terms, Relation::Eq, 1.0);
                }
            }
        }

        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                for k in (0..n).filter(|&k| k != i && k != j) {
                    program.add_constraint(
                        format!("trans_{i}_{j}_{k}"),
                        vec![(y(i, j), 1.0), (y(i, k), -1.0), (y(k, j), -1.0)],
                        Relation::Ge,
                        -1.0,
                    );
                }
            }
        }

        let terms = graph.arcs().map(|a| (y(a.from, a.to), -a.weight)).collect();
        program.set_linear_objective(terms, graph.total_weight());

        Self { n, vars, program }
    }

    /// Number of entities.
    #[must_use]
    pub const fn entity_count(&self) -> usize {
        self.n
    }

    /// Variable id of `y_ij`, or `None` for `i == j` / out of range.
    #[must_use]
    pub fn variable(&self, i: usize, j: usize) -> Option<VarId> {
        if i < self.n && j < self.n {
            self.vars[i * self.n + j]
        } else {
            None
        }
    }

    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Value matrix (`n × n`, zero diagonal) from a solver assignment.
    fn matrix(&self, values: &[f64]) -> Vec<Vec<f64>> {
        (0..self.n)
            .map(|i| {
                (0..self.n)
                    .map(|j| self.variable(i, j).map_or(0.0, |v| values[v]))
                    .collect()
            })
            .collect()
    }
}

/// Result of [`solve_exact`].
#[derive(Debug, Clone, PartialEq)]
pub struct FasSolution {
    /// Total weight of removed arcs.
    pub objective: f64,
    /// Arcs pointing against the ranking, row-major.
    pub removed_arcs: Vec<WeightedArc>,
    /// `precedes[i][j]` is the decoded `y_ij`.
    pub precedes: Vec<Vec<bool>>,
    /// Input graph with `removed_arcs` zeroed.
    pub residual: WeightedDigraph,
    /// Entities sorted by how many others they precede (descending, ties
    /// by index).
    pub order: Vec<usize>,
    pub status: SolveStatus,
}

impl FasSolution {
    /// `(from, to)` of every removed arc.
    #[must_use]
    pub fn removed_pairs(&self) -> Vec<(usize, usize)> {
        self.removed_arcs.iter().map(|a| (a.from, a.to)).collect()
    }
}

/// Result of [`solve_relaxed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FractionalRanking {
    /// LP optimum; a lower bound on the exact objective.
    pub lower_bound: f64,
    /// Fractional `y_ij` (zero diagonal).
    pub y: Vec<Vec<f64>>,
    /// Row sums of `y`: how strongly each entity precedes the rest.
    pub scores: Vec<f64>,
    /// Entities sorted by descending score, ties by index.
    pub order: Vec<usize>,
}

/// Solve B-FASP exactly with `solver`.
///
/// # Errors
///
/// Returns [`RankError::SolverInfeasible`] / [`RankError::SolverUnbounded`]
/// if the solver rejects the model, and [`RankError::Solver`] for any other
/// solver failure.
#[instrument(skip_all, fields(entities = graph.node_count(), solver = solver.name()))]
pub fn solve_exact(graph: &WeightedDigraph, solver: &dyn ConstraintSolver) -> Result<FasSolution> {
    let n = graph.node_count();
    if n < 2 {
        return Ok(FasSolution {
            objective: 0.0,
            removed_arcs: Vec::new(),
            precedes: vec![vec![false; n]; n],
            residual: graph.clone(),
            order: (0..n).collect(),
            status: SolveStatus::Optimal,
        });
    }

    let formulation = FasFormulation::new(graph);
    debug!(
        variables = formulation.program.variable_count(),
        constraints = formulation.program.constraint_count(),
        "built B-FASP program"
    );
    let solution = solver
        .solve(&formulation.program)
        .map_err(|e| RankError::from_solver(solver.name(), e, n, &formulation.program))?;

    let precedes: Vec<Vec<bool>> = formulation
        .matrix(&solution.values)
        .into_iter()
        .map(|row| row.into_iter().map(|y| y > 0.5).collect())
        .collect();
    let removed_arcs: Vec<WeightedArc> = graph.arcs().filter(|a| !precedes[a.from][a.to]).collect();
    let objective = removed_arcs.iter().map(|a| a.weight).sum();
    let pairs: Vec<(usize, usize)> = removed_arcs.iter().map(|a| (a.from, a.to)).collect();
    let residual = graph.without_arcs(&pairs);

    let wins: Vec<usize> = precedes.iter().map(|row| row.iter().filter(|&&p| p).count()).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| (Reverse(wins[i]), i));

    debug!(objective, removed = removed_arcs.len(), "exact B-FASP solved");
    Ok(FasSolution {
        objective,
        removed_arcs,
        precedes,
        residual,
        order,
        status: solution.status,
    })
}

/// Solve the LP relaxation of B-FASP (`y_ij` continuous in `[0, 1]`).
///
/// # Errors
///
/// Same as [`solve_exact`]; solvers that cannot handle continuous variables
/// fail with [`RankError::Solver`].
#[instrument(skip_all, fields(entities = graph.node_count(), solver = solver.name()))]
pub fn solve_relaxed(
    graph: &WeightedDigraph,
    solver: &dyn ConstraintSolver,
) -> Result<FractionalRanking> {
    let n = graph.node_count();
    if n < 2 {
        return Ok(FractionalRanking {
            lower_bound: 0.0,
            y: vec![vec![0.0; n]; n],
            scores: vec![0.0; n],
            order: (0..n).collect(),
        });
    }

    let formulation = FasFormulation::new(graph);
    let relaxed = formulation.program.relaxed();
    let solution = solver
        .solve(&relaxed)
        .map_err(|e| RankError::from_solver(solver.name(), e, n, &formulation.program))?;

    let y = formulation.matrix(&solution.values);
    let scores: Vec<f64> = y.iter().map(|row| row.iter().sum()).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    debug!(lower_bound = solution.objective, "relaxed B-FASP solved");
    Ok(FractionalRanking {
        lower_bound: solution.objective,
        y,
        scores,
        order,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
