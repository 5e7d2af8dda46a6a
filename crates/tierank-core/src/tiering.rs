//! Tier assignment as a constraint program.
//!
//! The same problem [`crate::enumerate`] solves by brute force, stated as a
//! binary program so any [`ConstraintSolver`] with custom-objective support
//! can attack it:
//!
//! ```text
//! x_{v,k} = 1  ⇔  entity v sits in tier k
//!
//! Σ_k x_{v,k} = 1                           every entity in one tier
//! Σ_v x_{v,k} ≥ 1                           no empty tier
//! Σ_k k·x_{a,k} ≤ Σ_k k·x_{b,k}             a directly ahead of b in the order
//! ```
//!
//! Only consecutive pairs of the order are constrained; the rest follows by
//! chaining. The objective is the cut imbalance of the decoded partition,
//! evaluated on complete assignments, so no product linearization is needed.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::enumerate::validate_order;
use crate::error::{RankError, Result};
use crate::graph::WeightedDigraph;
use crate::objective::{Direction, groups_imbalance};
use crate::partition::Partition;
use crate::solver::{ConstraintSolver, Program, Relation, Sense, SolveStatus, VarId};

/// Binary tier-assignment program for one graph, order and tier count.
#[derive(Debug, Clone)]
pub struct TieringFormulation {
    n: usize,
    tiers: usize,
    /// `x_{v,k}` id at `v * tiers + k`.
    vars: Vec<VarId>,
    program: Program,
}

impl TieringFormulation {
    /// Build the program.
    ///
    /// # Errors
    ///
    /// - [`RankError::Shape`] if `order` is not a permutation of the graph's
    ///   entities.
    /// - [`RankError::InfeasiblePartition`] if `tiers` is zero or exceeds the
    ///   entity count.
    pub fn new(
        graph: &WeightedDigraph,
        order: &[usize],
        tiers: usize,
        direction: Direction,
    ) -> Result<Self> {
        validate_order(graph, order)?;
        let n = graph.node_count();
        if tiers == 0 || tiers > n {
            return Err(RankError::InfeasiblePartition { entities: n, tiers });
        }

        let sense = match direction {
            Direction::Maximize => Sense::Maximize,
            Direction::Minimize => Sense::Minimize,
        };
        let mut program = Program::new(sense);

        // Variables follow the order so propagation sees each entity's
        // predecessor fixed before the entity itself.
        let mut vars = vec![0; n * tiers];
        for &v in order {
            for k in 0..tiers {
                vars[v * tiers + k] = program.add_binary(format!("x_{v}_{k}"));
            }
        }
        let x = |v: usize, k: usize| vars[v * tiers + k];

        for v in 0..n {
            program.add_constraint(
                format!("assign_{v}"),
                (0..tiers).map(|k| (x(v, k), 1.0)).collect(),
                Relation::Eq,
                1.0,
            );
        }
        for k in 0..tiers {
            program.add_constraint(
                format!("nonempty_{k}"),
                (0..n).map(|v| (x(v, k), 1.0)).collect(),
                Relation::Ge,
                1.0,
            );
        }
        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let mut terms: Vec<(VarId, f64)> = (1..tiers).map(|k| (x(a, k), tier_weight(k))).collect();
            terms.extend((1..tiers).map(|k| (x(b, k), -tier_weight(k))));
            program.add_constraint(format!("order_{a}_{b}"), terms, Relation::Le, 0.0);
        }

        let graph = graph.clone();
        let decode_vars = vars.clone();
        program.set_custom_objective(Arc::new(move |values: &[f64]| {
            groups_imbalance(&graph, &decode_groups(&decode_vars, tiers, values))
        }));

        Ok(Self {
            n,
            tiers,
            vars,
            program,
        })
    }

    /// Variable id of `x_{entity,tier}`.
    #[must_use]
    pub fn variable(&self, entity: usize, tier: usize) -> Option<VarId> {
        (entity < self.n && tier < self.tiers).then(|| self.vars[entity * self.tiers + tier])
    }

    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Decode a solver assignment.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::InvalidPartition`] if the assignment leaves a
    /// tier empty.
    pub fn decode(&self, values: &[f64]) -> Result<Partition> {
        Partition::new(decode_groups(&self.vars, self.tiers, values), self.n)
    }
}

#[allow(clippy::cast_precision_loss)]
fn tier_weight(k: usize) -> f64 {
    k as f64
}

/// Members of each tier; an entity goes to its first tier with `x > 0.5`.
fn decode_groups(vars: &[VarId], tiers: usize, values: &[f64]) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); tiers];
    for (v, row) in vars.chunks(tiers).enumerate() {
        if let Some(k) = row.iter().position(|&id| values[id] > 0.5) {
            groups[k].push(v);
        }
    }
    groups
}

/// Result of [`solve_tiering`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TieringSolution {
    pub partition: Partition,
    /// Cut imbalance of `partition`.
    pub score: f64,
    pub status: SolveStatus,
    /// Search nodes reported by the solver.
    pub nodes: u64,
}

/// Solve the tiering program with `solver`.
///
/// # Errors
///
/// Construction errors as for [`TieringFormulation::new`]; solver failures
/// as [`RankError::SolverInfeasible`], [`RankError::SolverUnbounded`] or
/// [`RankError::Solver`] (e.g. a solver without custom-objective support).
#[instrument(skip(graph, order, solver), fields(n = graph.node_count(), solver = solver.name()))]
pub fn solve_tiering(
    graph: &WeightedDigraph,
    order: &[usize],
    tiers: usize,
    direction: Direction,
    solver: &dyn ConstraintSolver,
) -> Result<TieringSolution> {
    let formulation = TieringFormulation::new(graph, order, tiers, direction)?;
    let solution = solver.solve(&formulation.program).map_err(|e| {
        RankError::from_solver(solver.name(), e, formulation.n, &formulation.program)
    })?;
    let partition = formulation.decode(&solution.values)?;
    let score = groups_imbalance(graph, partition.groups());
    debug!(score, nodes = solution.nodes, "tiering program solved");

    Ok(TieringSolution {
        partition,
        score,
        status: solution.status,
        nodes: solution.nodes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
