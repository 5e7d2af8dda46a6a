//! Native depth-first branch-and-bound over binary programs.
//!
//! # Overview
//!
//! Variables are fixed one at a time in program order. After each fixing,
//! every constraint touching that variable is checked against its activity
//! bounds (the smallest and largest left-hand side still reachable with the
//! remaining free variables); a violated bound prunes the subtree.
//!
//! For linear objectives the search also keeps an optimistic bound on the
//! best completion and skips subtrees that cannot beat the incumbent. Custom
//! objectives are only evaluated at leaves, so the search is exhaustive over
//! the feasible region, which propagation keeps small for tiering models.
//!
//! The first optimum found wins: a leaf replaces the incumbent only if it is
//! strictly better by more than `tolerance`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{
    ConstraintSolver, LinearConstraint, Objective, Program, ProgramSolution, Relation, Sense,
    SolveStatus, SolverError, VarKind,
};

/// Search limits for [`BranchAndBound`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    /// Stop after visiting this many nodes. Default: unlimited.
    pub node_limit: Option<u64>,
    /// Stop after this many milliseconds. Default: unlimited.
    pub time_limit_ms: Option<u64>,
    /// Numerical slack for constraint checks and improvement tests.
    pub tolerance: f64,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            node_limit: None,
            time_limit_ms: None,
            tolerance: 1e-9,
        }
    }
}

/// [`ConstraintSolver`] that enumerates binary assignments depth-first.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound {
    config: BranchConfig,
}

impl BranchAndBound {
    #[must_use]
    pub const fn new(config: BranchConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &BranchConfig {
        &self.config
    }
}

impl ConstraintSolver for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch"
    }

    #[instrument(skip_all, fields(variables = program.variable_count(), constraints = program.constraint_count()))]
    fn solve(&self, program: &Program) -> Result<ProgramSolution, SolverError> {
        if let Some(var) = program
            .variables
            .iter()
            .find(|v| v.kind != VarKind::Binary)
        {
            return Err(SolverError::Unsupported(format!(
                "variable {} is continuous; branch-and-bound handles binaries only",
                var.name
            )));
        }

        let mut search = Search::new(program, self.config);
        if !search.root_feasible() {
            return Err(SolverError::Infeasible);
        }
        search.descend(0)?;

        let nodes = search.nodes;
        let status = if search.stopped {
            SolveStatus::LimitReached
        } else {
            SolveStatus::Optimal
        };
        match search.incumbent {
            Some(values) => {
                let objective = program.evaluate(&values);
                if status == SolveStatus::LimitReached {
                    warn!(nodes, objective, "search limit reached; returning incumbent");
                } else {
                    debug!(nodes, objective, "branch-and-bound proved optimality");
                }
                Ok(ProgramSolution {
                    values,
                    objective,
                    status,
                    nodes,
                })
            }
            None if search.stopped => Err(SolverError::LimitReached { nodes }),
            None => Err(SolverError::Infeasible),
        }
    }
}

// ---------------------------------------------------------------------------
// Search state
// ---------------------------------------------------------------------------

/// Activity range of one constraint under the current partial assignment.
#[derive(Debug, Clone, Copy)]
struct Activity {
    min: f64,
    max: f64,
}

struct Search<'a> {
    program: &'a Program,
    tolerance: f64,
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    /// Sign that turns the objective into a cost to minimize.
    sign: f64,
    /// Per-variable linear cost coefficient (sign applied); empty for
    /// custom objectives.
    cost: Vec<f64>,
    /// Constant cost plus the cost of fixed variables.
    fixed_cost: f64,
    /// Sum of the negative cost coefficients of free variables.
    free_gain: f64,
    /// Constraint indices and merged coefficients touching each variable.
    touching: Vec<Vec<(usize, f64)>>,
    activity: Vec<Activity>,
    values: Vec<f64>,
    best_cost: f64,
    incumbent: Option<Vec<f64>>,
    nodes: u64,
    stopped: bool,
}

impl<'a> Search<'a> {
    fn new(program: &'a Program, config: BranchConfig) -> Self {
        let n = program.variable_count();
        let sign = match program.sense {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };

        let (cost, fixed_cost) = match &program.objective {
            Objective::Linear { terms, constant } => {
                let mut cost = vec![0.0; n];
                for &(var, coef) in terms {
                    cost[var] += sign * coef;
                }
                (cost, sign * constant)
            }
            Objective::Custom(_) => (Vec::new(), 0.0),
        };
        let free_gain = cost.iter().map(|c| c.min(0.0)).sum();

        let mut touching = vec![Vec::new(); n];
        let activity = program
            .constraints
            .iter()
            .enumerate()
            .map(|(idx, constraint)| {
                let merged = merged_terms(constraint, n);
                let mut range = Activity { min: 0.0, max: 0.0 };
                for (var, coef) in merged {
                    range.min += coef.min(0.0);
                    range.max += coef.max(0.0);
                    touching[var].push((idx, coef));
                }
                range
            })
            .collect();

        Self {
            program,
            tolerance: config.tolerance,
            node_limit: config.node_limit,
            deadline: config
                .time_limit_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
            sign,
            cost,
            fixed_cost,
            free_gain,
            touching,
            activity,
            values: vec![0.0; n],
            best_cost: f64::INFINITY,
            incumbent: None,
            nodes: 0,
            stopped: false,
        }
    }

    fn is_linear(&self) -> bool {
        !self.cost.is_empty() || self.program.variables.is_empty()
    }

    fn constraint_ok(&self, idx: usize) -> bool {
        let range = self.activity[idx];
        let constraint = &self.program.constraints[idx];
        let tol = self.tolerance;
        match constraint.relation {
            Relation::Le => range.min <= constraint.rhs + tol,
            Relation::Ge => range.max >= constraint.rhs - tol,
            Relation::Eq => range.min <= constraint.rhs + tol && range.max >= constraint.rhs - tol,
        }
    }

    fn root_feasible(&self) -> bool {
        (0..self.activity.len()).all(|idx| self.constraint_ok(idx))
    }

    fn out_of_budget(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        let over_nodes = self.node_limit.is_some_and(|limit| self.nodes >= limit);
        let over_time = self.deadline.is_some_and(|d| Instant::now() >= d);
        if over_nodes || over_time {
            self.stopped = true;
        }
        self.stopped
    }

    /// Fix `var` to `value`; returns whether every touched constraint can
    /// still be satisfied. Always paired with [`Self::unfix`].
    fn fix(&mut self, var: usize, value: f64) -> bool {
        if self.is_linear() {
            let c = self.cost[var];
            self.free_gain -= c.min(0.0);
            self.fixed_cost += c * value;
        }
        let mut ok = true;
        for k in 0..self.touching[var].len() {
            let (idx, coef) = self.touching[var][k];
            let range = &mut self.activity[idx];
            range.min += coef * value - coef.min(0.0);
            range.max += coef * value - coef.max(0.0);
            ok &= self.constraint_ok(idx);
        }
        self.values[var] = value;
        ok
    }

    fn unfix(&mut self, var: usize, value: f64) {
        if self.is_linear() {
            let c = self.cost[var];
            self.free_gain += c.min(0.0);
            self.fixed_cost -= c * value;
        }
        for k in 0..self.touching[var].len() {
            let (idx, coef) = self.touching[var][k];
            let range = &mut self.activity[idx];
            range.min -= coef * value - coef.min(0.0);
            range.max -= coef * value - coef.max(0.0);
        }
        self.values[var] = 0.0;
    }

    fn descend(&mut self, depth: usize) -> Result<(), SolverError> {
        if self.out_of_budget() {
            return Ok(());
        }
        self.nodes += 1;

        if self.is_linear() && self.fixed_cost + self.free_gain >= self.best_cost - self.tolerance {
            return Ok(());
        }

        if depth == self.values.len() {
            return self.leaf();
        }

        // Cheaper branch first for linear objectives; `1` first otherwise.
        let order = if self.is_linear() && self.cost[depth] >= 0.0 {
            [0.0, 1.0]
        } else {
            [1.0, 0.0]
        };
        for value in order {
            if self.fix(depth, value) {
                self.descend(depth + 1)?;
            }
            self.unfix(depth, value);
            if self.stopped {
                break;
            }
        }
        Ok(())
    }

    fn leaf(&mut self) -> Result<(), SolverError> {
        let cost = self.sign * self.program.evaluate(&self.values);
        if !cost.is_finite() {
            return Err(SolverError::Unbounded);
        }
        if cost < self.best_cost - self.tolerance {
            self.best_cost = cost;
            self.incumbent = Some(self.values.clone());
        }
        Ok(())
    }
}

/// Sum duplicate variable entries of a constraint.
fn merged_terms(constraint: &LinearConstraint, n: usize) -> Vec<(usize, f64)> {
    let mut coef = vec![0.0; n];
    let mut seen = vec![false; n];
    let mut order = Vec::with_capacity(constraint.terms.len());
    for &(var, c) in &constraint.terms {
        if !std::mem::replace(&mut seen[var], true) {
            order.push(var);
        }
        coef[var] += c;
    }
    order.into_iter().map(|var| (var, coef[var])).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
