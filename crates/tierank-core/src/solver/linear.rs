//! Linear and mixed-integer solving through `good_lp`.
//!
//! Uses the pure-Rust `microlp` backend, so no system solver library is
//! needed. Binary variables become integer variables bounded to `[0, 1]`;
//! their values are snapped to exactly 0 or 1 on the way out.

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, default_solver,
    variable,
};
use tracing::{debug, instrument};

use super::{
    ConstraintSolver, Objective, Program, ProgramSolution, Relation, Sense, SolveStatus,
    SolverError, VarId, VarKind,
};

/// [`ConstraintSolver`] backed by good_lp/microlp.
///
/// Handles linear objectives only; a [`Objective::Custom`] program is
/// rejected with [`SolverError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSolver;

impl LinearSolver {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn expression(handles: &[good_lp::Variable], terms: &[(VarId, f64)]) -> Expression {
    let mut expr = Expression::with_capacity(terms.len());
    for &(var, coef) in terms {
        expr.add_mul(coef, handles[var]);
    }
    expr
}

fn resolution_error(err: ResolutionError) -> SolverError {
    match err {
        ResolutionError::Infeasible => SolverError::Infeasible,
        ResolutionError::Unbounded => SolverError::Unbounded,
        other => SolverError::Backend(other.to_string()),
    }
}

impl ConstraintSolver for LinearSolver {
    fn name(&self) -> &'static str {
        "linear"
    }

    #[instrument(skip_all, fields(variables = program.variable_count(), constraints = program.constraint_count()))]
    fn solve(&self, program: &Program) -> Result<ProgramSolution, SolverError> {
        let Objective::Linear { terms, .. } = &program.objective else {
            return Err(SolverError::Unsupported(
                "custom objectives need a search-based solver".into(),
            ));
        };

        let mut vars = ProblemVariables::new();
        let handles: Vec<good_lp::Variable> = program
            .variables
            .iter()
            .map(|v| match v.kind {
                VarKind::Binary => vars.add(variable().binary()),
                VarKind::Continuous { lower, upper } => vars.add(variable().min(lower).max(upper)),
            })
            .collect();

        // The constant term does not move the optimum; it is added back by
        // `Program::evaluate`.
        let objective = expression(&handles, terms);
        let unsolved = match program.sense {
            Sense::Minimize => vars.minimise(objective),
            Sense::Maximize => vars.maximise(objective),
        };
        let mut model = unsolved.using(default_solver);
        for constraint in &program.constraints {
            let lhs = expression(&handles, &constraint.terms);
            model = model.with(match constraint.relation {
                Relation::Le => lhs.leq(constraint.rhs),
                Relation::Ge => lhs.geq(constraint.rhs),
                Relation::Eq => lhs.eq(constraint.rhs),
            });
        }

        let solution = model.solve().map_err(resolution_error)?;
        let values: Vec<f64> = program
            .variables
            .iter()
            .zip(&handles)
            .map(|(v, &handle)| {
                let x = solution.value(handle);
                match v.kind {
                    VarKind::Binary => {
                        if x > 0.5 {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    VarKind::Continuous { .. } => x,
                }
            })
            .collect();
        let objective = program.evaluate(&values);
        debug!(objective, "linear solve finished");

        Ok(ProgramSolution {
            values,
            objective,
            status: SolveStatus::Optimal,
            nodes: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn solves_small_integer_program() {
        // max 3x + 2y  s.t.  x + y <= 1
        let mut p = Program::new(Sense::Maximize);
        let x = p.add_binary("x");
        let y = p.add_binary("y");
        p.add_constraint("cap", vec![(x, 1.0), (y, 1.0)], Relation::Le, 1.0);
        p.set_linear_objective(vec![(x, 3.0), (y, 2.0)], 0.5);

        let sol = LinearSolver.solve(&p).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(sol.values, vec![1.0, 0.0]);
        assert!((sol.objective - 3.5).abs() < 1e-9);
        assert_eq!(sol.status, SolveStatus::Optimal);
    }

    #[test]
    fn relaxation_can_be_fractional() {
        // max x + y  s.t.  2x + 2y <= 3  (integer optimum 1, LP optimum 1.5)
        let mut p = Program::new(Sense::Maximize);
        let x = p.add_binary("x");
        let y = p.add_binary("y");
        p.add_constraint("cap", vec![(x, 2.0), (y, 2.0)], Relation::Le, 3.0);
        p.set_linear_objective(vec![(x, 1.0), (y, 1.0)], 0.0);

        let exact = LinearSolver.solve(&p).unwrap_or_else(|e| panic!("{e}"));
        let relaxed = LinearSolver.solve(&p.relaxed()).unwrap_or_else(|e| panic!("{e}"));
        assert!((exact.objective - 1.0).abs() < 1e-6);
        assert!((relaxed.objective - 1.5).abs() < 1e-6);
    }

    #[test]
    fn reports_infeasible() {
        let mut p = Program::new(Sense::Minimize);
        let x = p.add_binary("x");
        p.add_constraint("impossible", vec![(x, 1.0)], Relation::Ge, 2.0);
        assert_eq!(LinearSolver.solve(&p), Err(SolverError::Infeasible));
    }

    #[test]
    fn rejects_custom_objective() {
        let mut p = Program::new(Sense::Minimize);
        p.add_binary("x");
        p.set_custom_objective(Arc::new(|_: &[f64]| 0.0));
        assert!(matches!(
            LinearSolver.solve(&p),
            Err(SolverError::Unsupported(_))
        ));
    }
}
