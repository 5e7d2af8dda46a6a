//! `tierank fas`: minimum-weight bidirectional feedback arc set.

use clap::Args;
use tierank_core::fas::{solve_exact, solve_relaxed};
use tierank_core::report::{RankingReport, arc_records, order_records};
use tierank_core::solver::SolveStatus;
use tracing::info;

use super::{Context, InputArgs, constraint_solver};
use crate::config::SolverKind;
use crate::output::render_item;

/// Arguments for `tierank fas`.
#[derive(Args, Debug, Clone)]
pub struct FasArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Solve the LP relaxation and report its lower bound.
    #[arg(long)]
    pub relaxed: bool,

    /// Constraint solver (overrides `[fas] solver`).
    #[arg(long, value_enum)]
    pub solver: Option<SolverKind>,
}

/// Execute `tierank fas`.
pub fn run_fas(args: &FasArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let kind = args.solver.unwrap_or(ctx.config.fas.solver);
    let solver = constraint_solver(kind, ctx.config.branch);

    let report = if args.relaxed {
        let relaxed = solve_relaxed(&graph, solver.as_ref())?;
        info!(bound = relaxed.lower_bound, "relaxation solved");
        RankingReport::new("fas-relaxed", &graph)
            .with_lower_bound(relaxed.lower_bound)
            .with_tiers(order_records(&graph, &relaxed.order))
    } else {
        let solution = solve_exact(&graph, solver.as_ref())?;
        info!(
            solver = solver.name(),
            objective = solution.objective,
            removed = solution.removed_arcs.len(),
            "feedback arc set solved"
        );
        RankingReport::new("fas", &graph)
            .with_objective(solution.objective)
            .truncated(solution.status == SolveStatus::LimitReached)
            .with_tiers(order_records(&graph, &solution.order))
            .with_removed_arcs(arc_records(&graph, &solution.removed_arcs))
    };

    render_item(&report, ctx.output)?;
    Ok(())
}
