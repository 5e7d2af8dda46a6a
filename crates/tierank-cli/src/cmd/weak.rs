//! `tierank weak`: break cycles, then group ties into a weak ordering.

use anyhow::Context as _;
use clap::{Args, ValueEnum};
use tierank_core::dominance::dominance_order;
use tierank_core::fas::solve_exact;
use tierank_core::graph::DegreeMode;
use tierank_core::report::{RankingReport, arc_records, weak_records};
use tierank_core::solver::SolveStatus;
use tierank_core::weak_order::weak_ordering;
use tracing::debug;

use super::{Context, InputArgs, constraint_solver};
use crate::output::render_item;

/// How cycles are broken before grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CycleBreaker {
    /// Exact bidirectional feedback arc set.
    #[default]
    Fas,
    /// Greedy dominance order (acyclic, no ties survive).
    Dominance,
}

/// Arguments for `tierank weak`.
#[derive(Args, Debug, Clone)]
pub struct WeakArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_enum, default_value_t = CycleBreaker::Fas)]
    pub via: CycleBreaker,
}

/// Execute `tierank weak`.
pub fn run_weak(args: &WeakArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = args.input.load()?;

    let (residual, removed, truncated) = match args.via {
        CycleBreaker::Fas => {
            let solver = constraint_solver(ctx.config.fas.solver, ctx.config.branch);
            let solution = solve_exact(&graph, solver.as_ref())?;
            let truncated = solution.status == SolveStatus::LimitReached;
            (solution.residual, solution.removed_arcs, truncated)
        }
        CycleBreaker::Dominance => {
            let ranking = dominance_order(&graph, DegreeMode::Count);
            (ranking.residual(&graph), ranking.feedback_arcs, false)
        }
    };
    debug!(removed = removed.len(), "cycles broken");

    let ordering = weak_ordering(&residual).context("residual graph still has a cycle")?;
    let removed = arc_records(&graph, &removed);
    let weight = removed.iter().map(|a| a.weight).sum();

    let report = RankingReport::new("weak", &graph)
        .with_objective(weight)
        .truncated(truncated)
        .with_tiers(weak_records(&ordering))
        .with_removed_arcs(removed);
    render_item(&report, ctx.output)?;
    Ok(())
}
