//! `tierank dominance`: greedy out-minus-in ordering.

use clap::Args;
use tierank_core::dominance::dominance_order;
use tierank_core::graph::DegreeMode;
use tierank_core::report::{RankingReport, arc_records, order_records};

use super::{Context, InputArgs};
use crate::output::render_item;

/// Arguments for `tierank dominance`.
#[derive(Args, Debug, Clone)]
pub struct DominanceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Score by arc weight instead of arc count.
    #[arg(long)]
    pub weighted: bool,
}

/// Execute `tierank dominance`.
pub fn run_dominance(args: &DominanceArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let mode = if args.weighted {
        DegreeMode::Weight
    } else {
        DegreeMode::Count
    };
    let ranking = dominance_order(&graph, mode);

    let report = RankingReport::new("dominance", &graph)
        .with_objective(ranking.cost)
        .with_tiers(order_records(&graph, &ranking.order))
        .with_removed_arcs(arc_records(&graph, &ranking.feedback_arcs));
    render_item(&report, ctx.output)?;
    Ok(())
}
