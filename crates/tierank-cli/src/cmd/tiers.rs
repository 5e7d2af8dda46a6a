//! `tierank tiers`: contiguous K-tier partition by cut imbalance.

use std::time::Duration;

use clap::{Args, ValueEnum};
use tierank_core::dominance::dominance_order;
use tierank_core::enumerate::{EnumerateConfig, enumerate_tiers, identity_order};
use tierank_core::fas::solve_exact;
use tierank_core::graph::{DegreeMode, WeightedDigraph};
use tierank_core::objective::Direction;
use tierank_core::report::{RankingReport, partition_records};
use tierank_core::solver::{BranchAndBound, BranchConfig, SolveStatus};
use tierank_core::tiering::solve_tiering;
use tracing::info;

use super::{Context, InputArgs, constraint_solver};
use crate::output::render_item;

/// Where the entity order fed to the tier search comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OrderSource {
    /// Input order.
    #[default]
    Input,
    /// Order decoded from the exact feedback arc set.
    Fas,
    /// Greedy dominance order.
    Dominance,
}

/// How the partition is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TierEngine {
    /// Score every contiguous split.
    #[default]
    Enumerate,
    /// Solve the binary assignment program with branch and bound.
    Program,
}

/// Arguments for `tierank tiers`.
#[derive(Args, Debug, Clone)]
pub struct TiersArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of tiers.
    #[arg(short = 'k', long)]
    pub tiers: Option<usize>,

    /// Keep the smallest imbalance.
    #[arg(long, conflicts_with = "maximize")]
    pub minimize: bool,

    /// Keep the largest imbalance (default).
    #[arg(long)]
    pub maximize: bool,

    /// Score candidates on all cores (enumerate engine only).
    #[arg(long)]
    pub parallel: bool,

    /// Stop after this many candidates (enumerate engine only).
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Stop after this many milliseconds. Applies to both engines.
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Entity order the tiers must respect.
    #[arg(long, value_enum, default_value_t = OrderSource::Input)]
    pub order: OrderSource,

    /// Search strategy. The program engine takes its node limit from the
    /// `[branch]` config section.
    #[arg(long, value_enum, default_value_t = TierEngine::Enumerate)]
    pub engine: TierEngine,
}

impl TiersArgs {
    /// Merge flags over the config file's `[enumerate]` section.
    pub fn search_config(&self, ctx: &Context) -> EnumerateConfig {
        let mut config = ctx.config.enumerate.to_config();
        if let Some(tiers) = self.tiers {
            config.tiers = tiers;
        }
        if self.minimize {
            config.direction = Direction::Minimize;
        } else if self.maximize {
            config.direction = Direction::Maximize;
        }
        config.parallel |= self.parallel;
        if self.max_candidates.is_some() {
            config.max_candidates = self.max_candidates;
        }
        if let Some(ms) = self.time_limit_ms {
            config.time_limit = Some(Duration::from_millis(ms));
        }
        config
    }

    /// Branch-and-bound settings for the program engine, with
    /// `--time-limit-ms` over the config file's `[branch]` section.
    pub fn branch_config(&self, ctx: &Context) -> BranchConfig {
        let mut branch = ctx.config.branch;
        if self.time_limit_ms.is_some() {
            branch.time_limit_ms = self.time_limit_ms;
        }
        branch
    }
}

fn entity_order(graph: &WeightedDigraph, source: OrderSource, ctx: &Context) -> anyhow::Result<Vec<usize>> {
    Ok(match source {
        OrderSource::Input => identity_order(graph.node_count()),
        OrderSource::Dominance => dominance_order(graph, DegreeMode::Count).order,
        OrderSource::Fas => {
            let solver = constraint_solver(ctx.config.fas.solver, ctx.config.branch);
            solve_exact(graph, solver.as_ref())?.order
        }
    })
}

/// Execute `tierank tiers`.
pub fn run_tiers(args: &TiersArgs, ctx: &Context) -> anyhow::Result<()> {
    let graph = args.input.load()?;
    let config = args.search_config(ctx);
    let order = entity_order(&graph, args.order, ctx)?;

    let report = match args.engine {
        TierEngine::Enumerate => {
            let search = enumerate_tiers(&graph, &order, &config)?;
            info!(
                evaluated = search.evaluated,
                truncated = search.truncated,
                score = search.score,
                "tier search finished"
            );
            RankingReport::new("tiers", &graph)
                .with_objective(search.score)
                .truncated(search.truncated)
                .with_tiers(partition_records(&graph, &search.partition))
        }
        TierEngine::Program => {
            let solver = BranchAndBound::new(args.branch_config(ctx));
            let solved = solve_tiering(&graph, &order, config.tiers, config.direction, &solver)?;
            info!(nodes = solved.nodes, score = solved.score, "tier program solved");
            RankingReport::new("tiers", &graph)
                .with_objective(solved.score)
                .truncated(solved.status == SolveStatus::LimitReached)
                .with_tiers(partition_records(&graph, &solved.partition))
        }
    };

    render_item(&report, ctx.output)?;
    Ok(())
}

