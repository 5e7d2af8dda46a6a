pub mod dominance;
pub mod fas;
pub mod tiers;
pub mod tournament;
pub mod weak;

use std::path::PathBuf;

use clap::Args;
use tierank_core::graph::WeightedDigraph;
use tierank_core::solver::{BranchAndBound, BranchConfig, ConstraintSolver, LinearSolver};

use crate::config::{SolverKind, TierankConfig};
use crate::input;
use crate::output::OutputMode;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: TierankConfig,
    pub output: OutputMode,
}

/// Input file plus optional entity filter.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Weight matrix (`.csv` with a header row, or `.json`).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Keep only these entities, in this order (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

impl InputArgs {
    /// Load and filter the input graph.
    pub fn load(&self) -> anyhow::Result<WeightedDigraph> {
        let graph = input::load_graph(&self.input)?;
        input::select(&graph, &self.only)
    }
}

/// Build the constraint solver selected by `kind`.
pub fn constraint_solver(kind: SolverKind, branch: BranchConfig) -> Box<dyn ConstraintSolver> {
    match kind {
        SolverKind::Linear => Box::new(LinearSolver::new()),
        SolverKind::Branch => Box::new(BranchAndBound::new(branch)),
    }
}
