//! `tierank tournament`: emit a seeded random tournament.
//!
//! Text and pretty modes print the CSV layout and JSON mode prints the JSON
//! layout, so either can be fed straight back in as input.

use std::io::{self, Write};

use clap::Args;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tierank_core::graph::{TournamentConfig, WeightedDigraph, random_tournament};
use tracing::info;

use super::Context;
use crate::input::quote_field;
use crate::output::{Renderable, render_item};

/// Arguments for `tierank tournament`.
#[derive(Args, Debug, Clone)]
pub struct TournamentArgs {
    /// Number of entities.
    #[arg(short = 'n', long, default_value_t = 8)]
    pub nodes: usize,

    /// RNG seed (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability that a pair also gets the reverse arc.
    #[arg(long, default_value_t = 0.25)]
    pub bidirectional: f64,

    #[arg(long, default_value_t = 1)]
    pub min_weight: u32,

    #[arg(long, default_value_t = 10)]
    pub max_weight: u32,
}

/// Matrix in the JSON input layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixOutput {
    pub names: Vec<String>,
    pub weights: Vec<Vec<f64>>,
}

impl From<&WeightedDigraph> for MatrixOutput {
    fn from(graph: &WeightedDigraph) -> Self {
        Self {
            names: graph.names().to_vec(),
            weights: graph.to_matrix(),
        }
    }
}

impl Renderable for MatrixOutput {
    fn render_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        self.render_text(w)
    }

    fn render_text(&self, w: &mut dyn Write) -> io::Result<()> {
        let header: Vec<_> = self.names.iter().map(|name| quote_field(name)).collect();
        writeln!(w, ",{}", header.join(","))?;
        for (name, row) in header.iter().zip(&self.weights) {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            writeln!(w, "{name},{}", cells.join(","))?;
        }
        Ok(())
    }
}

/// Execute `tierank tournament`.
pub fn run_tournament(args: &TournamentArgs, ctx: &Context) -> anyhow::Result<()> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let config = TournamentConfig {
        nodes: args.nodes,
        bidirectional_probability: args.bidirectional,
        min_weight: args.min_weight,
        max_weight: args.max_weight,
    };
    let graph = random_tournament(&config, &mut StdRng::seed_from_u64(seed));
    info!(seed, nodes = args.nodes, "generated tournament");

    render_item(&MatrixOutput::from(&graph), ctx.output)?;
    Ok(())
}
