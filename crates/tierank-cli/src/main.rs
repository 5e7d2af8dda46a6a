#![forbid(unsafe_code)]

mod cmd;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tierank: tiered ranking of weighted dominance graphs",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for tierank crates.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Read configuration from this file instead of the default lookup.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Split entities into K contiguous tiers",
        long_about = "Search every contiguous split of an entity order into K non-empty tiers and keep the one with the most (or least) cut imbalance.",
        after_help = "EXAMPLES:\n    # Three tiers over the input order\n    tierank tiers weights.csv -k 3\n\n    # Respect the exact feedback-arc-set order, search in parallel\n    tierank tiers weights.csv -k 4 --order fas --parallel\n\n    # Emit machine-readable output\n    tierank tiers weights.csv -k 3 --json"
    )]
    Tiers(cmd::tiers::TiersArgs),

    #[command(
        about = "Minimum-weight feedback arc set",
        long_about = "Solve the bidirectional feedback arc set problem exactly, or its LP relaxation for a lower bound.",
        after_help = "EXAMPLES:\n    # Exact solve with the LP backend\n    tierank fas weights.csv\n\n    # Built-in branch and bound\n    tierank fas weights.csv --solver branch\n\n    # Lower bound only\n    tierank fas weights.csv --relaxed"
    )]
    Fas(cmd::fas::FasArgs),

    #[command(
        about = "Greedy dominance ordering",
        after_help = "EXAMPLES:\n    # Order by arc counts\n    tierank dominance weights.csv\n\n    # Order by arc weights\n    tierank dominance weights.csv --weighted"
    )]
    Dominance(cmd::dominance::DominanceArgs),

    #[command(
        about = "Weak ordering with tie groups",
        long_about = "Break cycles (exact feedback arc set by default), then group entities joined by mutual arcs and order the groups.",
        after_help = "EXAMPLES:\n    # Feedback arc set, then weak ordering\n    tierank weak weights.csv\n\n    # Restrict to a few entities\n    tierank weak weights.csv --only MIT,CMU,Stanford"
    )]
    Weak(cmd::weak::WeakArgs),

    #[command(
        about = "Generate a random tournament",
        after_help = "EXAMPLES:\n    # Reproducible 12-entity tournament as CSV\n    tierank tournament -n 12 --seed 42 > t.csv\n\n    # As JSON\n    tierank tournament -n 12 --seed 42 --json > t.json"
    )]
    Tournament(cmd::tournament::TournamentArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TIERANK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tierank=debug,info"
        } else {
            "tierank=info,warn"
        })
    });

    let format = env::var("TIERANK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;
    let output = output::resolve_output_mode(cli.format, cli.json, config.output.format.as_deref());
    debug!(?output, "resolved output mode");
    let ctx = cmd::Context { config, output };

    match cli.command {
        Commands::Tiers(ref args) => cmd::tiers::run_tiers(args, &ctx),
        Commands::Fas(ref args) => cmd::fas::run_fas(args, &ctx),
        Commands::Dominance(ref args) => cmd::dominance::run_dominance(args, &ctx),
        Commands::Weak(ref args) => cmd::weak::run_weak(args, &ctx),
        Commands::Tournament(ref args) => cmd::tournament::run_tournament(args, &ctx),
    }
}
