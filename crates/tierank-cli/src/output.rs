//! Shared output layer: pretty, text and JSON renderings of every result.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flags
//! 2. `TIERANK_FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `[output] format` in the config file
//! 4. Default: [`OutputMode::Text`]

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use tierank_core::report::RankingReport;

use crate::input::quote_field;

/// Shared width for pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Left-aligned key/value line.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-oriented sections and tables.
    Pretty,
    /// Tab-separated rows for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    config_format: Option<&str>,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    if json_flag {
        return OutputMode::Json;
    }
    format_env
        .and_then(OutputMode::parse)
        .or_else(|| config_format.and_then(OutputMode::parse))
        .unwrap_or(OutputMode::Text)
}

/// Resolve the output mode from flags, environment and config.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_format: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("TIERANK_FORMAT").ok();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), config_format)
}

/// A result that can be rendered in every mode.
pub trait Renderable: Serialize {
    /// Sections and tables for people.
    fn render_pretty(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Tab-separated rows.
    fn render_text(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Pretty-printed JSON.
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, self).map_err(io::Error::other)?;
        writeln!(w)
    }

    fn render(&self, mode: OutputMode, w: &mut dyn Write) -> io::Result<()> {
        match mode {
            OutputMode::Pretty => self.render_pretty(w),
            OutputMode::Text => self.render_text(w),
            OutputMode::Json => self.render_json(w),
        }
    }
}

/// Render `item` to stdout.
pub fn render_item<R: Renderable>(item: &R, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    item.render(mode, &mut out)
}

fn format_score(value: f64) -> String {
    format!("{value:.6}")
}

impl Renderable for RankingReport {
    fn render_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("tierank {}", self.method))?;
        pretty_kv(w, "entities", self.entities.to_string())?;
        pretty_kv(w, "input", &self.input_hash)?;
        if let Some(objective) = self.objective {
            pretty_kv(w, "objective", format_score(objective))?;
        }
        if let Some(bound) = self.lower_bound {
            pretty_kv(w, "lower bound", format_score(bound))?;
        }
        if self.truncated {
            pretty_kv(w, "status", "truncated by a search limit")?;
        }

        writeln!(w)?;
        pretty_section(w, "Ranking")?;
        for tier in &self.tiers {
            writeln!(w, "{:>4}  {}", tier.rank + 1, tier.names.join(", "))?;
        }

        if !self.removed_arcs.is_empty() {
            writeln!(w)?;
            pretty_section(w, "Removed arcs")?;
            for arc in &self.removed_arcs {
                writeln!(w, "{} → {}  ({})", arc.from_name, arc.to_name, arc.weight)?;
            }
            pretty_kv(w, "total weight", format_score(self.removed_weight()))?;
        }
        Ok(())
    }

    fn render_text(&self, w: &mut dyn Write) -> io::Result<()> {
        if let Some(objective) = self.objective {
            writeln!(w, "# objective\t{}", format_score(objective))?;
        }
        if let Some(bound) = self.lower_bound {
            writeln!(w, "# lower_bound\t{}", format_score(bound))?;
        }
        if self.truncated {
            writeln!(w, "# truncated")?;
        }
        for tier in &self.tiers {
            let names: Vec<_> = tier.names.iter().map(|name| quote_field(name)).collect();
            writeln!(w, "{}\t{}", tier.rank, names.join(","))?;
        }
        for arc in &self.removed_arcs {
            writeln!(w, "removed\t{}\t{}\t{}", arc.from_name, arc.to_name, arc.weight)?;
        }
        Ok(())
    }
}
