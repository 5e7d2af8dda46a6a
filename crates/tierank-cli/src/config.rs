//! Layered TOML configuration.
//!
//! Lookup order: `--config <path>`, `./tierank.toml`,
//! `<config_dir>/tierank/config.toml`, else built-in defaults. Command-line
//! flags override whatever the file sets.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tierank_core::enumerate::EnumerateConfig;
use tierank_core::objective::Direction;
use tierank_core::solver::BranchConfig;
use tracing::debug;

/// File name searched in the working directory.
pub const LOCAL_CONFIG: &str = "tierank.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierankConfig {
    #[serde(default)]
    pub enumerate: EnumerateSection,
    #[serde(default)]
    pub branch: BranchConfig,
    #[serde(default)]
    pub fas: FasSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Defaults for `tierank tiers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerateSection {
    pub tiers: usize,
    pub direction: Direction,
    pub parallel: bool,
    pub max_candidates: Option<usize>,
    pub time_limit_ms: Option<u64>,
    pub chunk_size: usize,
}

impl Default for EnumerateSection {
    fn default() -> Self {
        let base = EnumerateConfig::default();
        Self {
            tiers: base.tiers,
            direction: base.direction,
            parallel: base.parallel,
            max_candidates: base.max_candidates,
            time_limit_ms: None,
            chunk_size: base.chunk_size,
        }
    }
}

impl EnumerateSection {
    /// Core search configuration for these settings.
    pub fn to_config(&self) -> EnumerateConfig {
        EnumerateConfig {
            tiers: self.tiers,
            direction: self.direction,
            parallel: self.parallel,
            max_candidates: self.max_candidates,
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            chunk_size: self.chunk_size.max(1),
        }
    }
}

/// Which constraint solver backs the exact programs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// good_lp with the bundled microlp backend.
    #[default]
    Linear,
    /// Built-in depth-first branch and bound.
    Branch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FasSection {
    pub solver: SolverKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// `pretty`, `text` or `json`.
    pub format: Option<String>,
}

/// Load configuration, honoring an explicit path first.
///
/// # Errors
///
/// Returns an error if an explicit path is missing, or if any discovered
/// file cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<TierankConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    for candidate in candidate_paths() {
        if candidate.is_file() {
            return read_config(&candidate);
        }
    }

    debug!("no config file found, using defaults");
    Ok(TierankConfig::default())
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tierank").join("config.toml"));
    }
    paths
}

fn read_config(path: &Path) -> Result<TierankConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str::<TierankConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: TierankConfig = toml::from_str("").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config, TierankConfig::default());
        assert_eq!(config.enumerate.tiers, 2);
        assert_eq!(config.fas.solver, SolverKind::Linear);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: TierankConfig = toml::from_str(
            r#"
[enumerate]
tiers = 4
direction = "minimize"
time_limit_ms = 250

[branch]
node_limit = 1000

[fas]
solver = "branch"

[output]
format = "json"
"#,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(config.enumerate.tiers, 4);
        assert_eq!(config.enumerate.direction, Direction::Minimize);
        assert!(!config.enumerate.parallel);
        assert_eq!(config.branch.node_limit, Some(1000));
        assert!((config.branch.tolerance - 1e-9).abs() < f64::EPSILON);
        assert_eq!(config.fas.solver, SolverKind::Branch);
        assert_eq!(config.output.format.as_deref(), Some("json"));

        let core = config.enumerate.to_config();
        assert_eq!(core.time_limit, Some(Duration::from_millis(250)));
        assert_eq!(core.chunk_size, 4096);
    }

    #[test]
    fn explicit_path_is_required_to_exist() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let missing = dir.path().join("absent.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[enumerate]\nparallel = true\n").unwrap_or_else(|e| panic!("{e}"));
        let config = load_config(Some(&path)).unwrap_or_else(|e| panic!("{e}"));
        assert!(config.enumerate.parallel);
    }

    #[test]
    fn unknown_solver_is_rejected() {
        let parsed = toml::from_str::<TierankConfig>("[fas]\nsolver = \"simplex\"\n");
        assert!(parsed.is_err());
    }
}
