//! Exact search over contiguous tier splits.
//!
//! # Overview
//!
//! Given entities already arranged in a fixed order (e.g. by an external
//! rank) and a tier count `K`, every order-respecting partition is a choice
//! of `K − 1` strictly increasing split points in `1..n`. There are
//! `C(n − 1, K − 1)` of them. This module scores every candidate with the
//! cut-imbalance objective and keeps the extreme one.
//!
//! The search is exponential in `K` and intended for small inputs or as a
//! ground-truth oracle for faster solvers.
//!
//! # Determinism
//!
//! Candidates are generated in lexicographic split-point order. The winner
//! is the *first* candidate (in that order) achieving the best score, in
//! both sequential and parallel mode.
//!
//! # Limits
//!
//! `max_candidates` and `time_limit` stop the search early; the best
//! candidate seen so far is returned with `truncated = true`. At least one
//! candidate is always evaluated.

use std::time::{Duration, Instant};

use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::error::{RankError, Result};
use crate::graph::WeightedDigraph;
use crate::objective::{Direction, groups_imbalance};
use crate::partition::Partition;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for [`enumerate_tiers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerateConfig {
    /// Number of tiers `K`.
    pub tiers: usize,
    /// Which extreme of the cut imbalance to keep. Default: maximize.
    pub direction: Direction,
    /// Evaluate candidates on the rayon thread pool.
    pub parallel: bool,
    /// Stop after this many candidates.
    pub max_candidates: Option<usize>,
    /// Stop once this much wall time has elapsed.
    pub time_limit: Option<Duration>,
    /// Candidates per parallel batch. Default: 4096.
    pub chunk_size: usize,
}

impl Default for EnumerateConfig {
    fn default() -> Self {
        Self {
            tiers: 2,
            direction: Direction::default(),
            parallel: false,
            max_candidates: None,
            time_limit: None,
            chunk_size: 4096,
        }
    }
}

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Outcome of an exact tier search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSearch {
    /// Best partition found.
    pub partition: Partition,
    /// Its cut imbalance.
    pub score: f64,
    /// Split points (positions in the input order) of the best partition.
    pub splits: Vec<usize>,
    /// Number of candidates scored.
    pub evaluated: usize,
    /// Size of the full search space, if it fits in a `u64`.
    pub total_candidates: Option<u64>,
    /// `true` if a limit stopped the search before it was exhaustive.
    pub truncated: bool,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Identity order `0..n`.
#[must_use]
pub fn identity_order(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Number of ways to choose `k` items from `n`, if it fits in a `u64`.
#[must_use]
pub fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc.checked_mul(u128::try_from(n - i).ok()?)? / u128::try_from(i + 1).ok()?;
    }
    u64::try_from(acc).ok()
}

/// Find the best contiguous split of `order` into `config.tiers` tiers.
///
/// # Errors
///
/// - [`RankError::Shape`] if `order` is not a permutation of the graph's
///   entities.
/// - [`RankError::InfeasiblePartition`] if `tiers` is zero or exceeds the
///   entity count.
#[instrument(skip(graph, order), fields(n = graph.node_count(), tiers = config.tiers))]
pub fn enumerate_tiers(
    graph: &WeightedDigraph,
    order: &[usize],
    config: &EnumerateConfig,
) -> Result<TierSearch> {
    validate_order(graph, order)?;
    let n = order.len();
    let k = config.tiers;
    if k == 0 || k > n {
        return Err(RankError::InfeasiblePartition {
            entities: n,
            tiers: k,
        });
    }

    let total_candidates = binomial(n - 1, k - 1);
    if k == 1 {
        return Ok(TierSearch {
            partition: Partition::from_splits(order, &[])?,
            score: 0.0,
            splits: Vec::new(),
            evaluated: 1,
            total_candidates,
            truncated: false,
        });
    }

    debug!(?total_candidates, parallel = config.parallel, "enumerating tier splits");
    let started = Instant::now();
    let outcome = if config.parallel {
        search_parallel(graph, order, config, started)
    } else {
        search_sequential(graph, order, config, started)
    };

    let best = outcome.best.ok_or(RankError::InfeasiblePartition {
        entities: n,
        tiers: k,
    })?;
    if outcome.truncated {
        warn!(
            evaluated = outcome.evaluated,
            ?total_candidates,
            "tier search stopped by limit; result may not be optimal"
        );
    }

    Ok(TierSearch {
        partition: Partition::from_splits(order, &best.splits)?,
        score: best.score,
        splits: best.splits,
        evaluated: outcome.evaluated,
        total_candidates,
        truncated: outcome.truncated,
    })
}

#[derive(Debug, Clone)]
struct Candidate {
    index: usize,
    splits: Vec<usize>,
    score: f64,
}

#[derive(Debug, Default)]
struct Outcome {
    best: Option<Candidate>,
    evaluated: usize,
    truncated: bool,
}

impl Outcome {
    fn offer(&mut self, candidate: Candidate, direction: Direction) {
        let replace = self
            .best
            .as_ref()
            .is_none_or(|best| better(&candidate, best, direction));
        if replace {
            self.best = Some(candidate);
        }
    }
}

/// Strictly better score, or equal score found earlier in canonical order.
#[allow(clippy::float_cmp)]
fn better(a: &Candidate, b: &Candidate, direction: Direction) -> bool {
    direction.improves(a.score, b.score) || (a.score == b.score && a.index < b.index)
}

fn limit_reached(config: &EnumerateConfig, evaluated: usize, started: Instant) -> bool {
    if evaluated == 0 {
        return false;
    }
    config.max_candidates.is_some_and(|max| evaluated >= max)
        || config.time_limit.is_some_and(|limit| started.elapsed() >= limit)
}

fn score_splits(graph: &WeightedDigraph, order: &[usize], splits: &[usize]) -> f64 {
    let mut groups = Vec::with_capacity(splits.len() + 1);
    let mut start = 0;
    for &end in splits.iter().chain(std::iter::once(&order.len())) {
        groups.push(order[start..end].to_vec());
        start = end;
    }
    groups_imbalance(graph, &groups)
}

fn search_sequential(
    graph: &WeightedDigraph,
    order: &[usize],
    config: &EnumerateConfig,
    started: Instant,
) -> Outcome {
    let mut outcome = Outcome::default();
    for (index, splits) in (1..order.len()).combinations(config.tiers - 1).enumerate() {
        if limit_reached(config, outcome.evaluated, started) {
            outcome.truncated = true;
            break;
        }
        let score = score_splits(graph, order, &splits);
        trace!(?splits, score, "candidate");
        outcome.evaluated += 1;
        outcome.offer(
            Candidate {
                index,
                splits,
                score,
            },
            config.direction,
        );
    }
    outcome
}

fn search_parallel(
    graph: &WeightedDigraph,
    order: &[usize],
    config: &EnumerateConfig,
    started: Instant,
) -> Outcome {
    let mut outcome = Outcome::default();
    let mut candidates = (1..order.len()).combinations(config.tiers - 1);
    let chunk_size = config.chunk_size.max(1);

    loop {
        if limit_reached(config, outcome.evaluated, started) {
            outcome.truncated = candidates.next().is_some();
            break;
        }
        let budget = config
            .max_candidates
            .map_or(chunk_size, |max| {
                chunk_size.min(max.saturating_sub(outcome.evaluated).max(1))
            });
        let chunk: Vec<Vec<usize>> = candidates.by_ref().take(budget).collect();
        if chunk.is_empty() {
            break;
        }

        let base = outcome.evaluated;
        let chunk_len = chunk.len();
        let chunk_best = chunk
            .into_par_iter()
            .enumerate()
            .map(|(offset, splits)| {
                let score = score_splits(graph, order, &splits);
                trace!(?splits, score, "candidate");
                Candidate {
                    index: base + offset,
                    splits,
                    score,
                }
            })
            .reduce_with(|a, b| if better(&b, &a, config.direction) { b } else { a });

        outcome.evaluated += chunk_len;
        if let Some(candidate) = chunk_best {
            outcome.offer(candidate, config.direction);
        }
    }
    outcome
}

pub(crate) fn validate_order(graph: &WeightedDigraph, order: &[usize]) -> Result<()> {
    let n = graph.node_count();
    if order.len() != n {
        return Err(RankError::Shape(format!(
            "order lists {} entities, graph has {n}",
            order.len()
        )));
    }
    let mut seen = vec![false; n];
    for &i in order {
        if i >= n || std::mem::replace(&mut seen[i], true) {
            return Err(RankError::Shape(format!(
                "order entry {i} is out of range or repeated"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
