//! Solver-free B-FASP oracle for small graphs.
//!
//! Searches every weak ordering that B-FASP admits (tied groups must be
//! cliques of mutual arcs) by dynamic programming over entity subsets:
//!
//! ```text
//! best(S) = min over non-empty tie-able G ⊆ S of  back(G, S \ G) + best(S \ G)
//! ```
//!
//! where `G` is placed ahead of the rest of `S` and `back` is the weight of
//! arcs from `S \ G` into `G`. The work is `O(3^n · n)`, so the entity count
//! is capped at [`MAX_EXHAUSTIVE_ENTITIES`].

use serde::Serialize;
use tracing::instrument;

use crate::error::{RankError, Result};
use crate::graph::{WeightedArc, WeightedDigraph};

/// Largest graph [`exhaustive_fas`] accepts.
pub const MAX_EXHAUSTIVE_ENTITIES: usize = 10;

/// Optimal weak ordering found by [`exhaustive_fas`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExhaustiveFas {
    /// Total weight of removed arcs.
    pub cost: f64,
    /// Tied groups from highest to lowest; members sorted.
    pub groups: Vec<Vec<usize>>,
    /// Arcs pointing from a later group to an earlier one, row-major.
    pub removed_arcs: Vec<WeightedArc>,
}

/// Minimum-cost B-FASP ranking by exhaustive search.
///
/// Among equal-cost rankings the one whose leading group has the smallest
/// bitmask wins at every step, so the result is deterministic.
///
/// # Errors
///
/// Returns [`RankError::Shape`] for graphs larger than
/// [`MAX_EXHAUSTIVE_ENTITIES`].
#[instrument(skip_all, fields(entities = graph.node_count()))]
pub fn exhaustive_fas(graph: &WeightedDigraph) -> Result<ExhaustiveFas> {
    let n = graph.node_count();
    if n > MAX_EXHAUSTIVE_ENTITIES {
        return Err(RankError::Shape(format!(
            "exhaustive search supports at most {MAX_EXHAUSTIVE_ENTITIES} entities, got {n}"
        )));
    }

    let full = (1usize << n) - 1;
    let mutual: Vec<usize> = (0..n)
        .map(|v| {
            (0..n)
                .filter(|&u| graph.is_mutual(u, v))
                .fold(0, |mask, u| mask | (1 << u))
        })
        .collect();
    let tieable = |group: usize| members(group).all(|v| (group & !(1 << v) & !mutual[v]) == 0);
    let back = |group: usize, rest: usize| -> f64 {
        members(rest)
            .flat_map(|u| members(group).map(move |v| (u, v)))
            .map(|(u, v)| graph.weight(u, v))
            .sum()
    };

    let mut best = vec![f64::INFINITY; full + 1];
    let mut choice = vec![0usize; full + 1];
    best[0] = 0.0;
    for set in 1..=full {
        let mut group = next_submask(0, set);
        loop {
            if tieable(group) {
                let rest = set & !group;
                let cost = back(group, rest) + best[rest];
                if cost < best[set] - 1e-12 {
                    best[set] = cost;
                    choice[set] = group;
                }
            }
            if group == set {
                break;
            }
            group = next_submask(group, set);
        }
    }

    let mut groups = Vec::new();
    let mut rank = vec![0usize; n];
    let mut remaining = full;
    while remaining != 0 {
        let group = choice[remaining];
        for v in members(group) {
            rank[v] = groups.len();
        }
        groups.push(members(group).collect());
        remaining &= !group;
    }
    let removed_arcs = graph.arcs().filter(|a| rank[a.from] > rank[a.to]).collect();

    Ok(ExhaustiveFas {
        cost: best[full],
        groups,
        removed_arcs,
    })
}

/// Indices of the set bits of `mask`, ascending.
fn members(mask: usize) -> impl Iterator<Item = usize> {
    (0..usize::BITS as usize).filter(move |&bit| mask & (1 << bit) != 0)
}

/// Smallest submask of `set` greater than `current`.
const fn next_submask(current: usize, set: usize) -> usize {
    current.wrapping_sub(set) & set
}
