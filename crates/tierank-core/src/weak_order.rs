//! Weak ordering of a residual graph.
//!
//! # Overview
//!
//! After a feedback arc set has been removed, the residual graph is acyclic
//! apart from mutual arcs `A ⇄ B`, which mean "tied". [`weak_ordering`]
//! collapses every tie group (connected component of the mutual-arc
//! relation) into one rank and lays the groups out so that every remaining
//! one-way arc points from an earlier group to a later one.
//!
//! ## Traversal
//!
//! Depth-first from each unvisited entity in index order. Entering an entity
//! marks its whole tie group visited and collects the group's successors:
//! unvisited entities outside the group reached by a one-way arc. Once every
//! successor is finished the group is placed at the front of the result.
//! The traversal uses an explicit frame stack, so depth is bounded by heap,
//! not by the call stack.
//!
//! ## Precondition
//!
//! Longer cycles would make the layout ill-defined, so they are detected up
//! front with [`residual_cycles`] and reported as
//! [`RankError::UnexpectedCycle`] before any grouping starts.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{RankError, Result};
use crate::graph::{WeightedDigraph, residual_cycles, tied_groups};
use crate::partition::Partition;

/// One rank of a weak ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakGroup {
    /// 0 for the highest group.
    pub rank: usize,
    /// Entity indices, ascending.
    pub members: Vec<usize>,
    /// Display names, sorted.
    pub names: Vec<String>,
}

/// Ordered sequence of tie groups, highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeakOrdering {
    groups: Vec<WeakGroup>,
}

impl WeakOrdering {
    #[must_use]
    pub fn groups(&self) -> &[WeakGroup] {
        &self.groups
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group rank of every entity.
    #[must_use]
    pub fn rank_of(&self) -> Vec<usize> {
        let n = self.groups.iter().map(|g| g.members.len()).sum();
        let mut rank = vec![0; n];
        for group in &self.groups {
            for &member in &group.members {
                rank[member] = group.rank;
            }
        }
        rank
    }

    /// The ordering as a tier partition.
    ///
    /// # Errors
    ///
    /// Never fails for an ordering built by [`weak_ordering`]; the
    /// [`Partition`] validation is re-run for safety.
    pub fn to_partition(&self) -> Result<Partition> {
        let entities = self.groups.iter().map(|g| g.members.len()).sum();
        Partition::new(
            self.groups.iter().map(|g| g.members.clone()).collect(),
            entities,
        )
    }
}

/// A tie group being expanded.
struct Frame {
    group: Vec<usize>,
    successors: Vec<usize>,
    next: usize,
}

/// Lay out the tie groups of `graph` in a weak ordering.
///
/// Ties are transitive: a chain `a ⇄ b ⇄ c` puts all three in one group
/// even when `a` and `c` share no arc.
///
/// # Errors
///
/// Returns [`RankError::UnexpectedCycle`] naming the entities of the first
/// cycle that survives contraction of tie groups.
#[instrument(skip(graph), fields(n = graph.node_count()))]
pub fn weak_ordering(graph: &WeightedDigraph) -> Result<WeakOrdering> {
    if let Some(members) = residual_cycles(graph).into_iter().next() {
        return Err(RankError::UnexpectedCycle { members });
    }

    let n = graph.node_count();
    let tie = tied_groups(graph);
    let mut visited = FixedBitSet::with_capacity(n);
    let mut layout: VecDeque<Vec<usize>> = VecDeque::new();
    let mut stack: Vec<Frame> = Vec::new();

    for start in 0..n {
        if visited.contains(start) {
            continue;
        }
        stack.push(enter(graph, &tie, &mut visited, start));

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.successors.len() {
                let next = frame.successors[frame.next];
                frame.next += 1;
                if !visited.contains(next) {
                    stack.push(enter(graph, &tie, &mut visited, next));
                }
            } else if let Some(done) = stack.pop() {
                layout.push_front(done.group);
            }
        }
    }

    let groups: Vec<WeakGroup> = layout
        .into_iter()
        .enumerate()
        .map(|(rank, members)| {
            let mut names: Vec<String> = members.iter().map(|&m| graph.name(m).to_string()).collect();
            names.sort_unstable();
            WeakGroup {
                rank,
                members,
                names,
            }
        })
        .collect();
    debug!(groups = groups.len(), "weak ordering built");

    Ok(WeakOrdering { groups })
}

/// Mark `node`'s tie group visited and collect its pending successors.
fn enter(graph: &WeightedDigraph, tie: &[usize], visited: &mut FixedBitSet, node: usize) -> Frame {
    let n = graph.node_count();
    let group: Vec<usize> = (0..n).filter(|&v| tie[v] == tie[node]).collect();
    for &member in &group {
        visited.insert(member);
    }
    let successors = (0..n)
        .filter(|&v| !visited.contains(v))
        .filter(|&v| {
            group
                .iter()
                .any(|&m| graph.has_arc(m, v) && !graph.has_arc(v, m))
        })
        .collect();
    Frame {
        group,
        successors,
        next: 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
