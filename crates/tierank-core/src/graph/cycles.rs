//! Cycle detection over weighted digraphs and their residual graphs.
//!
//! # Ties versus cycles
//!
//! A residual graph (a digraph with a feedback arc set removed) may still
//! contain mutual arcs `A ⇄ B`. Those represent ties, not ordering
//! violations. [`tied_groups`] collapses every connected component of the
//! mutual-arc relation into one group, and [`residual_cycles`] reports only
//! the cycles that survive that contraction.

#![allow(clippy::module_name_repetitions)]

use std::collections::VecDeque;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use super::digraph::WeightedDigraph;

/// Find every strongly connected component with more than one member.
///
/// Each entry is the sorted list of entity names in one component. The
/// outer list is sorted for deterministic output.
#[must_use]
pub fn find_cycles(graph: &WeightedDigraph) -> Vec<Vec<String>> {
    let pg = graph.to_petgraph();
    let mut cycles: Vec<Vec<String>> = tarjan_scc(&pg)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut names: Vec<String> =
                component.into_iter().map(|idx| pg[idx].clone()).collect();
            names.sort_unstable();
            names
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

/// Returns `true` if the graph has no directed cycle (mutual arcs count as
/// cycles here).
#[must_use]
pub fn is_acyclic(graph: &WeightedDigraph) -> bool {
    toposort(&graph.to_petgraph(), None).is_ok()
}

/// Assign every entity to its tie group.
///
/// Two entities share a group when they are connected through a chain of
/// mutual arcs. Group ids are dense and numbered in order of each group's
/// lowest member index.
#[must_use]
pub fn tied_groups(graph: &WeightedDigraph) -> Vec<usize> {
    let n = graph.node_count();
    let mut group: Vec<Option<usize>> = vec![None; n];
    let mut next_id = 0;

    for start in 0..n {
        if group[start].is_some() {
            continue;
        }
        group[start] = Some(next_id);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for other in 0..n {
                if group[other].is_none() && graph.is_mutual(node, other) {
                    group[other] = Some(next_id);
                    queue.push_back(other);
                }
            }
        }
        next_id += 1;
    }

    group.into_iter().map(|g| g.unwrap_or_default()).collect()
}

/// Report cycles that remain after contracting tie groups.
///
/// Each entry lists the sorted names of every entity in the offending
/// strongly connected component of the contracted graph. An empty result
/// means the graph is a valid input for weak ordering.
#[must_use]
pub fn residual_cycles(graph: &WeightedDigraph) -> Vec<Vec<String>> {
    let groups = tied_groups(graph);
    let group_count = groups.iter().copied().max().map_or(0, |g| g + 1);

    let mut contracted = DiGraph::<usize, ()>::with_capacity(group_count, graph.arc_count());
    let nodes: Vec<NodeIndex> = (0..group_count).map(|g| contracted.add_node(g)).collect();
    for arc in graph.arcs() {
        let (gu, gv) = (groups[arc.from], groups[arc.to]);
        if gu != gv && !contracted.contains_edge(nodes[gu], nodes[gv]) {
            contracted.add_edge(nodes[gu], nodes[gv], ());
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&contracted)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut names: Vec<String> = (0..graph.node_count())
                .filter(|&i| component.iter().any(|&c| contracted[c] == groups[i]))
                .map(|i| graph.name(i).to_string())
                .collect();
            names.sort_unstable();
            names
        })
        .collect();

    cycles.sort_unstable();
    cycles
}
