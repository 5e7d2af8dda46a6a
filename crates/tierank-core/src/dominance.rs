//! Greedy dominance ordering.
//!
//! Repeatedly takes the remaining entity with the largest
//! `out_degree − in_degree`, where both degrees only count arcs between
//! entities that are still unplaced. Every arc that ends up pointing from a
//! later entity to an earlier one is a feedback arc; removing them leaves an
//! acyclic graph.
//!
//! Degrees are maintained incrementally, so the whole ordering is `O(n²)`.

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::graph::{DegreeMode, WeightedArc, WeightedDigraph};

/// Result of [`dominance_order`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominanceRanking {
    /// Entities from most to least dominant.
    pub order: Vec<usize>,
    /// Positive arcs `(u, v)` with `u` placed after `v`, row-major.
    pub feedback_arcs: Vec<WeightedArc>,
    /// Total weight of `feedback_arcs`.
    pub cost: f64,
}

impl DominanceRanking {
    /// Position of every entity in `order`.
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        let mut position = vec![0; self.order.len()];
        for (p, &v) in self.order.iter().enumerate() {
            position[v] = p;
        }
        position
    }

    /// `graph` with the feedback arcs removed.
    #[must_use]
    pub fn residual(&self, graph: &WeightedDigraph) -> WeightedDigraph {
        let pairs: Vec<(usize, usize)> = self.feedback_arcs.iter().map(|a| (a.from, a.to)).collect();
        graph.without_arcs(&pairs)
    }
}

fn term(weight: f64, mode: DegreeMode) -> f64 {
    match mode {
        DegreeMode::Count => f64::from(u8::from(weight > 0.0)),
        DegreeMode::Weight => weight,
    }
}

/// Order entities greedily by residual dominance.
///
/// Ties go to the lowest entity index.
#[must_use]
#[instrument(skip(graph), fields(n = graph.node_count()))]
pub fn dominance_order(graph: &WeightedDigraph, mode: DegreeMode) -> DominanceRanking {
    let n = graph.node_count();
    let mut score: Vec<f64> = (0..n)
        .map(|v| graph.out_degree(v, mode) - graph.in_degree(v, mode))
        .collect();
    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for _ in 0..n {
        let mut pick: Option<usize> = None;
        for v in (0..n).filter(|&v| !placed[v]) {
            if pick.is_none_or(|p| score[v] > score[p]) {
                pick = Some(v);
            }
        }
        let Some(u) = pick else { break };
        trace!(entity = u, score = score[u], "placed");
        placed[u] = true;
        order.push(u);

        for v in (0..n).filter(|&v| !placed[v]) {
            score[v] += term(graph.weight(u, v), mode) - term(graph.weight(v, u), mode);
        }
    }

    let mut position = vec![0; n];
    for (p, &v) in order.iter().enumerate() {
        position[v] = p;
    }
    let feedback_arcs: Vec<WeightedArc> = graph
        .arcs()
        .filter(|a| position[a.from] > position[a.to])
        .collect();
    let cost = feedback_arcs.iter().map(|a| a.weight).sum();
    debug!(cost, feedback = feedback_arcs.len(), "dominance ordering done");

    DominanceRanking {
        order,
        feedback_arcs,
        cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::is_acyclic;

    fn graph(rows: Vec<Vec<f64>>) -> WeightedDigraph {
        WeightedDigraph::from_matrix(rows, None).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn chain_is_ordered_without_feedback() {
        let g = graph(vec![
            vec![0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0],
        ]);
        let r = dominance_order(&g, DegreeMode::Count);
        assert_eq!(r.order, vec![0, 1, 2]);
        assert!(r.feedback_arcs.is_empty());
        assert!(r.cost.abs() < f64::EPSILON);
    }

    #[test]
    fn three_cycle_ties_break_by_index() {
        // 0 → 1 → 2 → 0: all scores equal
        let g = graph(vec![
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 0.0],
        ]);
        let r = dominance_order(&g, DegreeMode::Count);
        assert_eq!(r.order, vec![0, 1, 2]);
        assert_eq!(r.feedback_arcs.len(), 1);
        assert_eq!((r.feedback_arcs[0].from, r.feedback_arcs[0].to), (2, 0));
        assert!(is_acyclic(&r.residual(&g)));
    }

    #[test]
    fn weight_mode_follows_heavy_arcs() {
        // Count mode sees a tie between 0 and 1; weights favour 1.
        let g = graph(vec![vec![0.0, 1.0], vec![9.0, 0.0]]);
        assert_eq!(dominance_order(&g, DegreeMode::Count).order, vec![0, 1]);
        let weighted = dominance_order(&g, DegreeMode::Weight);
        assert_eq!(weighted.order, vec![1, 0]);
        assert!((weighted.cost - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degrees_shrink_to_remaining_entities() {
        // 0 beats everyone; among {1, 2, 3}, 3 beats 1 and 2.
        let g = graph(vec![
            vec![0.0, 1.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0, 0.0],
        ]);
        let r = dominance_order(&g, DegreeMode::Count);
        assert_eq!(r.order, vec![0, 3, 1, 2]);
        assert_eq!(r.positions(), vec![0, 2, 3, 1]);
    }

    #[test]
    fn empty_graph() {
        let r = dominance_order(&graph(Vec::new()), DegreeMode::Count);
        assert!(r.order.is_empty());
    }
}
