//! Dense weighted digraph over a fixed set of named entities.
//!
//! # Overview
//!
//! [`WeightedDigraph`] stores an `n × n` non-negative weight matrix in
//! row-major order. Entry `(i, j)` is the strength of the directed relation
//! `i → j`; zero means "no arc". The diagonal is always zero.
//!
//! The graph is immutable once built. Operations that "remove" arcs (e.g.
//! deleting a feedback arc set) return a new graph.
//!
//! ## Fingerprint
//!
//! [`WeightedDigraph::content_hash`] is a BLAKE3 hash over the entity names
//! and the arc list, so two runs over the same table can be matched up in
//! reports.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::DiGraph;
use serde::Serialize;

use crate::error::{RankError, Result};

/// How node degrees are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeMode {
    /// Number of incident arcs with positive weight.
    #[default]
    Count,
    /// Sum of incident arc weights.
    Weight,
}

/// A single arc with positive weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedArc {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Immutable weighted directed graph over entities `0..n`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedDigraph {
    n: usize,
    weights: Vec<f64>,
    names: Vec<String>,
    content_hash: String,
}

impl WeightedDigraph {
    /// Build a graph from a square matrix of weights.
    ///
    /// When `names` is `None`, entities are named by their decimal index.
    /// The diagonal is forced to zero.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Shape`] if the matrix is ragged or not square,
    /// if the name count differs from the row count, or if any off-diagonal
    /// weight is negative or not finite.
    pub fn from_matrix(rows: Vec<Vec<f64>>, names: Option<Vec<String>>) -> Result<Self> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(RankError::Shape(format!(
                    "matrix is not square: row {i} has {} columns, expected {n}",
                    row.len()
                )));
            }
        }

        let mut weights = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            for (j, w) in row.into_iter().enumerate() {
                if i == j {
                    weights.push(0.0);
                } else {
                    weights.push(check_weight(i, j, w)?);
                }
            }
        }

        Self::assemble(n, weights, names)
    }

    /// Build a graph from an explicit arc-weight mapping.
    ///
    /// Keys missing from the map have weight zero. Self-loop keys are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Shape`] for out-of-range indices, a name-count
    /// mismatch, or a negative / non-finite weight.
    pub fn from_arcs(
        n: usize,
        arcs: &BTreeMap<(usize, usize), f64>,
        names: Option<Vec<String>>,
    ) -> Result<Self> {
        let mut weights = vec![0.0; n * n];
        for (&(i, j), &w) in arcs {
            if i >= n || j >= n {
                return Err(RankError::Shape(format!(
                    "arc ({i}, {j}) is out of range for {n} entities"
                )));
            }
            if i == j {
                continue;
            }
            weights[i * n + j] = check_weight(i, j, w)?;
        }

        Self::assemble(n, weights, names)
    }

    fn assemble(n: usize, weights: Vec<f64>, names: Option<Vec<String>>) -> Result<Self> {
        let names = match names {
            Some(names) if names.len() != n => {
                return Err(RankError::Shape(format!(
                    "{} names supplied for a {n}x{n} matrix",
                    names.len()
                )));
            }
            Some(names) => names,
            None => (0..n).map(|i| i.to_string()).collect(),
        };

        let content_hash = fingerprint(n, &weights, &names);
        Ok(Self {
            n,
            weights,
            names,
            content_hash,
        })
    }

    /// Number of entities.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.n
    }

    /// Weight of the arc `i → j` (zero when absent or when `i == j`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "index out of range");
        self.weights[i * self.n + j]
    }

    /// Returns `true` if `i → j` carries positive weight.
    #[must_use]
    pub fn has_arc(&self, i: usize, j: usize) -> bool {
        self.weight(i, j) > 0.0
    }

    /// Returns `true` if both `i → j` and `j → i` carry positive weight.
    #[must_use]
    pub fn is_mutual(&self, i: usize, j: usize) -> bool {
        self.has_arc(i, j) && self.has_arc(j, i)
    }

    /// Display name of entity `i`.
    #[must_use]
    pub fn name(&self, i: usize) -> &str {
        &self.names[i]
    }

    /// All display names in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index of the first entity with the given display name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// BLAKE3 fingerprint of names and arcs.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Out-degree of `i` under `mode`.
    #[must_use]
    pub fn out_degree(&self, i: usize, mode: DegreeMode) -> f64 {
        (0..self.n).map(|j| degree_term(self.weight(i, j), mode)).sum()
    }

    /// In-degree of `i` under `mode`.
    #[must_use]
    pub fn in_degree(&self, i: usize, mode: DegreeMode) -> f64 {
        (0..self.n).map(|j| degree_term(self.weight(j, i), mode)).sum()
    }

    /// Iterate over all arcs with positive weight in row-major order.
    pub fn arcs(&self) -> impl Iterator<Item = WeightedArc> + '_ {
        (0..self.n).flat_map(move |from| {
            (0..self.n).filter_map(move |to| {
                let weight = self.weights[from * self.n + to];
                (weight > 0.0).then_some(WeightedArc { from, to, weight })
            })
        })
    }

    /// Number of arcs with positive weight.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.weights.iter().filter(|w| **w > 0.0).count()
    }

    /// Sum of all arc weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Sparse view: every positive arc keyed by `(from, to)`.
    #[must_use]
    pub fn to_arc_map(&self) -> BTreeMap<(usize, usize), f64> {
        self.arcs().map(|a| ((a.from, a.to), a.weight)).collect()
    }

    /// Dense view as nested rows.
    #[must_use]
    pub fn to_matrix(&self) -> Vec<Vec<f64>> {
        self.weights.chunks(self.n.max(1)).take(self.n).map(<[f64]>::to_vec).collect()
    }

    /// Return a copy with the listed arcs set to zero.
    ///
    /// Pairs that are out of range or already absent are ignored.
    #[must_use]
    pub fn without_arcs(&self, removed: &[(usize, usize)]) -> Self {
        let mut weights = self.weights.clone();
        for &(i, j) in removed {
            if i < self.n && j < self.n {
                weights[i * self.n + j] = 0.0;
            }
        }
        let content_hash = fingerprint(self.n, &weights, &self.names);
        Self {
            n: self.n,
            weights,
            names: self.names.clone(),
            content_hash,
        }
    }

    /// Restrict the graph to `keep`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`RankError::Shape`] if an index is out of range or repeated.
    pub fn subgraph(&self, keep: &[usize]) -> Result<Self> {
        let mut seen = vec![false; self.n];
        for &i in keep {
            if i >= self.n || std::mem::replace(&mut seen[i], true) {
                return Err(RankError::Shape(format!(
                    "subgraph index {i} is out of range or repeated"
                )));
            }
        }
        let rows = keep
            .iter()
            .map(|&i| keep.iter().map(|&j| self.weight(i, j)).collect())
            .collect();
        let names = keep.iter().map(|&i| self.names[i].clone()).collect();
        Self::from_matrix(rows, Some(names))
    }

    /// Export as a petgraph digraph. Node `i` in the result is entity `i`.
    #[must_use]
    pub fn to_petgraph(&self) -> DiGraph<String, f64> {
        let mut graph = DiGraph::with_capacity(self.n, self.arc_count());
        let nodes: Vec<_> = self.names.iter().map(|n| graph.add_node(n.clone())).collect();
        for arc in self.arcs() {
            graph.add_edge(nodes[arc.from], nodes[arc.to], arc.weight);
        }
        graph
    }

    /// Map display name → index for every entity.
    #[must_use]
    pub fn name_index(&self) -> HashMap<&str, usize> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect()
    }
}

fn check_weight(i: usize, j: usize, w: f64) -> Result<f64> {
    if w.is_finite() && w >= 0.0 {
        Ok(w)
    } else {
        Err(RankError::Shape(format!(
            "weight at ({i}, {j}) must be finite and non-negative, got {w}"
        )))
    }
}

fn degree_term(weight: f64, mode: DegreeMode) -> f64 {
    match mode {
        DegreeMode::Count if weight > 0.0 => 1.0,
        DegreeMode::Count => 0.0,
        DegreeMode::Weight => weight,
    }
}

fn fingerprint(n: usize, weights: &[f64], names: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(n as u64).to_le_bytes());
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    for (idx, w) in weights.iter().enumerate() {
        if *w > 0.0 {
            hasher.update(&(idx as u64).to_le_bytes());
            hasher.update(&w.to_bits().to_le_bytes());
        }
    }
    format!("blake3:{}", hasher.finalize().to_hex())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeightedDigraph {
        WeightedDigraph::from_matrix(
            vec![
                vec![0.0, 3.0, 0.0],
                vec![1.0, 0.0, 2.0],
                vec![0.0, 0.0, 0.0],
            ],
            Some(vec!["A".into(), "B".into(), "C".into()]),
        )
        .unwrap_or_else(|e| panic!("valid matrix: {e}"))
    }

    #[test]
    fn rejects_non_square_matrix() {
        let err = WeightedDigraph::from_matrix(vec![vec![0.0, 1.0], vec![0.0]], None)
            .expect_err("ragged");
        assert!(matches!(err, RankError::Shape(_)));
    }

    #[test]
    fn rejects_name_count_mismatch() {
        let err = WeightedDigraph::from_matrix(
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            Some(vec!["only".into()]),
        )
        .expect_err("mismatch");
        assert!(matches!(err, RankError::Shape(_)));
    }

    #[test]
    fn rejects_negative_weight() {
        let err = WeightedDigraph::from_matrix(vec![vec![0.0, -1.0], vec![1.0, 0.0]], None)
            .expect_err("negative");
        assert!(matches!(err, RankError::Shape(_)));
    }

    #[test]
    fn diagonal_is_zeroed() {
        let g = WeightedDigraph::from_matrix(vec![vec![5.0, 1.0], vec![1.0, 7.0]], None)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(g.weight(0, 0).abs() < f64::EPSILON);
        assert!(g.weight(1, 1).abs() < f64::EPSILON);
        assert_eq!(g.arc_count(), 2);
    }

    #[test]
    fn default_names_are_indices() {
        let g = WeightedDigraph::from_matrix(vec![vec![0.0; 3]; 3], None)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(g.names(), ["0", "1", "2"]);
    }

    #[test]
    fn degrees_by_count_and_weight() {
        let g = sample();
        assert!((g.out_degree(1, DegreeMode::Count) - 2.0).abs() < 1e-12);
        assert!((g.out_degree(1, DegreeMode::Weight) - 3.0).abs() < 1e-12);
        assert!((g.in_degree(2, DegreeMode::Weight) - 2.0).abs() < 1e-12);
        assert!((g.in_degree(0, DegreeMode::Count) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn arcs_iterate_row_major() {
        let g = sample();
        let arcs: Vec<(usize, usize)> = g.arcs().map(|a| (a.from, a.to)).collect();
        assert_eq!(arcs, vec![(0, 1), (1, 0), (1, 2)]);
    }

    #[test]
    fn from_arcs_drops_self_loops_and_checks_range() {
        let mut arcs = BTreeMap::new();
        arcs.insert((0, 0), 4.0);
        arcs.insert((0, 1), 2.5);
        let g = WeightedDigraph::from_arcs(2, &arcs, None).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(g.arc_count(), 1);

        arcs.insert((0, 9), 1.0);
        assert!(WeightedDigraph::from_arcs(2, &arcs, None).is_err());
    }

    #[test]
    fn without_arcs_leaves_original_untouched() {
        let g = sample();
        let residual = g.without_arcs(&[(1, 0)]);
        assert!(g.has_arc(1, 0));
        assert!(!residual.has_arc(1, 0));
        assert_ne!(g.content_hash(), residual.content_hash());
    }

    #[test]
    fn subgraph_reorders_entities() {
        let g = sample();
        let sub = g.subgraph(&[2, 1]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(sub.names(), ["C", "B"]);
        assert!((sub.weight(1, 0) - 2.0).abs() < 1e-12);
        assert!(g.subgraph(&[1, 1]).is_err());
    }

    #[test]
    fn petgraph_export_preserves_arcs() {
        let g = sample();
        let pg = g.to_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 3);
    }

    #[test]
    fn content_hash_is_stable() {
        assert_eq!(sample().content_hash(), sample().content_hash());
        assert!(sample().content_hash().starts_with("blake3:"));
    }
}
