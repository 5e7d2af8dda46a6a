//! Structured result records for tabular export.
//!
//! Every ranking method ends in the same shape: a list of `(rank, members)`
//! records plus the arcs it had to drop. [`RankingReport`] bundles those
//! with the input fingerprint so outputs from different runs can be joined.

use serde::Serialize;

use crate::graph::{WeightedArc, WeightedDigraph};
use crate::partition::Partition;
use crate::weak_order::WeakOrdering;

/// One tier or tie group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierRecord {
    pub rank: usize,
    pub members: Vec<usize>,
    pub names: Vec<String>,
}

/// A removed arc with display names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcRecord {
    pub from: usize,
    pub to: usize,
    pub from_name: String,
    pub to_name: String,
    pub weight: f64,
}

/// Records for each tier of `partition`, members in index order.
#[must_use]
pub fn partition_records(graph: &WeightedDigraph, partition: &Partition) -> Vec<TierRecord> {
    partition
        .groups()
        .iter()
        .enumerate()
        .map(|(rank, members)| TierRecord {
            rank,
            members: members.clone(),
            names: members.iter().map(|&m| graph.name(m).to_string()).collect(),
        })
        .collect()
}

/// One singleton record per entity of a total order.
#[must_use]
pub fn order_records(graph: &WeightedDigraph, order: &[usize]) -> Vec<TierRecord> {
    order
        .iter()
        .enumerate()
        .map(|(rank, &v)| TierRecord {
            rank,
            members: vec![v],
            names: vec![graph.name(v).to_string()],
        })
        .collect()
}

/// Records for each group of a weak ordering (names sorted).
#[must_use]
pub fn weak_records(ordering: &WeakOrdering) -> Vec<TierRecord> {
    ordering
        .groups()
        .iter()
        .map(|g| TierRecord {
            rank: g.rank,
            members: g.members.clone(),
            names: g.names.clone(),
        })
        .collect()
}

/// Named copies of `arcs`.
#[must_use]
pub fn arc_records(graph: &WeightedDigraph, arcs: &[WeightedArc]) -> Vec<ArcRecord> {
    arcs.iter()
        .map(|a| ArcRecord {
            from: a.from,
            to: a.to,
            from_name: graph.name(a.from).to_string(),
            to_name: graph.name(a.to).to_string(),
            weight: a.weight,
        })
        .collect()
}

/// Complete output of one ranking run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingReport {
    /// Short method identifier (`tiers`, `fas`, `dominance`, `weak`, ...).
    pub method: String,
    /// Fingerprint of the input graph.
    pub input_hash: String,
    pub entities: usize,
    /// Method objective: cut imbalance for tiering, removed weight for
    /// ordering methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<f64>,
    /// Lower bound, when the method produces one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    /// `true` if a search limit cut the run short.
    pub truncated: bool,
    pub tiers: Vec<TierRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_arcs: Vec<ArcRecord>,
}

impl RankingReport {
    /// Empty report for `graph`.
    #[must_use]
    pub fn new(method: impl Into<String>, graph: &WeightedDigraph) -> Self {
        Self {
            method: method.into(),
            input_hash: graph.content_hash().to_string(),
            entities: graph.node_count(),
            objective: None,
            lower_bound: None,
            truncated: false,
            tiers: Vec::new(),
            removed_arcs: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_objective(mut self, objective: f64) -> Self {
        self.objective = Some(objective);
        self
    }

    #[must_use]
    pub const fn with_lower_bound(mut self, bound: f64) -> Self {
        self.lower_bound = Some(bound);
        self
    }

    #[must_use]
    pub const fn truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    #[must_use]
    pub fn with_tiers(mut self, tiers: Vec<TierRecord>) -> Self {
        self.tiers = tiers;
        self
    }

    #[must_use]
    pub fn with_removed_arcs(mut self, arcs: Vec<ArcRecord>) -> Self {
        self.removed_arcs = arcs;
        self
    }

    /// Total weight of the removed arcs.
    #[must_use]
    pub fn removed_weight(&self) -> f64 {
        self.removed_arcs.iter().map(|a| a.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> WeightedDigraph {
        WeightedDigraph::from_matrix(
            vec![vec![0.0, 2.0], vec![1.0, 0.0]],
            Some(vec!["left".into(), "right".into()]),
        )
        .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn partition_records_carry_names() {
        let g = graph();
        let p = Partition::new(vec![vec![1], vec![0]], 2).unwrap_or_else(|e| panic!("{e}"));
        let records = partition_records(&g, &p);
        assert_eq!(records[0].names, vec!["right"]);
        assert_eq!(records[1].rank, 1);
    }

    #[test]
    fn report_serializes_without_empty_sections() {
        let g = graph();
        let report = RankingReport::new("dominance", &g)
            .with_objective(1.0)
            .with_tiers(order_records(&g, &[0, 1]));
        let json = serde_json::to_value(&report).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json["method"], "dominance");
        assert_eq!(json["tiers"][1]["names"][0], "right");
        assert!(json.get("removed_arcs").is_none());
        assert!(json.get("lower_bound").is_none());
    }

    #[test]
    fn removed_weight_sums_arcs() {
        let g = graph();
        let arcs: Vec<WeightedArc> = g.arcs().collect();
        let report = RankingReport::new("fas", &g).with_removed_arcs(arc_records(&g, &arcs));
        assert!((report.removed_weight() - 3.0).abs() < 1e-12);
        assert_eq!(report.removed_arcs[1].from_name, "right");
    }
}
