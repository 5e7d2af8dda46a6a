//! Cut-imbalance objective.
//!
//! For two groups X and Y let `w_XY` be the total weight of arcs from X to
//! Y and `w_YX` the reverse. The pairwise imbalance is
//!
//! ```text
//! CI(X, Y) = |w_XY − w_YX| / (w_XY + w_YX)     (0 when no arcs cross)
//! ```
//!
//! and the imbalance of a partition is the sum over every unordered pair of
//! distinct groups. A value of 1 for a pair means all flow between the two
//! tiers goes one way.

use crate::graph::WeightedDigraph;
use crate::partition::Partition;

/// Which extreme of the objective a search keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Keep the largest imbalance (tiers with one-way flow).
    #[default]
    Maximize,
    /// Keep the smallest imbalance.
    Minimize,
}

impl Direction {
    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[must_use]
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Maximize => candidate > incumbent,
            Self::Minimize => candidate < incumbent,
        }
    }

    /// Worst possible score for this direction.
    #[must_use]
    pub const fn worst(self) -> f64 {
        match self {
            Self::Maximize => f64::NEG_INFINITY,
            Self::Minimize => f64::INFINITY,
        }
    }
}

/// Total weight of arcs from any member of `from` to any member of `to`.
#[must_use]
pub fn flow(graph: &WeightedDigraph, from: &[usize], to: &[usize]) -> f64 {
    from.iter()
        .flat_map(|&u| to.iter().map(move |&v| (u, v)))
        .map(|(u, v)| graph.weight(u, v))
        .sum()
}

/// Imbalance between two groups.
#[must_use]
pub fn pair_imbalance(graph: &WeightedDigraph, x: &[usize], y: &[usize]) -> f64 {
    let forward = flow(graph, x, y);
    let backward = flow(graph, y, x);
    let total = forward + backward;
    if total > 0.0 {
        (forward - backward).abs() / total
    } else {
        0.0
    }
}

/// Total cut imbalance of a partition (sum over unordered tier pairs).
#[must_use]
pub fn cut_imbalance(graph: &WeightedDigraph, partition: &Partition) -> f64 {
    groups_imbalance(graph, partition.groups())
}

/// Same as [`cut_imbalance`] for pre-validated raw groups.
pub(crate) fn groups_imbalance(graph: &WeightedDigraph, groups: &[Vec<usize>]) -> f64 {
    let mut total = 0.0;
    for (a, x) in groups.iter().enumerate() {
        for y in &groups[a + 1..] {
            total += pair_imbalance(graph, x, y);
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(rows: Vec<Vec<f64>>) -> WeightedDigraph {
        WeightedDigraph::from_matrix(rows, None).unwrap_or_else(|e| panic!("{e}"))
    }

    fn partition(groups: Vec<Vec<usize>>, n: usize) -> Partition {
        Partition::new(groups, n).unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn single_group_scores_zero() {
        let g = graph(vec![vec![0.0, 4.0], vec![1.0, 0.0]]);
        let score = cut_imbalance(&g, &partition(vec![vec![0, 1]], 2));
        assert!(score.abs() < f64::EPSILON);
    }

    #[test]
    fn one_way_flow_scores_one_per_pair() {
        // 0 → 1 → 2 only
        let g = graph(vec![
            vec![0.0, 2.0, 0.0],
            vec![0.0, 0.0, 5.0],
            vec![0.0, 0.0, 0.0],
        ]);
        let score = cut_imbalance(&g, &partition(vec![vec![0], vec![1], vec![2]], 3));
        // pairs (0,1)=1, (0,2)=0 (no arcs), (1,2)=1
        assert!((score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn pair_imbalance_matches_hand_computation() {
        let g = graph(vec![vec![0.0, 3.0], vec![1.0, 0.0]]);
        let ci = pair_imbalance(&g, &[0], &[1]);
        assert!((ci - 0.5).abs() < 1e-12, "|3-1|/(3+1) = 0.5, got {ci}");
    }

    #[test]
    fn symmetric_weights_score_zero() {
        let g = graph(vec![
            vec![0.0, 2.0, 7.0],
            vec![2.0, 0.0, 1.0],
            vec![7.0, 1.0, 0.0],
        ]);
        let score = cut_imbalance(&g, &partition(vec![vec![1], vec![0, 2]], 3));
        assert!(score.abs() < 1e-12);
    }

    #[test]
    fn score_ignores_group_order() {
        let g = graph(vec![
            vec![0.0, 3.0, 1.0, 8.0],
            vec![2.0, 0.0, 9.0, 4.0],
            vec![8.0, 1.0, 0.0, 5.0],
            vec![3.0, 3.0, 2.0, 0.0],
        ]);
        let a = cut_imbalance(&g, &partition(vec![vec![0, 3], vec![1], vec![2]], 4));
        let b = cut_imbalance(&g, &partition(vec![vec![2], vec![3, 0], vec![1]], 4));
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn direction_comparisons() {
        assert!(Direction::Maximize.improves(1.0, 0.5));
        assert!(!Direction::Maximize.improves(0.5, 0.5));
        assert!(Direction::Minimize.improves(0.1, 0.5));
        assert!(Direction::Minimize.improves(0.0, Direction::Minimize.worst()));
    }
}
