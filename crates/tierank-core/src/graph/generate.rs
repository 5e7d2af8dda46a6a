//! Random graph generators for experiments, benchmarks and property tests.
//!
//! All generators take a caller-supplied RNG so runs are reproducible with a
//! seeded `StdRng`.

use rand::Rng;

use super::digraph::WeightedDigraph;

/// Parameters for [`random_tournament`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TournamentConfig {
    /// Number of entities.
    pub nodes: usize,
    /// Probability that a pair also receives the reverse arc.
    /// `0.0` yields a strict tournament. Default: 0.25.
    pub bidirectional_probability: f64,
    /// Inclusive integer weight range. Default: 1..=10.
    pub min_weight: u32,
    pub max_weight: u32,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            nodes: 8,
            bidirectional_probability: 0.25,
            min_weight: 1,
            max_weight: 10,
        }
    }
}

/// Generate a random (possibly bidirectional) tournament.
///
/// Every unordered pair gets exactly one arc in a uniformly random
/// direction; with probability `bidirectional_probability` the reverse arc
/// is added as well. Weights are uniform integers in the configured range.
#[must_use]
pub fn random_tournament<R: Rng>(config: &TournamentConfig, rng: &mut R) -> WeightedDigraph {
    let n = config.nodes;
    let lo = config.min_weight.max(1);
    let hi = config.max_weight.max(lo);
    let p_back = config.bidirectional_probability.clamp(0.0, 1.0);

    let mut rows = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let (from, to) = if rng.gen_bool(0.5) { (i, j) } else { (j, i) };
            rows[from][to] = f64::from(rng.gen_range(lo..=hi));
            if rng.gen_bool(p_back) {
                rows[to][from] = f64::from(rng.gen_range(lo..=hi));
            }
        }
    }

    WeightedDigraph::from_matrix(rows, None).unwrap_or_else(|_| unreachable!("square by construction"))
}

/// Generate a random digraph where each ordered pair carries an arc with
/// probability `density`, weights uniform in `1..=max_weight`.
#[must_use]
pub fn random_digraph<R: Rng>(
    nodes: usize,
    density: f64,
    max_weight: u32,
    rng: &mut R,
) -> WeightedDigraph {
    let density = density.clamp(0.0, 1.0);
    let max_weight = max_weight.max(1);
    let rows = (0..nodes)
        .map(|i| {
            (0..nodes)
                .map(|j| {
                    if i != j && rng.gen_bool(density) {
                        f64::from(rng.gen_range(1..=max_weight))
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();

    WeightedDigraph::from_matrix(rows, None).unwrap_or_else(|_| unreachable!("square by construction"))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn strict_tournament_has_exactly_one_arc_per_pair() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = TournamentConfig {
            nodes: 9,
            bidirectional_probability: 0.0,
            ..TournamentConfig::default()
        };
        let g = random_tournament(&config, &mut rng);
        for i in 0..9 {
            for j in (i + 1)..9 {
                assert!(g.has_arc(i, j) ^ g.has_arc(j, i), "pair ({i}, {j})");
            }
        }
        assert_eq!(g.arc_count(), 36);
    }

    #[test]
    fn weights_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let g = random_tournament(&TournamentConfig::default(), &mut rng);
        assert!(g.arcs().all(|a| (1.0..=10.0).contains(&a.weight)));
    }

    #[test]
    fn full_density_digraph_is_complete() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = random_digraph(5, 1.0, 9, &mut rng);
        assert_eq!(g.arc_count(), 20);
    }

    #[test]
    fn same_seed_same_graph() {
        let a = random_tournament(&TournamentConfig::default(), &mut StdRng::seed_from_u64(1));
        let b = random_tournament(&TournamentConfig::default(), &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
