use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use tierank_core::graph::{TournamentConfig, WeightedDigraph, random_tournament};

/// Square weight matrix of side `n`; roughly 40% of off-diagonal cells
/// carry a small integer weight.
pub fn arb_rows(n: usize) -> impl Strategy<Value = Vec<Vec<f64>>> {
    let cell = prop_oneof![3 => Just(0.0), 2 => (1u32..10).prop_map(f64::from)];
    prop::collection::vec(prop::collection::vec(cell, n), n)
}

/// Arbitrary digraph with `1..=max_n` entities.
pub fn arb_digraph(max_n: usize) -> impl Strategy<Value = WeightedDigraph> {
    (1..=max_n)
        .prop_flat_map(arb_rows)
        .prop_map(|rows| WeightedDigraph::from_matrix(rows, None).unwrap_or_else(|e| panic!("{e}")))
}

/// Digraph whose weights are symmetric (`w_ij == w_ji`).
pub fn arb_symmetric(max_n: usize) -> impl Strategy<Value = WeightedDigraph> {
    (2..=max_n).prop_flat_map(arb_rows).prop_map(|mut rows| {
        let n = rows.len();
        for i in 0..n {
            for j in (i + 1)..n {
                rows[j][i] = rows[i][j];
            }
        }
        WeightedDigraph::from_matrix(rows, None).unwrap_or_else(|e| panic!("{e}"))
    })
}

/// Seeded random tournament with `min_n..=max_n` entities.
pub fn arb_tournament(
    min_n: usize,
    max_n: usize,
) -> impl Strategy<Value = WeightedDigraph> {
    (min_n..=max_n, any::<u64>(), prop_oneof![Just(0.0), Just(0.3)]).prop_map(
        |(nodes, seed, bidirectional_probability)| {
            let config = TournamentConfig {
                nodes,
                bidirectional_probability,
                ..TournamentConfig::default()
            };
            random_tournament(&config, &mut StdRng::seed_from_u64(seed))
        },
    )
}
