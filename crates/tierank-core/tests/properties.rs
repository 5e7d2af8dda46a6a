//! Property tests across solvers.
//!
//! Exact solvers are exponential, so graph sizes stay small and case counts
//! are modest.

use proptest::prelude::*;

use tierank_core::dominance::dominance_order;
use tierank_core::enumerate::{EnumerateConfig, enumerate_tiers, identity_order};
use tierank_core::fas::{exhaustive_fas, solve_exact, solve_relaxed};
use tierank_core::graph::{DegreeMode, WeightedDigraph, is_acyclic, residual_cycles};
use tierank_core::objective::{Direction, cut_imbalance};
use tierank_core::partition::{Partition, balanced_partition};
use tierank_core::solver::{BranchAndBound, LinearSolver};
use tierank_core::tiering::solve_tiering;
use tierank_core::weak_order::weak_ordering;

#[path = "generators.rs"]
mod generators;
use generators::*;

const EPS: f64 = 1e-6;

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Maximize), Just(Direction::Minimize)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // -----------------------------------------------------------------------
    // Graph model
    // -----------------------------------------------------------------------

    #[test]
    fn matrix_and_arc_map_round_trip(g in arb_digraph(8)) {
        let names = Some(g.names().to_vec());
        let from_map = WeightedDigraph::from_arcs(g.node_count(), &g.to_arc_map(), names.clone())
            .unwrap_or_else(|e| panic!("{e}"));
        let from_matrix = WeightedDigraph::from_matrix(g.to_matrix(), names)
            .unwrap_or_else(|e| panic!("{e}"));
        prop_assert_eq!(&from_map, &g);
        prop_assert_eq!(&from_matrix, &g);
    }

    // -----------------------------------------------------------------------
    // Objective and partitions
    // -----------------------------------------------------------------------

    #[test]
    fn symmetric_weights_never_imbalance(g in arb_symmetric(8), k in 1usize..4) {
        let n = g.node_count();
        prop_assume!(k <= n);
        let p = balanced_partition(&identity_order(n), k).unwrap_or_else(|e| panic!("{e}"));
        prop_assert!(cut_imbalance(&g, &p).abs() < EPS);
    }

    #[test]
    fn balanced_sizes_differ_by_at_most_one(n in 1usize..30, k in 1usize..30) {
        prop_assume!(k <= n);
        let p = balanced_partition(&identity_order(n), k).unwrap_or_else(|e| panic!("{e}"));
        let sizes: Vec<usize> = p.groups().iter().map(Vec::len).collect();
        let (min, max) = (sizes.iter().min().copied(), sizes.iter().max().copied());
        prop_assert!(max.unwrap_or(0) - min.unwrap_or(0) <= 1);
        prop_assert_eq!(p.tier_count(), k);
    }

    #[test]
    fn imbalance_ignores_tier_order(g in arb_digraph(7)) {
        let n = g.node_count();
        prop_assume!(n >= 3);
        let p = balanced_partition(&identity_order(n), 3).unwrap_or_else(|e| panic!("{e}"));
        let mut reversed = p.groups().to_vec();
        reversed.reverse();
        let q = Partition::new(reversed, n).unwrap_or_else(|e| panic!("{e}"));
        prop_assert!((cut_imbalance(&g, &p) - cut_imbalance(&g, &q)).abs() < EPS);
    }

    // -----------------------------------------------------------------------
    // Enumerator
    // -----------------------------------------------------------------------

    #[test]
    fn parallel_and_sequential_agree(g in arb_digraph(9), k in 1usize..5, dir in direction()) {
        let n = g.node_count();
        prop_assume!(k <= n);
        let base = EnumerateConfig { tiers: k, direction: dir, ..EnumerateConfig::default() };
        let par = EnumerateConfig { parallel: true, chunk_size: 3, ..base.clone() };
        let a = enumerate_tiers(&g, &identity_order(n), &base).unwrap_or_else(|e| panic!("{e}"));
        let b = enumerate_tiers(&g, &identity_order(n), &par).unwrap_or_else(|e| panic!("{e}"));
        prop_assert_eq!(a.splits, b.splits);
        prop_assert_eq!(a.partition, b.partition);
    }

    #[test]
    fn enumerator_score_matches_its_partition(g in arb_digraph(8), k in 1usize..4, dir in direction()) {
        let n = g.node_count();
        prop_assume!(k <= n);
        let config = EnumerateConfig { tiers: k, direction: dir, ..EnumerateConfig::default() };
        let result = enumerate_tiers(&g, &identity_order(n), &config).unwrap_or_else(|e| panic!("{e}"));
        prop_assert!((cut_imbalance(&g, &result.partition) - result.score).abs() < EPS);
        prop_assert_eq!(result.partition.tier_count(), k);
    }

    // -----------------------------------------------------------------------
    // Heuristics and weak ordering
    // -----------------------------------------------------------------------

    #[test]
    fn dominance_residual_is_acyclic(g in arb_digraph(10), weighted in any::<bool>()) {
        let mode = if weighted { DegreeMode::Weight } else { DegreeMode::Count };
        let ranking = dominance_order(&g, mode);
        prop_assert_eq!(ranking.order.len(), g.node_count());
        prop_assert!(is_acyclic(&ranking.residual(&g)));
        let cost: f64 = ranking.feedback_arcs.iter().map(|a| a.weight).sum();
        prop_assert!((cost - ranking.cost).abs() < EPS);
    }

    #[test]
    fn dominance_residual_of_tournament_is_acyclic(
        g in arb_tournament(3, 10),
        weighted in any::<bool>(),
    ) {
        let mode = if weighted { DegreeMode::Weight } else { DegreeMode::Count };
        let ranking = dominance_order(&g, mode);
        let residual = ranking.residual(&g);
        prop_assert!(is_acyclic(&residual));

        let position = ranking.positions();
        for arc in residual.arcs() {
            prop_assert!(position[arc.from] < position[arc.to]);
        }
    }

    #[test]
    fn weak_ordering_respects_residual_arcs(g in arb_digraph(8)) {
        let residual = dominance_order(&g, DegreeMode::Count).residual(&g);
        let ordering = weak_ordering(&residual).unwrap_or_else(|e| panic!("{e}"));
        let rank = ordering.rank_of();
        prop_assert_eq!(rank.len(), g.node_count());
        for arc in residual.arcs() {
            prop_assert!(rank[arc.from] <= rank[arc.to]);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // -----------------------------------------------------------------------
    // Exact solvers
    // -----------------------------------------------------------------------

    #[test]
    fn tiering_program_matches_enumerator(g in arb_digraph(6), k in 1usize..4, dir in direction()) {
        let n = g.node_count();
        prop_assume!(k <= n);
        let order = identity_order(n);
        let config = EnumerateConfig { tiers: k, direction: dir, ..EnumerateConfig::default() };
        let exact = enumerate_tiers(&g, &order, &config).unwrap_or_else(|e| panic!("{e}"));
        let solved = solve_tiering(&g, &order, k, dir, &BranchAndBound::default())
            .unwrap_or_else(|e| panic!("{e}"));
        prop_assert!((exact.score - solved.score).abs() < EPS);
    }

    #[test]
    fn fas_solvers_agree_with_oracle(g in arb_digraph(5)) {
        let oracle = exhaustive_fas(&g).unwrap_or_else(|e| panic!("{e}"));
        let bb = solve_exact(&g, &BranchAndBound::default()).unwrap_or_else(|e| panic!("{e}"));
        let lp = solve_exact(&g, &LinearSolver).unwrap_or_else(|e| panic!("{e}"));
        prop_assert!((bb.objective - oracle.cost).abs() < EPS, "bb {} oracle {}", bb.objective, oracle.cost);
        prop_assert!((lp.objective - oracle.cost).abs() < EPS, "lp {} oracle {}", lp.objective, oracle.cost);
    }

    #[test]
    fn relaxation_is_a_lower_bound(g in arb_digraph(5)) {
        let exact = solve_exact(&g, &LinearSolver).unwrap_or_else(|e| panic!("{e}"));
        let relaxed = solve_relaxed(&g, &LinearSolver).unwrap_or_else(|e| panic!("{e}"));
        prop_assert!(relaxed.lower_bound <= exact.objective + EPS);
    }

    #[test]
    fn exact_fas_beats_greedy_on_tournaments(g in arb_tournament(3, 6)) {
        let exact = solve_exact(&g, &BranchAndBound::default()).unwrap_or_else(|e| panic!("{e}"));
        let greedy = dominance_order(&g, DegreeMode::Count);
        prop_assert!(exact.objective <= greedy.cost + EPS);
    }

    #[test]
    fn exact_fas_residual_admits_weak_ordering(g in arb_digraph(6)) {
        let exact = solve_exact(&g, &BranchAndBound::default()).unwrap_or_else(|e| panic!("{e}"));
        prop_assert!(residual_cycles(&exact.residual).is_empty());
        let ordering = weak_ordering(&exact.residual).unwrap_or_else(|e| panic!("{e}"));
        let rank = ordering.rank_of();
        for arc in exact.residual.arcs() {
            prop_assert!(rank[arc.from] <= rank[arc.to]);
        }
    }
}
