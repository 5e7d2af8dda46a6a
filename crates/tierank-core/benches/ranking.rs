use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};
use tierank_core::dominance::dominance_order;
use tierank_core::enumerate::{EnumerateConfig, enumerate_tiers, identity_order};
use tierank_core::fas::solve_exact;
use tierank_core::graph::{DegreeMode, TournamentConfig, WeightedDigraph, random_tournament};
use tierank_core::solver::BranchAndBound;
use tierank_core::weak_order::weak_ordering;

const SEED: u64 = 0x71E2_A4C5;

fn tournament(nodes: usize) -> WeightedDigraph {
    let config = TournamentConfig {
        nodes,
        ..TournamentConfig::default()
    };
    random_tournament(&config, &mut StdRng::seed_from_u64(SEED + nodes as u64))
}

fn bench_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate.tiers");

    for nodes in [10_usize, 14, 18] {
        let graph = tournament(nodes);
        let order = identity_order(nodes);
        let sequential = EnumerateConfig {
            tiers: 3,
            ..EnumerateConfig::default()
        };
        let parallel = EnumerateConfig {
            parallel: true,
            ..sequential.clone()
        };

        group.bench_with_input(BenchmarkId::new("sequential", nodes), &graph, |b, graph| {
            b.iter(|| black_box(enumerate_tiers(graph, &order, &sequential).map(|r| r.score)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", nodes), &graph, |b, graph| {
            b.iter(|| black_box(enumerate_tiers(graph, &order, &parallel).map(|r| r.score)));
        });
    }

    group.finish();
}

fn bench_orderings(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordering");

    for nodes in [16_usize, 64, 256] {
        let graph = tournament(nodes);
        group.throughput(Throughput::Elements(graph.arc_count() as u64));

        group.bench_with_input(BenchmarkId::new("dominance", nodes), &graph, |b, graph| {
            b.iter(|| black_box(dominance_order(graph, DegreeMode::Weight).cost));
        });

        let residual = dominance_order(&graph, DegreeMode::Count).residual(&graph);
        group.bench_with_input(BenchmarkId::new("weak", nodes), &residual, |b, residual| {
            b.iter(|| black_box(weak_ordering(residual).map(|w| w.len())));
        });
    }

    group.finish();
}

fn bench_exact_fas(c: &mut Criterion) {
    let mut group = c.benchmark_group("fas.branch");
    group.sample_size(10);

    for nodes in [4_usize, 5, 6] {
        let graph = tournament(nodes);
        let solver = BranchAndBound::default();
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &graph, |b, graph| {
            b.iter(|| black_box(solve_exact(graph, &solver).map(|s| s.objective)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_enumerate, bench_orderings, bench_exact_fas);
criterion_main!(benches);
