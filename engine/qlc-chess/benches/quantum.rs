//! Quantum board benchmarks.
//!
//! Run with: `cargo bench -p qlc-chess`
//!
//! These benchmarks measure:
//! - Split fan-out as the branch count grows toward the cap
//! - Move application across a populated superposition
//! - Aggregate queries over many branches

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qlc_chess::{Coord, StandardBoard};
use qlc_core::{QuantumConfig, Square};

fn coord(name: &str) -> Coord {
    Square::parse(name).unwrap().to_coord()
}

/// Knight and pawn splits on both sides, doubling the branch count each time.
const SPLITS: &[(&str, &str, &str)] = &[
    ("b1", "a3", "c3"),
    ("g8", "f6", "h6"),
    ("g1", "f3", "h3"),
    ("b8", "a6", "c6"),
    ("e2", "e3", "e4"),
    ("d7", "d6", "d5"),
];

fn split_board(depth: usize, max_branches: usize) -> StandardBoard {
    let config = QuantumConfig::default()
        .with_seed(42)
        .with_max_branches(max_branches);
    let mut board = StandardBoard::new(config);
    for &(from, to_a, to_b) in &SPLITS[..depth] {
        board.apply_split(coord(from), coord(to_a), coord(to_b));
    }
    board
}

fn bench_split_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_fan_out");

    for depth in [1, 2, 4, 6] {
        group.throughput(Throughput::Elements(1 << depth));
        group.bench_with_input(BenchmarkId::new("splits", depth), &depth, |b, &depth| {
            b.iter(|| black_box(split_board(depth, 64).branch_count()));
        });
    }

    group.finish();
}

fn bench_split_pruned(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_pruned");

    for cap in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("cap", cap), &cap, |b, &cap| {
            b.iter(|| black_box(split_board(SPLITS.len(), cap).branch_count()));
        });
    }

    group.finish();
}

fn bench_apply_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_move");

    for depth in [0, 2, 4] {
        let board = split_board(depth, 64);
        group.throughput(Throughput::Elements(board.branch_count() as u64));
        group.bench_with_input(BenchmarkId::new("branches", depth), &board, |b, board| {
            b.iter(|| {
                let mut board = board.clone();
                // Queen's pawn push, legal in every branch
                black_box(board.apply_move(coord("d2"), coord("d4"), None))
            });
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let board = split_board(SPLITS.len(), 64);

    c.bench_function("square_distribution", |b| {
        b.iter(|| black_box(board.square_distribution(coord("f3")).unwrap()));
    });
    c.bench_function("legal_moves_union", |b| {
        b.iter(|| black_box(board.legal_moves_union(coord("e2"))));
    });
    c.bench_function("legal_move_distribution", |b| {
        b.iter(|| black_box(board.legal_move_distribution()));
    });
}

criterion_group!(
    benches,
    bench_split_fan_out,
    bench_split_pruned,
    bench_apply_move,
    bench_queries
);
criterion_main!(benches);
