//! 搜索性能基准
//!
//! 运行: `cargo bench`

use std::hint::black_box;
use std::time::Duration;

use checkers_ai::test_positions::{random_position, ALL_POSITIONS};
use checkers_ai::{AIConfig, Board, Difficulty, MinimaxAI};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 初始局面下各难度的搜索
fn benchmark_difficulties(c: &mut Criterion) {
    let board = Board::new();
    let mut group = c.benchmark_group("Search/start");

    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let ai = MinimaxAI::new(&AIConfig::from_difficulty(difficulty));
        group.bench_with_input(
            BenchmarkId::new("difficulty", difficulty),
            &difficulty,
            |b, _| {
                b.iter(|| black_box(ai.search(black_box(&board))));
            },
        );
    }
    group.finish();
}

/// 剪枝与不剪枝的对比
fn benchmark_alpha_beta(c: &mut Criterion) {
    let board = Board::new();
    let mut group = c.benchmark_group("Search/alpha-beta");
    group.measurement_time(Duration::from_secs(10));

    for alpha_beta in [true, false] {
        let config = AIConfig {
            depth: 4,
            alpha_beta,
            ..AIConfig::default()
        };
        let ai = MinimaxAI::new(&config);
        group.bench_with_input(
            BenchmarkId::new("prune", alpha_beta),
            &alpha_beta,
            |b, _| {
                b.iter(|| black_box(ai.search(black_box(&board))));
            },
        );
    }
    group.finish();
}

/// 固定局面集合与随机局面
fn benchmark_positions(c: &mut Criterion) {
    let ai = MinimaxAI::new(&AIConfig::from_difficulty(Difficulty::Medium));
    let mut group = c.benchmark_group("Search/positions");

    let fixed: Vec<Board> = ALL_POSITIONS
        .iter()
        .filter_map(|fen| Board::from_fen(fen).ok())
        .collect();
    group.bench_function("fixed_set", |b| {
        b.iter(|| {
            for board in &fixed {
                let _ = black_box(ai.search(board));
            }
        });
    });

    let mut rng = StdRng::seed_from_u64(7);
    let random: Vec<Board> = (0..20)
        .filter_map(|_| random_position(&mut rng, 8).ok())
        .collect();
    group.bench_function("random_20", |b| {
        b.iter(|| {
            for board in &random {
                let _ = black_box(ai.search(board));
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_difficulties,
    benchmark_alpha_beta,
    benchmark_positions
);
criterion_main!(benches);
