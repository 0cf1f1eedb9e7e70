use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use sweeper_core::*;

const SIZES: [(Coord, Coord, f64); 3] = [(9, 9, 0.12), (16, 30, 0.2), (200, 200, 0.2)];

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for (rows, cols, density) in SIZES {
        for placement in [Placement::Rejection, Placement::Shuffle] {
            let config = BoardConfig::new((rows, cols), density);
            let id = BenchmarkId::new(format!("{placement:?}"), format!("{rows}x{cols}"));
            group.bench_with_input(id, &config, |b, config| {
                let mut generator = RandomMineGenerator::new(1).with_placement(placement);
                b.iter(|| black_box(generator.generate(config)));
            });
        }
    }
    group.finish();
}

fn bench_safe_start(c: &mut Criterion) {
    let mut group = c.benchmark_group("safe_start");
    for (rows, cols, density) in SIZES {
        let config = BoardConfig::new((rows, cols), density);
        group.bench_with_input(format!("{rows}x{cols}"), &config, |b, &config| {
            let mut seed = 0;
            b.iter(|| {
                seed += 1;
                let mut engine = BoardEngine::with_seed(config, seed);
                black_box(engine.ensure_safe_first_move((rows / 2, cols / 2)))
            });
        });
    }
    group.finish();
}

fn bench_flood(c: &mut Criterion) {
    let config = BoardConfig::new((1000, 1000), 0.0);
    let engine = BoardEngine::with_seed(config, 0);
    c.bench_function("flood/1000x1000_empty", |b| {
        b.iter_batched(
            || engine.clone(),
            |mut engine| black_box(engine.reveal((0, 0))),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_generate, bench_safe_start, bench_flood);
criterion_main!(benches);
