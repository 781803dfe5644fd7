#[macro_use]
extern crate criterion;
extern crate mandelfarm;

use criterion::Criterion;
use mandelfarm::{render, RenderConfig, Strategy};

const PROCESSES: usize = 5;

fn bench_config() -> RenderConfig {
    RenderConfig {
        edge: 128,
        ..RenderConfig::default()
    }
}

fn sequential(c: &mut Criterion) {
    let config = bench_config();
    c.bench_function("sequential 128", move |b| {
        b.iter(|| render(Strategy::Sequential, 1, &config).unwrap())
    });
}

fn static_full(c: &mut Criterion) {
    let config = bench_config();
    c.bench_function("static 128 x4", move |b| {
        b.iter(|| render(Strategy::StaticFull, PROCESSES, &config).unwrap())
    });
}

fn round_based(c: &mut Criterion) {
    let config = bench_config();
    c.bench_function("round 128 x4", move |b| {
        b.iter(|| render(Strategy::StaticRoundBased, PROCESSES, &config).unwrap())
    });
}

fn dynamic(c: &mut Criterion) {
    let config = bench_config();
    c.bench_function("dynamic 128 x4", move |b| {
        b.iter(|| render(Strategy::Dynamic, PROCESSES, &config).unwrap())
    });
}

criterion_group!(benches, sequential, static_full, round_based, dynamic);
criterion_main!(benches);
