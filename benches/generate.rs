//! Benchmarks for galaxy generation and picking.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use galaxy::{generate, Camera, GalaxyParams, Picker, Vec2};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for count in [1_000u32, 10_000, 100_000] {
        let params = GalaxyParams::default().with_count(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &params, |b, params| {
            let mut rng = SmallRng::seed_from_u64(0);
            b.iter(|| black_box(generate(params, &mut rng)))
        });
    }

    group.finish();
}

fn bench_pick(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick");
    let camera = Camera::new();
    let ray = camera.ray_through(Vec2::ZERO, 16.0 / 9.0);

    for count in [10_000u32, 100_000] {
        let params = GalaxyParams::default().with_count(count);
        let cloud = generate(&params, &mut SmallRng::seed_from_u64(0));

        group.bench_with_input(BenchmarkId::new("intersect", count), &cloud, |b, cloud| {
            let picker = Picker::new();
            b.iter(|| black_box(picker.intersect(&ray, cloud.positions())))
        });

        group.bench_with_input(BenchmarkId::new("pick", count), &cloud, |b, cloud| {
            let picker = Picker::new();
            let mut rng = SmallRng::seed_from_u64(1);
            let mut cloud = cloud.clone();
            b.iter(|| black_box(picker.pick(&ray, &mut cloud, params.size, &mut rng)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate, bench_pick);
criterion_main!(benches);
