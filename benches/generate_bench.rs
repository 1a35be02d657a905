use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_voronoi_city::*;

fn config(size: CitySize, seed: u32) -> CityConfig {
    CityConfigBuilder::new()
        .seed(seed)
        .unwrap()
        .size(size)
        .citadel(false)
        .build()
        .unwrap()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(20);
    for size in [CitySize::Small, CitySize::Medium, CitySize::Large] {
        group.bench_with_input(BenchmarkId::from_parameter(size.name()), &size, |b, &size| {
            b.iter(|| Model::generate(black_box(config(size, 42))))
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let model = Model::generate(config(CitySize::Medium, 42)).unwrap();
    c.bench_function("layout_from_model", |b| b.iter(|| CityLayout::from_model(black_box(&model))));
}

criterion_group!(benches, bench_generate, bench_layout);
criterion_main!(benches);
