//! Criterion benchmarks for point classification.
//! Focus sizes: polygons in {16, 100, 500}; 100k points per batch.
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::Vector2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use ulam::api::{build_covering, classify, CoveringIndex, Domain, Trajectories, UlamCfg};

fn random_points(n: usize, seed: u64) -> Vec<Vector2<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Vector2::new(rng.gen_range(-1.0..11.0), rng.gen_range(-1.0..11.0)))
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let points = random_points(100_000, 41);
    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(points.len() as u64));
    for &n in &[16usize, 100, 500] {
        let domain = Domain::rectangle(0.0, 10.0, 0.0, 10.0, UlamCfg::default().with_poly_number(n))
            .expect("valid domain");
        let covering =
            build_covering(&Trajectories::default(), &domain).expect("square covering");
        let index = CoveringIndex::new(&covering, &domain);
        group.bench_with_input(BenchmarkId::new("square_grid", n), &n, |b, _| {
            b.iter(|| classify(&points, &index))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
