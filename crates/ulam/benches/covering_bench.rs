//! Criterion benchmarks for covering generation plus domain clipping.
//! Focus: each covering kind at 100 and 500 cells on a non-convex domain.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use ulam::api::{build_covering, CoveringKind, Domain, Polygon, Trajectories, UlamCfg};

fn starts(n: usize, seed: u64) -> Trajectories {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut col = || (0..n).map(|_| rng.gen_range(0.0..10.0)).collect::<Vec<f64>>();
    let (x, y) = (col(), col());
    Trajectories::new(&x, &y, &x, &y).expect("equal columns")
}

fn notched_domain(cfg: UlamCfg) -> Domain {
    let boundary = Polygon::from_xy(&[
        [0.0, 0.0],
        [10.0, 0.0],
        [10.0, 10.0],
        [6.0, 4.0],
        [0.0, 10.0],
    ])
    .expect("valid polygon");
    Domain::new(boundary, cfg).expect("valid domain")
}

fn bench_covering(c: &mut Criterion) {
    let traj = starts(20_000, 7);
    let mut group = c.benchmark_group("covering");
    group.sample_size(10);
    for kind in CoveringKind::ALL {
        for &n in &[100usize, 500] {
            let domain = notched_domain(UlamCfg::new(kind).with_poly_number(n));
            group.bench_with_input(BenchmarkId::new(kind.as_str(), n), &n, |b, _| {
                b.iter(|| build_covering(&traj, &domain).expect("covering"))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_covering);
criterion_main!(benches);
