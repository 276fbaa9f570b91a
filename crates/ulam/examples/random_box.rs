//! Random-walk probe for the whole pipeline.
//!
//! Purpose
//! - A reproducible timing and sanity data point: 10k uniform trajectories on
//!   [0, 10]², domain [3, 5] × [4, 8], 40 requested squares, data reinjection.
//! - Prints the realized chain size, nirvana mass and timings for each covering kind.

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use ulam::api::{run_ulam_method, CoveringKind, Domain, Trajectories, UlamCfg};

fn main() {
    let traj = random_trajectories(10_000, 123);
    for kind in CoveringKind::ALL {
        let cfg = UlamCfg::new(kind).with_poly_number(40);
        let domain = Domain::rectangle(3.0, 5.0, 4.0, 8.0, cfg).expect("valid domain");
        let t0 = Instant::now();
        let res = run_ulam_method(&traj, &domain).expect("pipeline succeeds");
        let ms = t0.elapsed().as_secs_f64() * 1e3;
        let nirvana_mass = if res.has_nirvana() {
            res.pi_closed[res.pi_closed.len() - 1]
        } else {
            0.0
        };
        println!(
            "kind={kind} polys={} disconnected={} discarded={} tie_breaks={}",
            res.polys.len(),
            res.polys_dis.len(),
            res.info.n_traj_discarded,
            res.info.n_tie_breaks_start + res.info.n_tie_breaks_end,
        );
        println!("kind={kind} nirvana_mass={nirvana_mass:.6} time_ms={ms:.3}");
    }
}

/// Uniform starts in [0, 10]², each moved by a uniform step in [-1, 1]².
fn random_trajectories(n: usize, seed: u64) -> Trajectories {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cols: [Vec<f64>; 4] = Default::default();
    for _ in 0..n {
        let x: f64 = rng.gen_range(0.0..10.0);
        let y: f64 = rng.gen_range(0.0..10.0);
        cols[0].push(x);
        cols[1].push(y);
        cols[2].push(x + rng.gen_range(-1.0..1.0));
        cols[3].push(y + rng.gen_range(-1.0..1.0));
    }
    let [x0, y0, xt, yt] = cols;
    Trajectories::new(&x0, &y0, &xt, &yt).expect("equal columns")
}
