//! Seeded k-means (k-means++ initialisation, Lloyd iterations).
//!
//! Determinism
//! - All randomness comes from one `StdRng::seed_from_u64(seed)`.
//! - The assignment step runs in parallel but only produces per-point labels;
//!   centre sums are accumulated sequentially in point order, so the result is
//!   bit-identical for a given seed regardless of thread count.

use nalgebra::Vector2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::config::KMeansCfg;

/// Fitted centres and how the iteration ended.
#[derive(Clone, Debug)]
pub struct KMeansFit {
    pub centers: Vec<Vector2<f64>>,
    pub iterations: usize,
    pub converged: bool,
}

/// Cluster `points` into `k` groups. Callers guarantee `1 <= k <= points.len()`.
///
/// `scale` is the length the tolerance is relative to (the bounding-box diagonal).
pub fn kmeans(
    points: &[Vector2<f64>],
    k: usize,
    cfg: &KMeansCfg,
    seed: u64,
    scale: f64,
) -> KMeansFit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centers = init_plus_plus(points, k, &mut rng);
    let tol = cfg.tol * scale;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < cfg.max_iter {
        iterations += 1;
        let labels: Vec<(usize, f64)> = points
            .par_iter()
            .map(|p| nearest(&centers, *p))
            .collect();

        let mut sums = vec![Vector2::<f64>::zeros(); k];
        let mut sizes = vec![0usize; k];
        for (p, (c, _)) in points.iter().zip(&labels) {
            sums[*c] += p;
            sizes[*c] += 1;
        }

        let mut next: Vec<Vector2<f64>> = sums
            .iter()
            .zip(&sizes)
            .zip(&centers)
            .map(|((s, &m), old)| if m > 0 { s / m as f64 } else { *old })
            .collect();
        reseed_empty(points, &labels, &sizes, &mut next);

        let shift = centers
            .iter()
            .zip(&next)
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max);
        centers = next;
        if shift <= tol {
            converged = true;
            break;
        }
    }
    debug!(k, iterations, converged, "k-means finished");
    KMeansFit {
        centers,
        iterations,
        converged,
    }
}

/// k-means++: the first centre uniformly, each next one with probability
/// proportional to the squared distance to the nearest chosen centre.
fn init_plus_plus(points: &[Vector2<f64>], k: usize, rng: &mut StdRng) -> Vec<Vector2<f64>> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.gen_range(0..points.len())]);
    let mut d2: Vec<f64> = points
        .iter()
        .map(|p| (p - centers[0]).norm_squared())
        .collect();
    while centers.len() < k {
        let pick = match WeightedIndex::new(&d2) {
            Ok(w) => w.sample(rng),
            // Every point coincides with a centre already; duplicates are merged later.
            Err(_) => rng.gen_range(0..points.len()),
        };
        let c = points[pick];
        centers.push(c);
        for (d, p) in d2.iter_mut().zip(points) {
            *d = d.min((p - c).norm_squared());
        }
    }
    centers
}

/// Move each empty cluster onto the point farthest from its own centre. Taken
/// points are not reused for a second empty cluster.
fn reseed_empty(
    points: &[Vector2<f64>],
    labels: &[(usize, f64)],
    sizes: &[usize],
    centers: &mut [Vector2<f64>],
) {
    let mut dist: Vec<f64> = labels.iter().map(|(_, d)| *d).collect();
    for (c, _) in sizes.iter().enumerate().filter(|&(_, &m)| m == 0) {
        let far = dist
            .iter()
            .enumerate()
            .fold((0usize, f64::NEG_INFINITY), |best, (i, &d)| {
                if d > best.1 {
                    (i, d)
                } else {
                    best
                }
            })
            .0;
        centers[c] = points[far];
        dist[far] = f64::NEG_INFINITY;
    }
}

/// Index of the nearest centre (ties to the lower index) and the squared distance.
#[inline]
pub(crate) fn nearest(centers: &[Vector2<f64>], p: Vector2<f64>) -> (usize, f64) {
    centers
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, c)| {
            let d = (p - c).norm_squared();
            if d < best.1 {
                (i, d)
            } else {
                best
            }
        })
}
