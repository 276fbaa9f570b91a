//! Voronoi covering seeded by k-means over the trajectory start points.
//!
//! Each cell is the bounding rectangle intersected with the bisector half-planes
//! towards every other centre, so open cells are closed by the rectangle sides.

use nalgebra::Vector2;
use rayon::prelude::*;
use tracing::{info, warn};

use super::kmeans::kmeans;
use super::CoveringGenerator;
use crate::config::KMeansCfg;
use crate::error::{Result, UlamError};
use crate::geom2::{dedup_ring, BBox2, HalfPlanes, Hs2, Polygon};

#[derive(Clone, Copy, Debug)]
pub struct VoronoiTessellation {
    pub seed: u64,
    pub kmeans: KMeansCfg,
}

impl VoronoiTessellation {
    pub fn new(seed: u64, kmeans: KMeansCfg) -> Self {
        Self { seed, kmeans }
    }
}

impl CoveringGenerator for VoronoiTessellation {
    fn generate(&self, bbox: &BBox2, n: usize, starts: &[Vector2<f64>]) -> Result<Vec<Polygon>> {
        if n == 0 {
            return Err(UlamError::InvalidCoveringCount {
                kind: "vor",
                requested: n,
            });
        }
        let pts: Vec<Vector2<f64>> = starts
            .iter()
            .copied()
            .filter(|p| p.x.is_finite() && p.y.is_finite() && bbox.contains(*p))
            .collect();
        if pts.len() < n {
            return Err(UlamError::InsufficientStartPoints {
                needed: n,
                found: pts.len(),
            });
        }
        let diag = bbox.width().hypot(bbox.height());
        let fit = kmeans(&pts, n, &self.kmeans, self.seed, diag);
        if !fit.converged {
            warn!(
                iterations = fit.iterations,
                "k-means hit the iteration cap; using the last centres"
            );
        }
        let centers = merge_coincident(fit.centers, 1e-12 * diag);
        if centers.len() < n {
            warn!(
                requested = n,
                distinct = centers.len(),
                "coincident k-means centres merged"
            );
        }
        info!(centers = centers.len(), seed = self.seed, "voronoi centres ready");
        Ok(voronoi_cells(&centers, bbox))
    }
}

/// Keep the first of every group of centres closer than `tol`.
fn merge_coincident(centers: Vec<Vector2<f64>>, tol: f64) -> Vec<Vector2<f64>> {
    let mut out: Vec<Vector2<f64>> = Vec::with_capacity(centers.len());
    for c in centers {
        if out.iter().all(|o| (o - c).norm() > tol) {
            out.push(c);
        }
    }
    out
}

/// Voronoi cells of distinct `centers`, clipped to `bbox`, in centre order.
/// Centres outside the rectangle may yield no cell.
pub fn voronoi_cells(centers: &[Vector2<f64>], bbox: &BBox2) -> Vec<Polygon> {
    let tol = 1e-12 * (bbox.width() + bbox.height());
    centers
        .par_iter()
        .enumerate()
        .filter_map(|(i, &c)| {
            let mut hp: HalfPlanes = bbox.halfplanes().into_iter().collect();
            hp.extend(
                centers
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, &o)| Hs2::closer_to(c, o)),
            );
            let verts = hp.intersection().vertices()?;
            let cell = Polygon::new(dedup_ring(verts, tol)).ok()?;
            (cell.area() > 0.0).then_some(cell)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2::{intersects, GeomCfg};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn uniform(n: usize, bbox: &BBox2, seed: u64) -> Vec<Vector2<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Vector2::new(
                    rng.gen_range(bbox.xmin..bbox.xmax),
                    rng.gen_range(bbox.ymin..bbox.ymax),
                )
            })
            .collect()
    }

    #[test]
    fn two_centres_split_the_box_at_the_bisector() {
        let bbox = BBox2::new(0.0, 2.0, 0.0, 1.0);
        let cells = voronoi_cells(&[Vector2::new(0.5, 0.5), Vector2::new(1.5, 0.5)], &bbox);
        assert_eq!(cells.len(), 2);
        assert!((cells[0].area() - 1.0).abs() < 1e-12);
        assert!((cells[0].bbox().xmax - 1.0).abs() < 1e-12);
        assert!((cells[1].bbox().xmin - 1.0).abs() < 1e-12);
    }

    #[test]
    fn partition_of_the_box() {
        let bbox = BBox2::new(-1.0, 3.0, 0.0, 2.0);
        let starts = uniform(2000, &bbox, 5);
        let gen = VoronoiTessellation::new(123, KMeansCfg::default());
        let cells = gen.generate(&bbox, 25, &starts).unwrap();
        assert_eq!(cells.len(), 25);
        let total: f64 = cells.iter().map(Polygon::area).sum();
        assert!((total - bbox.area()).abs() < 1e-9);
        let cfg = GeomCfg::default();
        for (i, a) in cells.iter().enumerate() {
            for b in &cells[i + 1..] {
                assert!(!intersects(a, b, &cfg));
            }
        }
    }

    #[test]
    fn seed_makes_cells_reproducible() {
        let bbox = BBox2::new(0.0, 1.0, 0.0, 1.0);
        let starts = uniform(500, &bbox, 11);
        let gen = VoronoiTessellation::new(7, KMeansCfg::default());
        let a = gen.generate(&bbox, 10, &starts).unwrap();
        let b = gen.generate(&bbox, 10, &starts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn too_few_points_inside_the_box() {
        let bbox = BBox2::new(0.0, 1.0, 0.0, 1.0);
        let starts = vec![
            Vector2::new(0.5, 0.5),
            Vector2::new(5.0, 5.0),
            Vector2::new(f64::NAN, 0.5),
        ];
        let err = VoronoiTessellation::new(1, KMeansCfg::default())
            .generate(&bbox, 2, &starts)
            .unwrap_err();
        assert!(matches!(
            err,
            UlamError::InsufficientStartPoints { needed: 2, found: 1 }
        ));
    }

    #[test]
    fn coincident_centres_collapse() {
        let c = vec![Vector2::new(0.0, 0.0), Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)];
        assert_eq!(merge_coincident(c, 1e-12).len(), 2);
    }
}
