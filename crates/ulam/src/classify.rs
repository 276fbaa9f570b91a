//! Point classification against the domain and the clipped covering.
//!
//! Rules
//! - Outside the domain (boundary-inclusive test) means `Nirvana`.
//! - Inside the domain, the first covering polygon containing the point wins;
//!   candidates are visited in ascending index order, so the answer equals a
//!   linear scan.
//! - An interior point claimed by no polygon (numerical gaps at shared edges,
//!   slivers dropped by the clipper) goes to the polygon with the nearest
//!   centroid. These tie-breaks are counted.
//!
//! Batches are classified in parallel; each point is independent.

use nalgebra::Vector2;
use rayon::prelude::*;

use crate::covering::Covering;
use crate::domain::Domain;
use crate::geom2::{BBox2, Polygon};

/// Class of a single point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Inside(usize),
    Nirvana,
}

impl Label {
    /// Matrix index with nirvana mapped to `n_cells`.
    #[inline]
    pub fn state(self, n_cells: usize) -> usize {
        match self {
            Label::Inside(i) => i,
            Label::Nirvana => n_cells,
        }
    }

    #[inline]
    pub fn is_nirvana(self) -> bool {
        matches!(self, Label::Nirvana)
    }
}

/// Labels for a batch, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Classification {
    pub labels: Vec<Label>,
    pub tie_breaks: usize,
}

impl Classification {
    pub fn n_nirvana(&self) -> usize {
        self.labels.iter().filter(|l| l.is_nirvana()).count()
    }
}

/// Anything points can be classified against. The flag reports a tie-break.
pub trait Classify: Sync {
    fn label(&self, p: Vector2<f64>) -> (Label, bool);
}

/// Coarse test: `Inside(0)` for domain members.
impl Classify for Domain {
    fn label(&self, p: Vector2<f64>) -> (Label, bool) {
        if self.contains(p) {
            (Label::Inside(0), false)
        } else {
            (Label::Nirvana, false)
        }
    }
}

/// Classify every point; output order matches input order.
pub fn classify(points: &[Vector2<f64>], target: &dyn Classify) -> Classification {
    let pairs: Vec<(Label, bool)> = points.par_iter().map(|p| target.label(*p)).collect();
    let tie_breaks = pairs.iter().filter(|(_, tie)| *tie).count();
    Classification {
        labels: pairs.into_iter().map(|(l, _)| l).collect(),
        tie_breaks,
    }
}

/// Covering plus domain plus a uniform bucket grid over the domain's bounding box.
pub struct CoveringIndex<'a> {
    polygons: &'a [Polygon],
    domain: &'a Domain,
    grid: BucketGrid,
}

impl<'a> CoveringIndex<'a> {
    pub fn new(covering: &'a Covering, domain: &'a Domain) -> Self {
        Self::from_polygons(covering.polygons(), domain)
    }

    pub fn from_polygons(polygons: &'a [Polygon], domain: &'a Domain) -> Self {
        let grid = BucketGrid::new(*domain.bbox(), polygons, domain.cfg().geom.eps_edge);
        Self {
            polygons,
            domain,
            grid,
        }
    }

    fn nearest_centroid(&self, p: Vector2<f64>) -> usize {
        self.polygons
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (i, poly)| {
                let d = (poly.centroid() - p).norm_squared();
                if d < best.1 {
                    (i, d)
                } else {
                    best
                }
            })
            .0
    }
}

impl Classify for CoveringIndex<'_> {
    fn label(&self, p: Vector2<f64>) -> (Label, bool) {
        if !self.domain.contains(p) {
            return (Label::Nirvana, false);
        }
        let eps = self.domain.cfg().geom.eps_edge;
        for &i in self.grid.candidates(p) {
            if self.polygons[i].contains_closed(p, eps) {
                return (Label::Inside(i), false);
            }
        }
        if self.polygons.is_empty() {
            return (Label::Nirvana, false);
        }
        (Label::Inside(self.nearest_centroid(p)), true)
    }
}

/// Uniform grid of buckets, each listing (in ascending order) the polygons whose
/// bounding box meets it.
struct BucketGrid {
    bbox: BBox2,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<usize>>,
}

impl BucketGrid {
    fn new(bbox: BBox2, polygons: &[Polygon], pad: f64) -> Self {
        let side = ((polygons.len().max(1) as f64).sqrt().ceil() as usize).clamp(1, 512);
        let (nx, ny) = (side, side);
        let mut grid = Self {
            bbox,
            nx,
            ny,
            buckets: vec![Vec::new(); nx * ny],
        };
        for (i, poly) in polygons.iter().enumerate() {
            let b = poly.bbox();
            let (i0, j0) = grid.cell_of(b.xmin - pad, b.ymin - pad);
            let (i1, j1) = grid.cell_of(b.xmax + pad, b.ymax + pad);
            for j in j0..=j1 {
                for k in i0..=i1 {
                    grid.buckets[j * nx + k].push(i);
                }
            }
        }
        grid
    }

    #[inline]
    fn cell_of(&self, x: f64, y: f64) -> (usize, usize) {
        let fx = (x - self.bbox.xmin) / self.bbox.width() * self.nx as f64;
        let fy = (y - self.bbox.ymin) / self.bbox.height() * self.ny as f64;
        let clamp = |f: f64, n: usize| (f.floor().max(0.0) as usize).min(n - 1);
        (clamp(fx, self.nx), clamp(fy, self.ny))
    }

    #[inline]
    fn candidates(&self, p: Vector2<f64>) -> &[usize] {
        let (i, j) = self.cell_of(p.x, p.y);
        &self.buckets[j * self.nx + i]
    }
}
