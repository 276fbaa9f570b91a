//! Coverings of the domain's bounding rectangle, then clipped to the domain.
//!
//! Purpose
//! - `CoveringGenerator` is the strategy seam; `CoveringKind::generator` picks the
//!   implementation from configuration (closed enum, no string dispatch).
//! - `build_covering` runs generator + domain clipper and returns the final,
//!   immutable `Covering` whose indices are the Markov states.
//!
//! Invariants
//! - Generators return pairwise interior-disjoint cells whose union is the
//!   bounding rectangle (squares, hexagons) or a partition of it (Voronoi).
//! - After clipping every cell lies in the domain and has positive area.

mod clipper;
mod hexagon;
mod kmeans;
mod square;
mod voronoi;

pub use clipper::clip_to_domain;
pub use hexagon::HexGrid;
pub use kmeans::{kmeans, KMeansFit};
pub use square::SquareGrid;
pub use voronoi::{voronoi_cells, VoronoiTessellation};

use nalgebra::Vector2;
use tracing::info;

use crate::config::{CoveringKind, UlamCfg};
use crate::domain::Domain;
use crate::error::Result;
use crate::geom2::{BBox2, Polygon};
use crate::trajectories::Trajectories;

/// Produces roughly `n` cells covering `bbox`. `starts` are the trajectory start
/// points; only data-driven generators look at them.
pub trait CoveringGenerator: Send + Sync {
    fn generate(&self, bbox: &BBox2, n: usize, starts: &[Vector2<f64>]) -> Result<Vec<Polygon>>;
}

impl CoveringKind {
    pub fn generator(self, cfg: &UlamCfg) -> Box<dyn CoveringGenerator> {
        match self {
            Self::Square => Box::new(SquareGrid),
            Self::Hexagon => Box::new(HexGrid),
            Self::Voronoi => Box::new(VoronoiTessellation::new(cfg.rseed, cfg.kmeans)),
        }
    }
}

/// Final covering: polygon `i` is Markov state `i`.
#[derive(Clone, Debug, PartialEq)]
pub struct Covering {
    pub polygons: Vec<Polygon>,
    /// Generator index of each kept cell.
    pub origin: Vec<usize>,
    pub n_generated: usize,
    pub n_dropped: usize,
}

impl Covering {
    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }
}

/// Generate the configured covering over the domain's bounding rectangle and clip
/// it to the domain.
pub fn build_covering(trajectories: &Trajectories, domain: &Domain) -> Result<Covering> {
    let cfg = domain.cfg();
    let n = cfg.poly_number();
    let raw = cfg
        .covering
        .generator(cfg)
        .generate(domain.bbox(), n, trajectories.start())?;
    info!(
        kind = %cfg.covering,
        requested = n,
        generated = raw.len(),
        "covering generated"
    );
    clip_to_domain(raw, domain)
}
