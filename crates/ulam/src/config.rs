//! Problem configuration with documented defaults.
//!
//! Defaults
//! - Covering: squares; 500 polygons for squares/hexagons, 100 for Voronoi cells.
//! - Reinjection: `data` (reinject where outside→inside trajectories were observed to land).
//! - Seed: 123 (only the k-means initialisation of the Voronoi covering is random).
//!
//! Everything here is plain data (serde) so callers can keep it next to results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UlamError};
use crate::geom2::{GeomCfg, Polygon};

/// Seed for the k-means initialisation when none is given.
pub const DEFAULT_RSEED: u64 = 123;

/// Kind of polygons covering the domain's bounding rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoveringKind {
    #[default]
    #[serde(rename = "sqr")]
    Square,
    #[serde(rename = "hex")]
    Hexagon,
    #[serde(rename = "vor")]
    Voronoi,
}

impl CoveringKind {
    pub const ALL: [CoveringKind; 3] = [Self::Square, Self::Hexagon, Self::Voronoi];

    pub fn default_poly_number(self) -> usize {
        match self {
            Self::Square | Self::Hexagon => 500,
            Self::Voronoi => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "sqr",
            Self::Hexagon => "hex",
            Self::Voronoi => "vor",
        }
    }
}

impl fmt::Display for CoveringKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoveringKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown covering kind {s:?} (expected sqr, hex or vor)"))
    }
}

/// Where the source policy reinjects mass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReinjectionRegion {
    /// Every covering polygon overlapping this polygon.
    Polygon(Polygon),
    /// Every covering polygon containing at least one of these points.
    Points(Vec<[f64; 2]>),
}

/// Stochasticization policy for the nirvana row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReinjectionKind {
    /// Proportional to observed outside→inside transitions.
    #[default]
    Data,
    /// Uniform over a target set; `None` targets every polygon.
    Source(Option<ReinjectionRegion>),
}

impl ReinjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Source(_) => "source",
        }
    }
}

/// k-means (Lloyd) settings for the Voronoi covering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansCfg {
    pub max_iter: usize,
    /// Stop once no center moves further than `tol` times the bounding-box diagonal.
    pub tol: f64,
}

impl Default for KMeansCfg {
    fn default() -> Self {
        Self {
            max_iter: 100,
            tol: 1e-6,
        }
    }
}

/// Power-iteration settings for the stationary distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EigenCfg {
    pub max_iter: usize,
    /// L1 change between iterates below which the iteration stops.
    pub tol: f64,
}

impl Default for EigenCfg {
    fn default() -> Self {
        Self {
            max_iter: 100_000,
            tol: 1e-12,
        }
    }
}

/// Full problem configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UlamCfg {
    pub covering: CoveringKind,
    /// Requested polygon count; `None` uses `CoveringKind::default_poly_number`.
    pub poly_number: Option<usize>,
    pub reinjection: ReinjectionKind,
    pub rseed: u64,
    pub geom: GeomCfg,
    pub kmeans: KMeansCfg,
    pub eigen: EigenCfg,
}

impl Default for UlamCfg {
    fn default() -> Self {
        Self {
            covering: CoveringKind::default(),
            poly_number: None,
            reinjection: ReinjectionKind::default(),
            rseed: DEFAULT_RSEED,
            geom: GeomCfg::default(),
            kmeans: KMeansCfg::default(),
            eigen: EigenCfg::default(),
        }
    }
}

impl UlamCfg {
    pub fn new(covering: CoveringKind) -> Self {
        Self {
            covering,
            ..Self::default()
        }
    }

    pub fn with_poly_number(mut self, n: usize) -> Self {
        self.poly_number = Some(n);
        self
    }

    pub fn with_rseed(mut self, seed: u64) -> Self {
        self.rseed = seed;
        self
    }

    pub fn with_reinjection(mut self, kind: ReinjectionKind) -> Self {
        self.reinjection = kind;
        self
    }

    /// Giving a region always selects the source policy.
    pub fn with_source_region(mut self, region: ReinjectionRegion) -> Self {
        self.reinjection = ReinjectionKind::Source(Some(region));
        self
    }

    #[inline]
    pub fn poly_number(&self) -> usize {
        self.poly_number
            .unwrap_or_else(|| self.covering.default_poly_number())
    }

    /// Checks that do not need trajectories or a covering.
    pub fn validate(&self) -> Result<()> {
        let n = self.poly_number();
        if n == 0 {
            return Err(UlamError::InvalidCoveringCount {
                kind: self.covering.as_str(),
                requested: n,
            });
        }
        if let ReinjectionKind::Source(Some(ReinjectionRegion::Points(pts))) = &self.reinjection {
            if pts.is_empty() {
                return Err(UlamError::EmptyReinjectionTarget);
            }
        }
        Ok(())
    }
}
