//! Basic 2D types and tolerances.
//!
//! - `GeomCfg`: centralizes the epsilons used by boundary and degeneracy checks.
//! - `Hs2`: closed half-plane `n·x <= c` with helper predicates.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeomCfg {
    /// Absolute distance under which a point counts as lying on a polygon edge.
    pub eps_edge: f64,
    /// Relative area (fraction of the reference area) under which a polygon is degenerate.
    pub eps_area_rel: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_edge: 1e-12,
            eps_area_rel: 1e-12,
        }
    }
}

/// Closed half-plane `n · x <= c` (no normalization required here).
#[derive(Clone, Copy, Debug)]
pub struct Hs2 {
    pub n: Vector2<f64>,
    pub c: f64,
}

impl Hs2 {
    #[inline]
    pub fn new(n: Vector2<f64>, c: f64) -> Self {
        Self { n, c }
    }

    /// Points at least as close to `a` as to `b` (perpendicular bisector side of `a`).
    #[inline]
    pub fn closer_to(a: Vector2<f64>, b: Vector2<f64>) -> Self {
        let n = b - a;
        let c = 0.5 * (b.norm_squared() - a.norm_squared());
        Self { n, c }
    }

    #[inline]
    pub fn satisfies(&self, p: Vector2<f64>) -> bool {
        self.n.dot(&p) <= self.c
    }
}
