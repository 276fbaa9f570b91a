//! Axis-aligned bounding rectangles.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::types::Hs2;
use super::Polygon;

/// Closed rectangle `[xmin, xmax] × [ymin, ymax]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox2 {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BBox2 {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Tight box around `points`; `None` for an empty slice.
    pub fn from_points(points: &[Vector2<f64>]) -> Option<Self> {
        let first = points.first()?;
        let init = Self::new(first.x, first.x, first.y, first.y);
        Some(points.iter().fold(init, |b, p| Self {
            xmin: b.xmin.min(p.x),
            xmax: b.xmax.max(p.x),
            ymin: b.ymin.min(p.y),
            ymax: b.ymax.max(p.y),
        }))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn is_finite(&self) -> bool {
        [self.xmin, self.xmax, self.ymin, self.ymax]
            .iter()
            .all(|v| v.is_finite())
    }

    #[inline]
    pub fn contains(&self, p: Vector2<f64>) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// Closed overlap (touching boxes overlap).
    #[inline]
    pub fn overlaps(&self, other: &BBox2) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    /// Overlap with positive area.
    #[inline]
    pub fn overlaps_interior(&self, other: &BBox2) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }

    /// The four sides as outward half-planes.
    pub fn halfplanes(&self) -> [Hs2; 4] {
        [
            Hs2::new(Vector2::new(1.0, 0.0), self.xmax),
            Hs2::new(Vector2::new(0.0, 1.0), self.ymax),
            Hs2::new(Vector2::new(-1.0, 0.0), -self.xmin),
            Hs2::new(Vector2::new(0.0, -1.0), -self.ymin),
        ]
    }

    /// Counterclockwise rectangle polygon. Callers check non-degeneracy.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_ring_unchecked(vec![
            Vector2::new(self.xmin, self.ymin),
            Vector2::new(self.xmax, self.ymin),
            Vector2::new(self.xmax, self.ymax),
            Vector2::new(self.xmin, self.ymax),
        ])
    }
}
