//! Simple polygons as closed vertex rings.
//!
//! - Consecutive vertices form the edges; the last vertex connects back to the first.
//! - Either orientation is accepted; `area` is unsigned, `signed_area` is positive for CCW.
//! - The centroid and bounding box are computed once at construction.
//!
//! Boundary policy: `locate` reports `Boundary` for points within `eps` of an
//! edge, and every containment test in the crate treats the boundary as inside.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::bbox::BBox2;
use crate::error::{Result, UlamError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Polygon {
    vertices: Vec<Vector2<f64>>,
    centroid: Vector2<f64>,
    bbox: BBox2,
}

/// Position of a point relative to a polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

impl Polygon {
    /// Build from a vertex ring. A repeated closing vertex is dropped.
    pub fn new(mut vertices: Vec<Vector2<f64>>) -> Result<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(UlamError::invalid_polygon(format!(
                "need at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !(v.x.is_finite() && v.y.is_finite())) {
            return Err(UlamError::invalid_polygon("non-finite vertex coordinate"));
        }
        Ok(Self::from_ring_unchecked(vertices))
    }

    pub fn from_xy(points: &[[f64; 2]]) -> Result<Self> {
        Self::new(points.iter().map(|p| Vector2::new(p[0], p[1])).collect())
    }

    /// Axis-aligned rectangle with lower-left `(xmin, ymin)` and upper-right `(xmax, ymax)`.
    pub fn rectangle(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        let bbox = BBox2::new(xmin, xmax, ymin, ymax);
        if !(bbox.is_finite() && xmin < xmax && ymin < ymax) {
            return Err(UlamError::invalid_polygon(format!(
                "rectangle [{xmin}, {xmax}] x [{ymin}, {ymax}] is empty"
            )));
        }
        Ok(bbox.to_polygon())
    }

    /// Caller guarantees at least three finite vertices.
    pub(crate) fn from_ring_unchecked(vertices: Vec<Vector2<f64>>) -> Self {
        let centroid = area_centroid(&vertices).unwrap_or_else(|| vertex_mean(&vertices));
        let bbox = BBox2::from_points(&vertices).unwrap_or(BBox2::new(0.0, 0.0, 0.0, 0.0));
        Self {
            vertices,
            centroid,
            bbox,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn centroid(&self) -> Vector2<f64> {
        self.centroid
    }

    #[inline]
    pub fn bbox(&self) -> &BBox2 {
        &self.bbox
    }

    /// Edges `(v[i], v[i+1])`, wrapping around.
    pub fn edges(&self) -> impl Iterator<Item = (Vector2<f64>, Vector2<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace area, positive for counterclockwise rings.
    pub fn signed_area(&self) -> f64 {
        0.5 * self.edges().map(|(p, q)| p.x * q.y - q.x * p.y).sum::<f64>()
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// True if the area does not exceed `eps_area` (absolute).
    #[inline]
    pub fn is_degenerate(&self, eps_area: f64) -> bool {
        self.area() <= eps_area
    }

    /// No reflex vertex; collinear vertices are allowed.
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        let mut sign = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            let cross = (b - a).perp(&(c - b));
            if cross != 0.0 {
                if sign != 0.0 && cross.signum() != sign {
                    return false;
                }
                sign = cross.signum();
            }
        }
        true
    }

    #[inline]
    pub fn locate(&self, p: Vector2<f64>, eps: f64) -> Location {
        locate(p, self, eps)
    }

    /// Closed containment: boundary points are inside.
    #[inline]
    pub fn contains_closed(&self, p: Vector2<f64>, eps: f64) -> bool {
        locate(p, self, eps) != Location::Outside
    }

    pub fn to_xy(&self) -> Vec<[f64; 2]> {
        self.vertices.iter().map(|v| [v.x, v.y]).collect()
    }

    pub(crate) fn to_geo(&self) -> geo::Polygon<f64> {
        let ring: Vec<geo::Coord<f64>> = self
            .vertices
            .iter()
            .map(|v| geo::Coord { x: v.x, y: v.y })
            .collect();
        geo::Polygon::new(geo::LineString::new(ring), vec![])
    }

    /// Exterior ring only; interior rings cannot arise from clipping convex cells
    /// against a simple domain.
    pub(crate) fn from_geo(p: &geo::Polygon<f64>) -> Option<Self> {
        let ring: Vec<Vector2<f64>> = p
            .exterior()
            .coords()
            .map(|c| Vector2::new(c.x, c.y))
            .collect();
        Self::new(ring).ok()
    }
}

impl TryFrom<Vec<[f64; 2]>> for Polygon {
    type Error = UlamError;

    fn try_from(points: Vec<[f64; 2]>) -> Result<Self> {
        Self::from_xy(&points)
    }
}

impl From<Polygon> for Vec<[f64; 2]> {
    fn from(p: Polygon) -> Self {
        p.to_xy()
    }
}

/// Boundary-inclusive point location (crossing-number test plus an on-edge check).
///
/// A point within `eps` of any edge is `Boundary`; otherwise the parity of
/// crossings of the ray towards +x decides. Non-finite points are `Outside`.
pub fn locate(p: Vector2<f64>, poly: &Polygon, eps: f64) -> Location {
    if !(p.x.is_finite() && p.y.is_finite()) {
        return Location::Outside;
    }
    let b = poly.bbox();
    if p.x < b.xmin - eps || p.x > b.xmax + eps || p.y < b.ymin - eps || p.y > b.ymax + eps {
        return Location::Outside;
    }
    let mut inside = false;
    for (a, q) in poly.edges() {
        if on_segment(a, q, p, eps) {
            return Location::Boundary;
        }
        if (a.y > p.y) != (q.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (q.x - a.x) / (q.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    if inside {
        Location::Inside
    } else {
        Location::Outside
    }
}

fn on_segment(a: Vector2<f64>, b: Vector2<f64>, p: Vector2<f64>, eps: f64) -> bool {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm() <= eps;
    }
    let len = len2.sqrt();
    let ap = p - a;
    let cross = d.x * ap.y - d.y * ap.x;
    if cross.abs() > eps * len {
        return false;
    }
    let t = d.dot(&ap);
    t >= -eps * len && t <= len2 + eps * len
}

/// Area centroid of a ring; `None` when the ring has (near) zero area.
fn area_centroid(verts: &[Vector2<f64>]) -> Option<Vector2<f64>> {
    if verts.len() < 3 {
        return None;
    }
    // Shift to the first vertex to limit cancellation for far-off coordinates.
    let o = verts[0];
    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..verts.len() {
        let p = verts[i] - o;
        let q = verts[(i + 1) % verts.len()] - o;
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    a *= 0.5;
    if a.abs() < 1e-300 {
        return None;
    }
    Some(o + Vector2::new(cx / (6.0 * a), cy / (6.0 * a)))
}

fn vertex_mean(verts: &[Vector2<f64>]) -> Vector2<f64> {
    let n = verts.len().max(1) as f64;
    verts.iter().fold(Vector2::zeros(), |acc, v| acc + v) / n
}
