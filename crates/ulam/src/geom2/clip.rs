//! Polygon clipping and overlap tests.
//!
//! - `intersect`: general (non-convex) intersection, possibly several disjoint pieces.
//! - `largest_piece`: the policy used whenever a single piece must be kept.
//! - `intersects`: existence of a positive-area overlap; shared edges alone do not count.
//! - `covers`: exact containment of one polygon in another, no clipping involved.
//! - `clip_convex_to_bbox`: half-plane route for convex cells against a rectangle.
//!
//! `geo`'s boolean ops round through a fixed-point grid, so their output vertices
//! drift by ~1e-9 of the extent. Every output vertex is pulled back onto the
//! nearest exact candidate (an input vertex or an f64 edge-edge crossing) so
//! neighbouring clipped cells keep shared edges bit for bit.

use geo::BooleanOps;
use nalgebra::Vector2;

use super::halfplane::HalfPlanes;
use super::polygon::{Location, Polygon};
use super::{BBox2, GeomCfg, Hs2};

/// Snap radius relative to the extent of the two inputs; well above the
/// clipper's grid drift and well below any meaningful feature.
const SNAP_REL: f64 = 1e-7;

/// Intersection of two simple polygons as disjoint pieces (empty if they do not overlap).
///
/// Output vertices sit on input coordinates. Pieces with zero area are
/// discarded; the result order is the clipper's order.
pub fn intersect(a: &Polygon, b: &Polygon) -> Vec<Polygon> {
    if !a.bbox().overlaps(b.bbox()) {
        return Vec::new();
    }
    let clipped = a.to_geo().intersection(&b.to_geo());
    let snap = Snapper::new(a, b);
    clipped
        .0
        .iter()
        .filter_map(|p| snap.polygon(p))
        .filter(|p| p.area() > 0.0)
        .collect()
}

/// Exact points that a clipped ring may legitimately have as vertices.
struct Snapper {
    points: Vec<Vector2<f64>>,
    tol: f64,
}

impl Snapper {
    fn new(a: &Polygon, b: &Polygon) -> Self {
        let (ba, bb) = (a.bbox(), b.bbox());
        let extent = ba.width().max(ba.height()).max(bb.width()).max(bb.height());
        let tol = SNAP_REL * extent;
        // Only the common window can carry output vertices.
        let window = BBox2::new(
            ba.xmin.max(bb.xmin) - tol,
            ba.xmax.min(bb.xmax) + tol,
            ba.ymin.max(bb.ymin) - tol,
            ba.ymax.min(bb.ymax) + tol,
        );
        let in_window = |v: &Vector2<f64>| window.contains(*v);
        let mut points: Vec<Vector2<f64>> = a
            .vertices()
            .iter()
            .chain(b.vertices())
            .copied()
            .filter(in_window)
            .collect();
        let edges_b: Vec<_> = b
            .edges()
            .filter(|(q1, q2)| segment_box(*q1, *q2).overlaps(&window))
            .collect();
        for (p1, p2) in a.edges() {
            let pb = segment_box(p1, p2);
            if !pb.overlaps(&window) {
                continue;
            }
            for &(q1, q2) in &edges_b {
                if pb.overlaps(&segment_box(q1, q2)) {
                    points.extend(segment_crossing(p1, p2, q1, q2));
                }
            }
        }
        Self { points, tol }
    }

    fn snap(&self, v: Vector2<f64>) -> Vector2<f64> {
        self.points
            .iter()
            .map(|c| (c, (c - v).norm_squared()))
            .filter(|&(_, d2)| d2 <= self.tol * self.tol)
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map_or(v, |(c, _)| *c)
    }

    fn polygon(&self, p: &geo::Polygon<f64>) -> Option<Polygon> {
        let ring: Vec<Vector2<f64>> = p
            .exterior()
            .coords()
            .map(|c| self.snap(Vector2::new(c.x, c.y)))
            .collect();
        Polygon::new(dedup_ring(ring, 0.0)).ok()
    }
}

#[inline]
fn segment_box(p: Vector2<f64>, q: Vector2<f64>) -> BBox2 {
    BBox2::new(p.x.min(q.x), p.x.max(q.x), p.y.min(q.y), p.y.max(q.y))
}

/// Crossing point of two non-parallel segments, endpoints included.
fn segment_crossing(
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    q1: Vector2<f64>,
    q2: Vector2<f64>,
) -> Option<Vector2<f64>> {
    let r = p2 - p1;
    let s = q2 - q1;
    let den = r.perp(&s);
    if den == 0.0 {
        return None;
    }
    let w = q1 - p1;
    let t = w.perp(&s) / den;
    let u = w.perp(&r) / den;
    let slack = 1e-12;
    if !((-slack..=1.0 + slack).contains(&t) && (-slack..=1.0 + slack).contains(&u)) {
        return None;
    }
    let mut x = p1 + r * t.clamp(0.0, 1.0);
    // Axis-aligned edges pin their coordinate exactly.
    for (a, b) in [(p1, p2), (q1, q2)] {
        if a.x == b.x {
            x.x = a.x;
        }
        if a.y == b.y {
            x.y = a.y;
        }
    }
    Some(x)
}

/// True iff `inner` lies in the closed region of `outer`.
///
/// Holds when every vertex of `inner` is in `outer`, no edges cross properly, and
/// no vertex or edge midpoint of `outer` lies strictly inside `inner`.
pub fn covers(outer: &Polygon, inner: &Polygon, cfg: &GeomCfg) -> bool {
    let eps = cfg.eps_edge;
    if inner
        .vertices()
        .iter()
        .any(|v| outer.locate(*v, eps) == Location::Outside)
    {
        return false;
    }
    let window = inner.bbox();
    for (p1, p2) in outer.edges() {
        if !segment_box(p1, p2).overlaps(window) {
            continue;
        }
        let poke = |v: Vector2<f64>| inner.locate(v, eps) == Location::Inside;
        if poke(p1) || poke((p1 + p2) * 0.5) {
            return false;
        }
        if inner
            .edges()
            .any(|(q1, q2)| segments_cross(p1, p2, q1, q2, eps))
        {
            return false;
        }
    }
    true
}

/// Largest-area piece, ties broken by the lowest position in `pieces`.
pub fn largest_piece(pieces: Vec<Polygon>) -> Option<Polygon> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in pieces.iter().enumerate() {
        let a = p.area();
        if best.map_or(true, |(_, best_a)| a > best_a) {
            best = Some((i, a));
        }
    }
    let (i, _) = best?;
    pieces.into_iter().nth(i)
}

/// True iff `a` and `b` share a region of positive area.
///
/// Cheap certificates are tried first (box rejection, a strict edge crossing, a
/// vertex strictly inside the other polygon); configurations they cannot settle
/// (coincident or nested outlines with shared edges) fall back to the exact
/// intersection area.
pub fn intersects(a: &Polygon, b: &Polygon, cfg: &GeomCfg) -> bool {
    if !a.bbox().overlaps_interior(b.bbox()) {
        return false;
    }
    for (p1, p2) in a.edges() {
        for (q1, q2) in b.edges() {
            if segments_cross(p1, p2, q1, q2, cfg.eps_edge) {
                return true;
            }
        }
    }
    let strictly_in = |poly: &Polygon, other: &Polygon| {
        poly.vertices()
            .iter()
            .any(|v| other.locate(*v, cfg.eps_edge) == Location::Inside)
    };
    if strictly_in(a, b) || strictly_in(b, a) {
        return true;
    }
    let reference = a.area().min(b.area());
    intersect(a, b)
        .iter()
        .any(|p| p.area() > cfg.eps_area_rel * reference)
}

/// Convex polygon ∩ rectangle through half-planes. `None` if the result is empty
/// or degenerate (area at most 1e-12 of the rectangle's).
pub fn clip_convex_to_bbox(poly: &Polygon, bbox: &BBox2) -> Option<Polygon> {
    let mut hp: HalfPlanes = bbox.halfplanes().into_iter().collect();
    hp.extend(convex_halfplanes(poly));
    let verts = hp.intersection().vertices()?;
    let ring = dedup_ring(verts, 1e-12 * (bbox.width() + bbox.height()));
    let out = Polygon::new(ring).ok()?;
    (out.area() > 1e-12 * bbox.area()).then_some(out)
}

/// Outward half-planes of a convex polygon (either orientation).
pub(crate) fn convex_halfplanes(poly: &Polygon) -> Vec<Hs2> {
    let flip = if poly.signed_area() >= 0.0 { 1.0 } else { -1.0 };
    poly.edges()
        .map(|(p, q)| {
            let e = (q - p) * flip;
            let n = Vector2::new(e.y, -e.x);
            Hs2::new(n, n.dot(&p))
        })
        .collect()
}

/// Drop consecutive vertices closer than `tol` (including across the wrap).
pub(crate) fn dedup_ring(
    verts: Vec<Vector2<f64>>,
    tol: f64,
) -> Vec<Vector2<f64>> {
    let mut out: Vec<Vector2<f64>> = Vec::with_capacity(verts.len());
    for v in verts {
        if out.last().map_or(true, |l| (l - v).norm() > tol) {
            out.push(v);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= tol {
        out.pop();
    }
    out
}

#[inline]
fn orient(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Proper crossing: each segment strictly separates the other's endpoints, with
/// every endpoint further than `eps` from the other segment's line. Collinear
/// shared edges carrying rounding noise therefore never count as crossings.
fn segments_cross(
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    q1: Vector2<f64>,
    q2: Vector2<f64>,
    eps: f64,
) -> bool {
    let tp = eps * (p2 - p1).norm();
    let tq = eps * (q2 - q1).norm();
    let d1 = orient(p1, p2, q1);
    let d2 = orient(p1, p2, q2);
    let d3 = orient(q1, q2, p1);
    let d4 = orient(q1, q2, p2);
    let split = |a: f64, b: f64, t: f64| a.abs() > t && b.abs() > t && (a > 0.0) != (b > 0.0);
    split(d1, d2, tp) && split(d3, d4, tq)
}
