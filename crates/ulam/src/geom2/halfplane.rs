//! Convex regions as angle-ordered half-plane sets.
//!
//! Purpose
//! - Voronoi cells (rectangle ∩ bisector half-planes) and hexagon-to-rectangle
//!   clipping are convex, so they are built here rather than through the general
//!   polygon clipper.
//!
//! Invariants of `HalfPlanes`
//! - Unit normals (||n||=1).
//! - Sorted by atan2(n.y, n.x).
//! - Parallels coalesced (the most restrictive `c` is kept per direction).
//!
//! The intersection is a deque sweep over the ordered constraints; vertices come
//! out counterclockwise.

use std::collections::VecDeque;
use std::f64::consts::PI;

use nalgebra::Vector2;

use super::types::Hs2;

const PARALLEL_EPS: f64 = 1e-9;
const DET_EPS: f64 = 1e-12;

#[derive(Clone, Debug, Default)]
pub struct HalfPlanes {
    hs: Vec<Hs2>,
}

/// Outcome of intersecting a half-plane set.
#[derive(Clone, Debug)]
pub enum HalfplaneIntersection {
    Empty,
    Unbounded,
    Bounded(Vec<Vector2<f64>>),
}

impl HalfplaneIntersection {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, HalfplaneIntersection::Empty)
    }

    #[inline]
    pub fn vertices(self) -> Option<Vec<Vector2<f64>>> {
        match self {
            HalfplaneIntersection::Bounded(v) => Some(v),
            _ => None,
        }
    }
}

impl HalfPlanes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.hs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hs.is_empty()
    }

    /// Insert a constraint, keeping the ordering and coalescing invariants.
    /// Zero or non-finite normals are ignored.
    pub fn insert(&mut self, h: Hs2) {
        let Some(h) = unit(h) else {
            return;
        };
        let key = angle_of(h.n);
        let at = self.hs.partition_point(|g| angle_of(g.n) <= key);
        for k in [at.wrapping_sub(1), at] {
            if let Some(g) = self.hs.get_mut(k) {
                if (g.n - h.n).norm() < PARALLEL_EPS {
                    g.c = g.c.min(h.c);
                    return;
                }
            }
        }
        self.hs.insert(at, h);
    }

    /// Intersect all constraints.
    pub fn intersection(&self) -> HalfplaneIntersection {
        sweep(&self.hs)
    }
}

impl FromIterator<Hs2> for HalfPlanes {
    fn from_iter<I: IntoIterator<Item = Hs2>>(iter: I) -> Self {
        let mut out = HalfPlanes::new();
        for h in iter {
            out.insert(h);
        }
        out
    }
}

impl Extend<Hs2> for HalfPlanes {
    fn extend<I: IntoIterator<Item = Hs2>>(&mut self, iter: I) {
        for h in iter {
            self.insert(h);
        }
    }
}

#[inline]
fn angle_of(n: Vector2<f64>) -> f64 {
    n.y.atan2(n.x)
}

#[inline]
fn unit(h: Hs2) -> Option<Hs2> {
    let norm = h.n.norm();
    if !norm.is_finite() || norm <= 0.0 || !h.c.is_finite() {
        return None;
    }
    Some(Hs2::new(h.n / norm, h.c / norm))
}

#[inline]
fn wrap_angle(a: f64) -> f64 {
    let mut x = a;
    while x <= -PI {
        x += 2.0 * PI;
    }
    while x > PI {
        x -= 2.0 * PI;
    }
    x
}

fn boundary_crossing(h1: Hs2, h2: Hs2) -> Option<Vector2<f64>> {
    let det = h1.n.x * h2.n.y - h1.n.y * h2.n.x;
    if det.abs() < DET_EPS {
        return None;
    }
    let x = (h1.c * h2.n.y - h1.n.y * h2.c) / det;
    let y = (h1.n.x * h2.c - h1.c * h2.n.x) / det;
    Some(Vector2::new(x, y))
}

/// Opposite parallel pairs `n·x <= c1`, `-n·x <= c2` are empty iff `-c2 > c1`.
fn has_contradiction(hs: &[Hs2], angles: &[f64]) -> bool {
    hs.iter().zip(angles).any(|(h, &a)| {
        let target = wrap_angle(a + PI);
        let k = angles.partition_point(|&b| b < target);
        [k.wrapping_sub(1), k].into_iter().any(|k| {
            angles
                .get(k)
                .is_some_and(|&b| (b - target).abs() < 1e-12 && -hs[k].c > h.c)
        })
    })
}

fn sweep(hs: &[Hs2]) -> HalfplaneIntersection {
    if hs.is_empty() {
        return HalfplaneIntersection::Unbounded;
    }
    let angles: Vec<f64> = hs.iter().map(|h| angle_of(h.n)).collect();
    if has_contradiction(hs, &angles) {
        return HalfplaneIntersection::Empty;
    }
    // `keeps(i, j, h)`: the corner of boundaries i and j satisfies h.
    let keeps = |i: usize, j: usize, h: &Hs2| {
        boundary_crossing(hs[i], hs[j]).is_some_and(|p| h.satisfies(p))
    };

    let mut dq: VecDeque<usize> = VecDeque::with_capacity(hs.len());
    for (i, h) in hs.iter().enumerate() {
        while dq.len() >= 2 && !keeps(dq[dq.len() - 2], dq[dq.len() - 1], h) {
            dq.pop_back();
        }
        while dq.len() >= 2 && !keeps(dq[0], dq[1], h) {
            dq.pop_front();
        }
        dq.push_back(i);
    }
    while dq.len() >= 3 && !keeps(dq[dq.len() - 2], dq[dq.len() - 1], &hs[dq[0]]) {
        dq.pop_back();
    }
    while dq.len() >= 3 && !keeps(dq[0], dq[1], &hs[dq[dq.len() - 1]]) {
        dq.pop_front();
    }

    if dq.is_empty() {
        return HalfplaneIntersection::Empty;
    }
    if dq.len() < 3 {
        return HalfplaneIntersection::Unbounded;
    }
    let m = dq.len();
    let mut verts = Vec::with_capacity(m);
    for k in 0..m {
        match boundary_crossing(hs[dq[k]], hs[dq[(k + 1) % m]]) {
            Some(p) => verts.push(p),
            None => return HalfplaneIntersection::Unbounded,
        }
    }
    HalfplaneIntersection::Bounded(verts)
}
