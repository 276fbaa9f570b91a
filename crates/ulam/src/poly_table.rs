//! Vertex/edge tables for a list of polygons.
//!
//! `nodes[k]` is a vertex; `edges[e] = [from, to, polygon]` joins two nodes of the
//! same polygon. Each polygon owns its nodes (no sharing), so the tables
//! round-trip exactly.

use serde::{Deserialize, Serialize};

use crate::error::{Result, UlamError};
use crate::geom2::Polygon;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolyTable {
    pub nodes: Vec<[f64; 2]>,
    pub edges: Vec<[usize; 3]>,
}

impl PolyTable {
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let mut table = Self::default();
        for (k, poly) in polygons.iter().enumerate() {
            let base = table.nodes.len();
            let n = poly.len();
            table.nodes.extend(poly.to_xy());
            table
                .edges
                .extend((0..n).map(|i| [base + i, base + (i + 1) % n, k]));
        }
        table
    }

    /// Number of polygons referenced by the edge table.
    pub fn n_polygons(&self) -> usize {
        self.edges.iter().map(|e| e[2] + 1).max().unwrap_or(0)
    }

    /// Rebuild polygons from the tables. Edges of one polygon must be listed in
    /// ring order, as `from_polygons` writes them.
    pub fn to_polygons(&self) -> Result<Vec<Polygon>> {
        let mut rings: Vec<Vec<[f64; 2]>> = vec![Vec::new(); self.n_polygons()];
        for &[from, _, k] in &self.edges {
            let node = self.nodes.get(from).ok_or_else(|| {
                UlamError::invalid_polygon(format!("edge references missing node {from}"))
            })?;
            rings[k].push(*node);
        }
        rings.iter().map(|r| Polygon::from_xy(r)).collect()
    }
}
