//! Flat-top hexagon tiling of the bounding rectangle.
//!
//! The side `r` is chosen so one hexagon has area `W·H/n`; boundary hexagons are
//! clipped to the rectangle, so the realized count only approximates `n`.

use nalgebra::Vector2;
use tracing::debug;

use super::CoveringGenerator;
use crate::error::{Result, UlamError};
use crate::geom2::{clip_convex_to_bbox, BBox2, Polygon};

const SQRT3: f64 = 1.732_050_807_568_877_2;

#[derive(Clone, Copy, Debug, Default)]
pub struct HexGrid;

/// Side length of a regular hexagon with the given area.
#[inline]
pub(crate) fn hex_side(area: f64) -> f64 {
    (area / (1.5 * SQRT3)).sqrt()
}

fn hexagon(center: Vector2<f64>, r: f64) -> Polygon {
    let ring = (0..6)
        .map(|k| {
            let t = std::f64::consts::FRAC_PI_3 * k as f64;
            center + Vector2::new(r * t.cos(), r * t.sin())
        })
        .collect();
    Polygon::from_ring_unchecked(ring)
}

impl CoveringGenerator for HexGrid {
    fn generate(&self, bbox: &BBox2, n: usize, _starts: &[Vector2<f64>]) -> Result<Vec<Polygon>> {
        if n == 0 {
            return Err(UlamError::InvalidCoveringCount {
                kind: "hex",
                requested: n,
            });
        }
        let r = hex_side(bbox.area() / n as f64);
        let dx = 1.5 * r;
        let dy = SQRT3 * r;
        let cols = (bbox.width() / dx).ceil() as i64 + 1;
        let rows = (bbox.height() / dy).ceil() as i64 + 1;
        debug!(r, cols, rows, requested = n, "hexagon grid");

        let mut cells = Vec::new();
        for i in -1..=cols {
            let shift = if i.rem_euclid(2) == 1 { 0.5 * dy } else { 0.0 };
            for j in -1..=rows {
                let c = Vector2::new(
                    bbox.xmin + i as f64 * dx,
                    bbox.ymin + j as f64 * dy + shift,
                );
                if let Some(cell) = clip_convex_to_bbox(&hexagon(c, r), bbox) {
                    cells.push(cell);
                }
            }
        }
        Ok(cells)
    }
}
