//! Square grid over the bounding rectangle.

use nalgebra::Vector2;
use tracing::debug;

use super::CoveringGenerator;
use crate::error::{Result, UlamError};
use crate::geom2::{BBox2, Polygon};

/// Squares of equal side laid from the lower-left corner; the top row is cut at
/// the rectangle edge so the cells tile the rectangle exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct SquareGrid;

/// Column/row split whose cell count is closest to `n` (ties to fewer columns).
///
/// Returns `(nx, ny, side)`.
pub(crate) fn grid_split(width: f64, height: f64, n: usize) -> (usize, usize, f64) {
    let mut best = (1, 1, width, usize::MAX);
    for nx in 1..=n.max(1) {
        let side = width / nx as f64;
        let ny = rows_for(height, side);
        let diff = (nx * ny).abs_diff(n);
        if diff < best.3 {
            best = (nx, ny, side, diff);
        }
        // nx * ny grows strictly with nx.
        if nx * ny >= n {
            break;
        }
    }
    (best.0, best.1, best.2)
}

/// Rows needed to span `height` with squares of side `side`; a remainder below
/// one part in 1e9 of a cell does not open a new row.
fn rows_for(height: f64, side: f64) -> usize {
    let r = height / side;
    ((r - 1e-9).ceil() as usize).max(1)
}

impl CoveringGenerator for SquareGrid {
    fn generate(&self, bbox: &BBox2, n: usize, _starts: &[Vector2<f64>]) -> Result<Vec<Polygon>> {
        if n == 0 {
            return Err(UlamError::InvalidCoveringCount {
                kind: "sqr",
                requested: n,
            });
        }
        let (nx, ny, side) = grid_split(bbox.width(), bbox.height(), n);
        debug!(nx, ny, side, requested = n, "square grid split");
        let mut cells = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            let y0 = bbox.ymin + j as f64 * side;
            let y1 = if j + 1 == ny {
                bbox.ymax
            } else {
                bbox.ymin + (j + 1) as f64 * side
            };
            for i in 0..nx {
                let x0 = bbox.xmin + i as f64 * side;
                let x1 = if i + 1 == nx {
                    bbox.xmax
                } else {
                    bbox.xmin + (i + 1) as f64 * side
                };
                cells.push(Polygon::rectangle(x0, x1, y0, y1)?);
            }
        }
        Ok(cells)
    }
}
