//! 2D geometry kernel: polygons, point location, clipping.
//!
//! Purpose
//! - Everything the covering, clipping and classification stages need, and no more:
//!   shoelace area, boundary-inclusive point location, general intersection with a
//!   "largest piece wins" rule, interior-overlap tests, convex half-plane cells.
//!
//! Policies (named so they can be tested in isolation)
//! - `locate`: points within `GeomCfg::eps_edge` of an edge are on the boundary,
//!   and the boundary belongs to the polygon.
//! - `largest_piece`: when clipping yields a multipolygon, the largest-area piece
//!   is kept; ties go to the first piece.
//! - `intersects`: touching along edges or at vertices is not an intersection.
//!
//! Non-convex clipping goes through `geo`'s boolean operations; convex cells
//! (Voronoi, hexagon-vs-rectangle) go through `HalfPlanes`.

mod bbox;
mod clip;
mod halfplane;
mod polygon;
mod types;

pub use bbox::BBox2;
pub use clip::{clip_convex_to_bbox, covers, intersect, intersects, largest_piece};
pub(crate) use clip::dedup_ring;
pub use halfplane::{HalfPlanes, HalfplaneIntersection};
pub use polygon::{locate, Location, Polygon};
pub use types::{GeomCfg, Hs2};
