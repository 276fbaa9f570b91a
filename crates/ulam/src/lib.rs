//! Ulam's method: discretize a 2D stochastic system into a finite Markov chain.
//!
//! Pipeline
//! - Cover the domain's bounding rectangle (squares, hexagons or k-means Voronoi
//!   cells) and clip the cells to the domain (`covering`).
//! - Classify every trajectory start and end point against the covering, with an
//!   absorbing outside state called nirvana (`classify`).
//! - Count transitions, drop unvisited and disconnected cells, close the chain
//!   with a reinjection policy, and compute its stationary distribution (`markov`).
//!
//! `run_ulam_method` in `pipeline` runs everything; the stages are public for
//! callers that need the intermediate products.
//!
//! API Policy
//! - Project-internal; no stable public API. Prefer `api` or `prelude` imports.

pub mod api;
pub mod classify;
pub mod config;
pub mod covering;
pub mod domain;
pub mod error;
pub mod geom2;
pub mod markov;
pub mod pipeline;
pub mod poly_table;
pub mod trajectories;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::UlamCfg;
pub use error::{Result, UlamError};
pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::classify::{classify, Classification, Classify, CoveringIndex, Label};
    pub use crate::config::{CoveringKind, ReinjectionKind, ReinjectionRegion, UlamCfg};
    pub use crate::covering::{build_covering, Covering};
    pub use crate::domain::Domain;
    pub use crate::error::{Result, UlamError};
    pub use crate::geom2::{BBox2, GeomCfg, Polygon};
    pub use crate::pipeline::{run_ulam_method, UlamInfo, UlamResult};
    pub use crate::poly_table::PolyTable;
    pub use crate::trajectories::Trajectories;
    pub use nalgebra::Vector2 as Vec2;
}
