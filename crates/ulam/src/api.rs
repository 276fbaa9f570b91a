//! Curated internal API (UNSTABLE).
//!
//! A convenience surface for the binary, benches and demos. Breaking changes are
//! allowed.

// Entry points
pub use crate::classify::classify;
pub use crate::covering::build_covering;
pub use crate::pipeline::run_ulam_method;

// Data model and configuration
pub use crate::config::{
    CoveringKind, EigenCfg, KMeansCfg, ReinjectionKind, ReinjectionRegion, UlamCfg,
    DEFAULT_RSEED,
};
pub use crate::domain::Domain;
pub use crate::error::{ErrorCategory, Result, UlamError};
pub use crate::trajectories::Trajectories;

// Geometry policies
pub use crate::geom2::{
    covers, intersect, intersects, largest_piece, locate, BBox2, GeomCfg, Location, Polygon,
};

// Coverings
pub use crate::covering::{
    clip_to_domain, CoveringGenerator, HexGrid, SquareGrid, VoronoiTessellation,
};

// Markov chain
pub use crate::classify::{Classification, Classify, CoveringIndex, Label};
pub use crate::markov::{
    clean_and_stochasticize, stationary_distribution, DataReinjection, Reinjection,
    SourceReinjection, StateId, TransitionCounts, TransitionMatrix,
};

// Results
pub use nalgebra::{DMatrix, DVector};
pub use crate::pipeline::{UlamInfo, UlamResult};
pub use crate::poly_table::PolyTable;
