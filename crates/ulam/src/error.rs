//! Error type shared by the whole pipeline.
//!
//! Only fatal conditions live here. Local geometric degeneracies (zero-area
//! clipped cells, boundary ties during classification) are resolved by the
//! rules in `geom2`/`classify` and surface as counters in `UlamInfo`.

use thiserror::Error;

/// Coarse grouping of errors, mirroring when they can occur.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected before any trajectory is classified.
    Configuration,
    /// No valid Markov chain can be built from the data.
    DataConsistency,
    /// The stationary-distribution solve failed.
    Numeric,
}

#[derive(Debug, Error)]
pub enum UlamError {
    #[error("domain polygon is degenerate (area {area:e})")]
    DegenerateDomain { area: f64 },

    #[error("invalid polygon: {reason}")]
    InvalidPolygon { reason: String },

    #[error("invalid covering: {kind} with {requested} polygons")]
    InvalidCoveringCount { kind: &'static str, requested: usize },

    #[error("voronoi covering needs {needed} start points inside the bounding box, found {found}")]
    InsufficientStartPoints { needed: usize, found: usize },

    #[error("trajectory columns differ in length (x0={x0}, y0={y0}, xT={xt}, yT={yt})")]
    TrajectoryLengthMismatch {
        x0: usize,
        y0: usize,
        xt: usize,
        yt: usize,
    },

    #[error("source reinjection region does not reach any covering polygon")]
    EmptyReinjectionTarget,

    #[error("no covering polygon survives clipping to the domain")]
    EmptyCovering,

    #[error("graph cleaning removed every state ({stage})")]
    AllStatesRemoved { stage: &'static str },

    #[error("stationary distribution did not converge after {iterations} iterations (residual {residual:e})")]
    EigenNonConvergence { iterations: usize, residual: f64 },
}

impl UlamError {
    pub(crate) fn invalid_polygon(reason: impl Into<String>) -> Self {
        Self::InvalidPolygon {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DegenerateDomain { .. }
            | Self::InvalidPolygon { .. }
            | Self::InvalidCoveringCount { .. }
            | Self::InsufficientStartPoints { .. }
            | Self::TrajectoryLengthMismatch { .. }
            | Self::EmptyReinjectionTarget => ErrorCategory::Configuration,
            Self::EmptyCovering | Self::AllStatesRemoved { .. } => ErrorCategory::DataConsistency,
            Self::EigenNonConvergence { .. } => ErrorCategory::Numeric,
        }
    }
}

pub type Result<T> = std::result::Result<T, UlamError>;
