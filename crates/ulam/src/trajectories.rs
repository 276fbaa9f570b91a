//! One-step trajectories as paired start/end points.
//!
//! Non-finite coordinates are kept; they classify as nirvana.

use nalgebra::Vector2;

use crate::error::{Result, UlamError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectories {
    start: Vec<Vector2<f64>>,
    end: Vec<Vector2<f64>>,
}

impl Trajectories {
    /// Build from the four coordinate columns, which must have equal length.
    pub fn new(x0: &[f64], y0: &[f64], xt: &[f64], yt: &[f64]) -> Result<Self> {
        let n = x0.len();
        if y0.len() != n || xt.len() != n || yt.len() != n {
            return Err(UlamError::TrajectoryLengthMismatch {
                x0: x0.len(),
                y0: y0.len(),
                xt: xt.len(),
                yt: yt.len(),
            });
        }
        let zip = |xs: &[f64], ys: &[f64]| -> Vec<Vector2<f64>> {
            xs.iter()
                .zip(ys)
                .map(|(&x, &y)| Vector2::new(x, y))
                .collect()
        };
        Ok(Self {
            start: zip(x0, y0),
            end: zip(xt, yt),
        })
    }

    pub fn from_points(start: Vec<Vector2<f64>>, end: Vec<Vector2<f64>>) -> Result<Self> {
        if start.len() != end.len() {
            return Err(UlamError::TrajectoryLengthMismatch {
                x0: start.len(),
                y0: start.len(),
                xt: end.len(),
                yt: end.len(),
            });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> &[Vector2<f64>] {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &[Vector2<f64>] {
        &self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.start.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.is_empty()
    }
}
