//! Stochasticization policies for the nirvana row.
//!
//! A policy turns the observed nirvana row into reinjection weights over the
//! current states. The graph cleaner uses the same weights as nirvana's
//! out-edges, so cleaning and the final nirvana row always agree.

use std::collections::BTreeSet;

use nalgebra::Vector2;
use tracing::info;

use super::matrix::StateId;
use crate::classify::{classify, CoveringIndex, Label};
use crate::config::{ReinjectionKind, ReinjectionRegion};
use crate::covering::Covering;
use crate::domain::Domain;
use crate::error::{Result, UlamError};
use crate::geom2::intersects;

pub trait Reinjection: Sync {
    fn name(&self) -> &'static str;

    /// Non-negative weight per state in `states`; nirvana's own entry is zero.
    /// `observed` is the nirvana row of the count matrix, aligned with `states`.
    fn weights(&self, observed: &[f64], states: &[StateId]) -> Vec<f64>;
}

/// Reinject where outside→inside trajectories were observed to land.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataReinjection;

impl Reinjection for DataReinjection {
    fn name(&self) -> &'static str {
        "data"
    }

    fn weights(&self, observed: &[f64], states: &[StateId]) -> Vec<f64> {
        observed
            .iter()
            .zip(states)
            .map(|(&w, s)| if *s == StateId::Nirvana { 0.0 } else { w })
            .collect()
    }
}

/// Uniform reinjection over a fixed set of covering cells.
#[derive(Clone, Debug)]
pub struct SourceReinjection {
    /// `None` targets every cell.
    targets: Option<BTreeSet<usize>>,
}

impl SourceReinjection {
    pub fn everywhere() -> Self {
        Self { targets: None }
    }

    pub fn from_targets(targets: impl IntoIterator<Item = usize>) -> Result<Self> {
        let targets: BTreeSet<usize> = targets.into_iter().collect();
        if targets.is_empty() {
            return Err(UlamError::EmptyReinjectionTarget);
        }
        Ok(Self {
            targets: Some(targets),
        })
    }

    /// Cells overlapping a polygon region, or containing at least one region point.
    pub fn from_region(
        region: &ReinjectionRegion,
        covering: &Covering,
        domain: &Domain,
    ) -> Result<Self> {
        let targets: Vec<usize> = match region {
            ReinjectionRegion::Polygon(poly) => {
                let geom = &domain.cfg().geom;
                covering
                    .polygons()
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| intersects(cell, poly, geom))
                    .map(|(i, _)| i)
                    .collect()
            }
            ReinjectionRegion::Points(points) => {
                let pts: Vec<Vector2<f64>> =
                    points.iter().map(|p| Vector2::new(p[0], p[1])).collect();
                let index = CoveringIndex::new(covering, domain);
                classify(&pts, &index)
                    .labels
                    .into_iter()
                    .filter_map(|l| match l {
                        Label::Inside(i) => Some(i),
                        Label::Nirvana => None,
                    })
                    .collect()
            }
        };
        info!(n_targets = targets.len(), "source reinjection targets");
        Self::from_targets(targets)
    }

    pub fn targets(&self) -> Option<&BTreeSet<usize>> {
        self.targets.as_ref()
    }

    fn is_target(&self, cell: usize) -> bool {
        self.targets.as_ref().map_or(true, |t| t.contains(&cell))
    }
}

impl Reinjection for SourceReinjection {
    fn name(&self) -> &'static str {
        "source"
    }

    fn weights(&self, _observed: &[f64], states: &[StateId]) -> Vec<f64> {
        states
            .iter()
            .map(|s| match s.cell() {
                Some(i) if self.is_target(i) => 1.0,
                _ => 0.0,
            })
            .collect()
    }
}

/// Strategy for the configured policy. Source targets are resolved here, before
/// any trajectory is classified.
pub fn reinjection_for(
    kind: &ReinjectionKind,
    covering: &Covering,
    domain: &Domain,
) -> Result<Box<dyn Reinjection>> {
    Ok(match kind {
        ReinjectionKind::Data => Box::new(DataReinjection),
        ReinjectionKind::Source(None) => Box::new(SourceReinjection::everywhere()),
        ReinjectionKind::Source(Some(region)) => {
            Box::new(SourceReinjection::from_region(region, covering, domain)?)
        }
    })
}
