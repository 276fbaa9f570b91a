//! End-to-end Ulam's method and the result bundle.
//!
//! Stages: covering → reinjection targets → classification of start and end
//! points → counts → cleaning → stochasticization → stationary distribution.
//! Configuration problems surface before the first point is classified.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::{classify, CoveringIndex};
use crate::config::CoveringKind;
use crate::covering::build_covering;
use crate::domain::Domain;
use crate::error::Result;
use crate::geom2::Polygon;
use crate::markov::{
    clean_and_stochasticize, reinjection_for, stationary_distribution, Removed, StateId,
    TransitionCounts,
};
use crate::trajectories::Trajectories;

/// Diagnostics that travel with the result.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UlamInfo {
    pub poly_type: CoveringKind,
    /// Requested polygon count.
    pub poly_number: usize,
    /// Polygons in the final chain.
    pub n_polys: usize,
    pub rseed: u64,
    pub stoc_type: String,
    pub n_cells_generated: usize,
    /// Cells lost to domain clipping.
    pub n_cells_dropped: usize,
    pub n_tie_breaks_start: usize,
    pub n_tie_breaks_end: usize,
    /// Cells removed for having no outgoing observations.
    pub n_removed_empty: usize,
    /// Cells removed by the strongly-connected-component pass.
    pub n_disconnected: usize,
    pub n_traj: usize,
    /// Trajectories touching a state that did not survive cleaning.
    pub n_traj_discarded: usize,
}

/// Everything the caller gets back. The last row/column of `p_closed` is
/// nirvana whenever nirvana survived cleaning.
#[derive(Clone, Debug)]
pub struct UlamResult {
    pub p_closed: DMatrix<f64>,
    pub pi_closed: DVector<f64>,
    pub polys: Vec<Polygon>,
    pub polys_dis: Vec<Polygon>,
    /// Trajectories starting in each of `polys`.
    pub counts: Vec<u64>,
    pub counts_dis: Vec<u64>,
    pub info: UlamInfo,
}

impl UlamResult {
    #[inline]
    pub fn has_nirvana(&self) -> bool {
        self.p_closed.nrows() > self.polys.len()
    }

    /// Transitions between polygons only; rows that lost mass to nirvana are
    /// sub-stochastic.
    pub fn p_open(&self) -> DMatrix<f64> {
        let n = self.polys.len();
        self.p_closed.view((0, 0), (n, n)).into_owned()
    }

    /// Stationary distribution restricted to the polygons, renormalised.
    pub fn pi_open(&self) -> DVector<f64> {
        let n = self.polys.len();
        let pi = self.pi_closed.rows(0, n).into_owned();
        let s = pi.sum();
        if s > 0.0 {
            pi / s
        } else {
            pi
        }
    }
}

/// Run Ulam's method on `trajectories` over `domain`.
pub fn run_ulam_method(trajectories: &Trajectories, domain: &Domain) -> Result<UlamResult> {
    let cfg = domain.cfg();
    info!(
        n_traj = trajectories.len(),
        kind = %cfg.covering,
        poly_number = cfg.poly_number(),
        stoc_type = cfg.reinjection.as_str(),
        "running Ulam's method"
    );
    let covering = build_covering(trajectories, domain)?;
    let reinjection = reinjection_for(&cfg.reinjection, &covering, domain)?;

    let index = CoveringIndex::new(&covering, domain);
    let starts = classify(trajectories.start(), &index);
    let ends = classify(trajectories.end(), &index);
    let ties = starts.tie_breaks + ends.tie_breaks;
    if ties > 0 {
        warn!(
            start = starts.tie_breaks,
            end = ends.tie_breaks,
            "interior points assigned to the nearest centroid"
        );
    }
    info!(
        start_nirvana = starts.n_nirvana(),
        end_nirvana = ends.n_nirvana(),
        "trajectories classified"
    );

    let n_cells = covering.len();
    let counts = TransitionCounts::from_labels(&starts.labels, &ends.labels, n_cells);
    let chain = clean_and_stochasticize(&counts, reinjection.as_ref())?;
    let removed_empty = chain
        .removed_empty
        .iter()
        .filter(|r| r.state != StateId::Nirvana)
        .count();
    let disconnected = chain.disconnected;
    let (p_closed, states, observed) = chain.matrix.into_probabilities();
    let pi_closed = stationary_distribution(&p_closed, &cfg.eigen)?;

    let mut alive = vec![false; n_cells + 1];
    for s in &states {
        alive[state_position(*s, n_cells)] = true;
    }
    let n_traj_discarded = starts
        .labels
        .iter()
        .zip(&ends.labels)
        .filter(|(s, e)| !alive[s.state(n_cells)] || !alive[e.state(n_cells)])
        .count();

    let (polys, counts_kept) = cells_of(&states, &observed, &covering.polygons);
    let (dis_states, dis_observed): (Vec<StateId>, Vec<u64>) = disconnected
        .iter()
        .map(|Removed { state, observed }| (*state, *observed))
        .unzip();
    let (polys_dis, counts_dis) = cells_of(&dis_states, &dis_observed, &covering.polygons);

    let info = UlamInfo {
        poly_type: cfg.covering,
        poly_number: cfg.poly_number(),
        n_polys: polys.len(),
        rseed: cfg.rseed,
        stoc_type: cfg.reinjection.as_str().to_string(),
        n_cells_generated: covering.n_generated,
        n_cells_dropped: covering.n_dropped,
        n_tie_breaks_start: starts.tie_breaks,
        n_tie_breaks_end: ends.tie_breaks,
        n_removed_empty: removed_empty,
        n_disconnected: polys_dis.len(),
        n_traj: trajectories.len(),
        n_traj_discarded,
    };
    info!(
        n_polys = info.n_polys,
        n_disconnected = info.n_disconnected,
        n_traj_discarded,
        has_nirvana = p_closed.nrows() > polys.len(),
        "Ulam's method finished"
    );
    Ok(UlamResult {
        p_closed,
        pi_closed,
        polys,
        polys_dis,
        counts: counts_kept,
        counts_dis,
        info,
    })
}

#[inline]
fn state_position(s: StateId, n_cells: usize) -> usize {
    match s {
        StateId::Cell(i) => i,
        StateId::Nirvana => n_cells,
    }
}

/// Polygons and counts for the cell states, in state order (nirvana skipped).
fn cells_of(states: &[StateId], observed: &[u64], polygons: &[Polygon]) -> (Vec<Polygon>, Vec<u64>) {
    states
        .iter()
        .zip(observed)
        .filter_map(|(s, &c)| s.cell().map(|i| (polygons[i].clone(), c)))
        .unzip()
}

#[cfg(test)]
mod tests;
