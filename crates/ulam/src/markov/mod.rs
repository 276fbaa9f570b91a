//! Markov chain assembly: counting, cleaning, stochasticization.
//!
//! Purpose
//! - Turn per-trajectory labels into a closed, row-stochastic chain on the
//!   surviving covering cells plus (usually) nirvana.
//!
//! Invariants
//! - Nirvana is the last state of the raw count matrix.
//! - After `keep_dominant_scc` the state graph is one strongly connected component.
//! - After `stochasticize` every row sums to one.
//!
//! References
//! - Lifecycle and removal rules: `matrix`, `clean`.
//! - Reinjection policies: `reinjection`.

mod clean;
mod counts;
mod matrix;
mod reinjection;
mod stationary;

pub use clean::tarjan_scc;
pub use counts::TransitionCounts;
pub use matrix::{
    EmptyRowsRemoved, RawCounted, Removed, SccCleaned, Stage, StateId, Stochasticized,
    TransitionMatrix,
};
pub use reinjection::{reinjection_for, DataReinjection, Reinjection, SourceReinjection};
pub use stationary::stationary_distribution;

/// Outcome of running all three stages on a count matrix.
#[derive(Clone, Debug)]
pub struct CleanedChain {
    pub matrix: TransitionMatrix<Stochasticized>,
    pub removed_empty: Vec<Removed>,
    pub disconnected: Vec<Removed>,
}

/// `RawCounted → EmptyRowsRemoved → SccCleaned → Stochasticized` in one call.
pub fn clean_and_stochasticize(
    counts: &TransitionCounts,
    reinjection: &dyn Reinjection,
) -> crate::error::Result<CleanedChain> {
    let raw = TransitionMatrix::from_counts(counts);
    let (pruned, removed_empty) = raw.remove_empty_rows(reinjection)?;
    let (scc, disconnected) = pruned.keep_dominant_scc(reinjection)?;
    let matrix = scc.stochasticize(reinjection)?;
    Ok(CleanedChain {
        matrix,
        removed_empty,
        disconnected,
    })
}

#[cfg(test)]
mod tests;
