//! Transition matrix with a compile-time lifecycle.
//!
//! Stages: `RawCounted → EmptyRowsRemoved → SccCleaned → Stochasticized`.
//! Every transition consumes the matrix, so a stage is entered once and only
//! from its predecessor. The transitions themselves live in `clean`.
//!
//! Storage is the count matrix. Probabilities are row-normalised counts, which
//! is the same as redistributing mass sent to removed states proportionally over
//! the surviving entries of the row.

use std::marker::PhantomData;

use nalgebra::DMatrix;

use super::counts::TransitionCounts;

#[derive(Clone, Copy, Debug)]
pub struct RawCounted;
#[derive(Clone, Copy, Debug)]
pub struct EmptyRowsRemoved;
#[derive(Clone, Copy, Debug)]
pub struct SccCleaned;
#[derive(Clone, Copy, Debug)]
pub struct Stochasticized;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::RawCounted {}
    impl Sealed for super::EmptyRowsRemoved {}
    impl Sealed for super::SccCleaned {}
    impl Sealed for super::Stochasticized {}
}

pub trait Stage: sealed::Sealed {
    const NAME: &'static str;
}

impl Stage for RawCounted {
    const NAME: &'static str = "raw_counted";
}
impl Stage for EmptyRowsRemoved {
    const NAME: &'static str = "empty_rows_removed";
}
impl Stage for SccCleaned {
    const NAME: &'static str = "scc_cleaned";
}
impl Stage for Stochasticized {
    const NAME: &'static str = "stochasticized";
}

/// Identity of a row/column: a covering cell (by covering index) or nirvana.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateId {
    Cell(usize),
    Nirvana,
}

impl StateId {
    #[inline]
    pub fn cell(self) -> Option<usize> {
        match self {
            StateId::Cell(i) => Some(i),
            StateId::Nirvana => None,
        }
    }
}

/// A state taken out of the chain, with the number of trajectories that started in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removed {
    pub state: StateId,
    pub observed: u64,
}

#[derive(Clone, Debug)]
pub struct TransitionMatrix<S: Stage> {
    pub(crate) counts: DMatrix<f64>,
    pub(crate) states: Vec<StateId>,
    pub(crate) observed: Vec<u64>,
    pub(crate) _stage: PhantomData<S>,
}

impl TransitionMatrix<RawCounted> {
    pub fn from_counts(counts: &TransitionCounts) -> Self {
        let states = (0..counts.n_cells())
            .map(StateId::Cell)
            .chain(std::iter::once(StateId::Nirvana))
            .collect();
        Self {
            counts: counts.to_dense(),
            states,
            observed: counts.row_sums(),
            _stage: PhantomData,
        }
    }
}

impl<S: Stage> TransitionMatrix<S> {
    #[inline]
    pub fn stage(&self) -> &'static str {
        S::NAME
    }

    #[inline]
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// Trajectories that started in each state (before any cleaning).
    #[inline]
    pub fn observed(&self) -> &[u64] {
        &self.observed
    }

    #[inline]
    pub fn counts(&self) -> &DMatrix<f64> {
        &self.counts
    }

    pub fn nirvana_index(&self) -> Option<usize> {
        self.states.iter().position(|s| *s == StateId::Nirvana)
    }

    /// Rows with no outgoing mass.
    pub fn zero_rows(&self) -> Vec<usize> {
        (0..self.n_states())
            .filter(|&i| self.counts.row(i).sum() <= 0.0)
            .collect()
    }

    /// Row-normalised counts; zero rows stay zero.
    pub fn probabilities(&self) -> DMatrix<f64> {
        let mut p = self.counts.clone();
        for mut row in p.row_iter_mut() {
            let s = row.sum();
            if s > 0.0 {
                row /= s;
            }
        }
        p
    }

    /// Drop the given positions (rows and columns), returning what was removed.
    pub(crate) fn remove(&mut self, positions: &[usize]) -> Vec<Removed> {
        if positions.is_empty() {
            return Vec::new();
        }
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let removed = sorted
            .iter()
            .map(|&i| Removed {
                state: self.states[i],
                observed: self.observed[i],
            })
            .collect();
        let counts = std::mem::replace(&mut self.counts, DMatrix::zeros(0, 0));
        self.counts = counts.remove_rows_at(&sorted).remove_columns_at(&sorted);
        for &i in sorted.iter().rev() {
            self.states.remove(i);
            self.observed.remove(i);
        }
        removed
    }

    pub(crate) fn into_stage<T: Stage>(self) -> TransitionMatrix<T> {
        TransitionMatrix {
            counts: self.counts,
            states: self.states,
            observed: self.observed,
            _stage: PhantomData,
        }
    }
}

impl TransitionMatrix<Stochasticized> {
    /// Final row-stochastic matrix.
    pub fn into_probabilities(self) -> (DMatrix<f64>, Vec<StateId>, Vec<u64>) {
        let p = self.probabilities();
        (p, self.states, self.observed)
    }
}
