//! Sparse transition counting.

use std::collections::HashMap;

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::classify::Label;

/// `(from, to) -> count` over `n_cells + 1` states; nirvana is state `n_cells`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionCounts {
    n_cells: usize,
    counts: HashMap<(usize, usize), u64>,
}

impl TransitionCounts {
    pub fn new(n_cells: usize) -> Self {
        Self {
            n_cells,
            counts: HashMap::new(),
        }
    }

    /// Count `starts[k] -> ends[k]` for every `k`. Workers fold into local maps
    /// that are summed at the end; the result does not depend on the split.
    pub fn from_labels(starts: &[Label], ends: &[Label], n_cells: usize) -> Self {
        let counts = starts
            .par_iter()
            .zip(ends.par_iter())
            .fold(HashMap::new, |mut acc: HashMap<(usize, usize), u64>, (s, e)| {
                *acc.entry((s.state(n_cells), e.state(n_cells))).or_insert(0) += 1;
                acc
            })
            .reduce(HashMap::new, |mut a, b| {
                for (k, v) in b {
                    *a.entry(k).or_insert(0) += v;
                }
                a
            });
        Self { n_cells, counts }
    }

    pub fn increment(&mut self, from: Label, to: Label) {
        let key = (from.state(self.n_cells), to.state(self.n_cells));
        *self.counts.entry(key).or_insert(0) += 1;
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// Cells plus nirvana.
    #[inline]
    pub fn n_states(&self) -> usize {
        self.n_cells + 1
    }

    #[inline]
    pub fn nirvana(&self) -> usize {
        self.n_cells
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u64 {
        self.counts.get(&(from, to)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of trajectories starting in each state.
    pub fn row_sums(&self) -> Vec<u64> {
        let mut out = vec![0; self.n_states()];
        for (&(i, _), &c) in &self.counts {
            out[i] += c;
        }
        out
    }

    /// Nonzero entries in row-major order.
    pub fn entries(&self) -> Vec<((usize, usize), u64)> {
        let mut v: Vec<_> = self.counts.iter().map(|(&k, &c)| (k, c)).collect();
        v.sort_unstable();
        v
    }

    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.n_states();
        let mut m = DMatrix::zeros(n, n);
        for (&(i, j), &c) in &self.counts {
            m[(i, j)] = c as f64;
        }
        m
    }
}
