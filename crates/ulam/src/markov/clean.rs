//! Graph cleaning and stochasticization (the matrix stage transitions).
//!
//! Pass 1 (`remove_empty_rows`): cells with no outgoing observations leave the
//! chain. Nirvana leaves only if its reinjection weights are all zero.
//!
//! Pass 2 (`keep_dominant_scc`), repeated until nothing changes:
//! - Edges are positive counts; nirvana's out-edges are its reinjection weights.
//! - Keep nirvana's component if nirvana is still present and the component
//!   holds a cell, otherwise the largest closed component (ties to the one with
//!   the smallest position). A component is closed if it carries an edge.
//! - Everything else is removed and reported as disconnected.
//!
//! Removing states renormalises the remaining rows; a row left without mass is
//! removed on the next round.

use tracing::{debug, info, warn};

use super::matrix::{
    EmptyRowsRemoved, RawCounted, Removed, SccCleaned, Stage, StateId, Stochasticized,
    TransitionMatrix,
};
use super::reinjection::Reinjection;
use crate::error::{Result, UlamError};

impl<S: Stage> TransitionMatrix<S> {
    /// Reinjection weights for the current states (empty if nirvana is gone).
    fn nirvana_weights(&self, reinjection: &dyn Reinjection) -> Vec<f64> {
        match self.nirvana_index() {
            Some(k) => {
                let observed: Vec<f64> = self.counts.row(k).iter().copied().collect();
                reinjection.weights(&observed, &self.states)
            }
            None => Vec::new(),
        }
    }

    /// Out-neighbours of every state.
    fn adjacency(&self, reinjection: &dyn Reinjection) -> Vec<Vec<usize>> {
        let nirvana = self.nirvana_index();
        let weights = self.nirvana_weights(reinjection);
        (0..self.n_states())
            .map(|i| {
                if Some(i) == nirvana {
                    positive(&weights)
                } else {
                    positive(self.counts.row(i).iter())
                }
            })
            .collect()
    }

    fn has_cell(&self) -> bool {
        self.states.iter().any(|s| matches!(s, StateId::Cell(_)))
    }
}

fn positive<'a>(row: impl IntoIterator<Item = &'a f64>) -> Vec<usize> {
    row.into_iter()
        .enumerate()
        .filter(|&(_, &w)| w > 0.0)
        .map(|(j, _)| j)
        .collect()
}

impl TransitionMatrix<RawCounted> {
    pub fn remove_empty_rows(
        mut self,
        reinjection: &dyn Reinjection,
    ) -> Result<(TransitionMatrix<EmptyRowsRemoved>, Vec<Removed>)> {
        let nirvana = self.nirvana_index();
        let nirvana_idle = self.nirvana_weights(reinjection).iter().all(|&w| w <= 0.0);
        let empty: Vec<usize> = (0..self.n_states())
            .filter(|&i| {
                if Some(i) == nirvana {
                    nirvana_idle
                } else {
                    self.observed[i] == 0
                }
            })
            .collect();
        if nirvana.is_some() && nirvana_idle {
            warn!(policy = reinjection.name(), "nirvana has no reinjection mass and is removed");
        }
        let removed = self.remove(&empty);
        if !self.has_cell() {
            return Err(UlamError::AllStatesRemoved {
                stage: EmptyRowsRemoved::NAME,
            });
        }
        info!(
            n_removed = removed.len(),
            n_states = self.n_states(),
            "empty rows removed"
        );
        Ok((self.into_stage(), removed))
    }
}

impl TransitionMatrix<EmptyRowsRemoved> {
    pub fn keep_dominant_scc(
        mut self,
        reinjection: &dyn Reinjection,
    ) -> Result<(TransitionMatrix<SccCleaned>, Vec<Removed>)> {
        let mut disconnected = Vec::new();
        let mut rounds = 0usize;
        loop {
            rounds += 1;
            let adj = self.adjacency(reinjection);
            let comps = tarjan_scc(&adj);
            let Some(keep) = pick_component(&comps, &adj, self.nirvana_index(), &self.states)
            else {
                return Err(UlamError::AllStatesRemoved {
                    stage: SccCleaned::NAME,
                });
            };
            debug!(
                round = rounds,
                n_components = comps.len(),
                kept = keep.len(),
                "strongly connected components"
            );
            if keep.len() == self.n_states() {
                break;
            }
            let mut inside = vec![false; self.n_states()];
            for &i in keep {
                inside[i] = true;
            }
            let drop: Vec<usize> = (0..self.n_states()).filter(|&i| !inside[i]).collect();
            disconnected.extend(self.remove(&drop));
        }
        info!(
            n_disconnected = disconnected.len(),
            n_states = self.n_states(),
            has_nirvana = self.nirvana_index().is_some(),
            "largest strongly connected component kept"
        );
        Ok((self.into_stage(), disconnected))
    }
}

impl TransitionMatrix<SccCleaned> {
    /// Replace the nirvana row by the policy's weights. Rows are normalised on
    /// read, so the stored weights need not sum to one.
    pub fn stochasticize(
        mut self,
        reinjection: &dyn Reinjection,
    ) -> Result<TransitionMatrix<Stochasticized>> {
        if let Some(k) = self.nirvana_index() {
            let w = self.nirvana_weights(reinjection);
            if w.iter().sum::<f64>() <= 0.0 {
                return Err(UlamError::EmptyReinjectionTarget);
            }
            for (j, wj) in w.into_iter().enumerate() {
                self.counts[(k, j)] = wj;
            }
        }
        Ok(self.into_stage())
    }
}

/// The component to keep, or `None` if no component carries an edge.
fn pick_component<'a>(
    comps: &'a [Vec<usize>],
    adj: &[Vec<usize>],
    nirvana: Option<usize>,
    states: &[StateId],
) -> Option<&'a Vec<usize>> {
    let closed = |c: &Vec<usize>| c.len() > 1 || adj[c[0]].contains(&c[0]);
    if let Some(k) = nirvana {
        if let Some(c) = comps.iter().find(|c| c.contains(&k)) {
            if c.len() > 1 && c.iter().any(|&i| matches!(states[i], StateId::Cell(_))) {
                return Some(c);
            }
        }
    }
    comps
        .iter()
        .filter(|&c| closed(c))
        .filter(|c| c.iter().any(|&i| matches!(states[i], StateId::Cell(_))))
        .fold(None, |best: Option<&Vec<usize>>, c| match best {
            Some(b) if (b.len(), std::cmp::Reverse(b[0])) >= (c.len(), std::cmp::Reverse(c[0])) => {
                Some(b)
            }
            _ => Some(c),
        })
}

/// Strongly connected components (Tarjan, iterative). Each component is sorted.
pub fn tarjan_scc(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    const UNSEEN: usize = usize::MAX;
    let n = adj.len();
    let mut index = vec![UNSEEN; n];
    let mut low = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut comps = Vec::new();
    let mut next = 0usize;

    for root in 0..n {
        if index[root] != UNSEEN {
            continue;
        }
        // (vertex, position in its adjacency list)
        let mut call: Vec<(usize, usize)> = vec![(root, 0)];
        index[root] = next;
        low[root] = next;
        next += 1;
        stack.push(root);
        on_stack[root] = true;

        while let Some(&(v, pos)) = call.last() {
            if let Some(&w) = adj[v].get(pos) {
                let top = call.len() - 1;
                call[top].1 += 1;
                if index[w] == UNSEEN {
                    index[w] = next;
                    low[w] = next;
                    next += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    call.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }
            call.pop();
            if let Some(&(parent, _)) = call.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] == index[v] {
                let mut comp = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    comp.push(w);
                    if w == v {
                        break;
                    }
                }
                comp.sort_unstable();
                comps.push(comp);
            }
        }
    }
    comps
}
