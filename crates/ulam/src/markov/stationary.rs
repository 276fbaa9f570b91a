//! Stationary distribution of a row-stochastic matrix.
//!
//! Power iteration on the lazy chain `(P + I) / 2`: same fixed point as `P`, but
//! aperiodic, so the iteration converges for every irreducible chain. The
//! product `π P` runs over a sparse column view of `P`.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::config::EigenCfg;
use crate::error::{Result, UlamError};

/// Left eigenvector of `p` for eigenvalue 1, non-negative and summing to one.
pub fn stationary_distribution(p: &DMatrix<f64>, cfg: &EigenCfg) -> Result<DVector<f64>> {
    let n = p.nrows();
    if n == 0 {
        return Ok(DVector::zeros(0));
    }
    // cols[j] = nonzero (i, p_ij)
    let cols: Vec<Vec<(usize, f64)>> = (0..n)
        .map(|j| {
            p.column(j)
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0.0)
                .map(|(i, &v)| (i, v))
                .collect()
        })
        .collect();

    let mut pi = vec![1.0 / n as f64; n];
    let mut next = vec![0.0; n];
    let mut residual = f64::INFINITY;
    for it in 1..=cfg.max_iter {
        for (j, col) in cols.iter().enumerate() {
            let flow: f64 = col.iter().map(|&(i, v)| pi[i] * v).sum();
            next[j] = 0.5 * (pi[j] + flow);
        }
        let total: f64 = next.iter().sum();
        if total > 0.0 {
            next.iter_mut().for_each(|x| *x /= total);
        }
        residual = pi.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut pi, &mut next);
        if residual < cfg.tol {
            debug!(iterations = it, residual, "stationary distribution converged");
            return Ok(DVector::from_vec(pi));
        }
    }
    Err(UlamError::EigenNonConvergence {
        iterations: cfg.max_iter,
        residual,
    })
}
