//! Batch Local Outlier Factor and Local Outlier Probabilities.
//!
//! Both scores compare the density around an element with the density
//! around its k nearest neighbours.
//!
//! ## LOF (Breunig et al., 2000)
//!
//! ```text
//! reach(i, j) = max(d(i,j), k-distance(j))
//! lrd(i)      = k / Σ_{j ∈ kNN(i)} reach(i, j)
//! LOF(i)      = Σ_{j ∈ kNN(i)} lrd(j) / (k · lrd(i))
//! ```
//!
//! Values near 1 mean "as dense as the neighbourhood"; larger values flag
//! outliers. When every reachability distance is zero (duplicated points)
//! the density is infinite and two infinite densities compare as equal.
//!
//! ## LoOP (Kriegel et al., 2009)
//!
//! ```text
//! pdist(i) = λ · sqrt(Σ_{j ∈ kNN(i)} d(i,j)² / k)
//! PLOF(i)  = k · pdist(i) / Σ_{j ∈ kNN(i)} pdist(j) + 1
//! nPLOF    = √2 · λ · n / Σ_i PLOF(i)
//! LoOP(i)  = max(0, erf(PLOF(i) / nPLOF))
//! ```
//!
//! An element whose neighbours all sit at `pdist = 0` while it does not has an
//! infinite PLOF. It scores 1, and `nPLOF` is taken over the finite PLOFs only.
//!
//! Scores lie in `[0, 1]` and grow with outlierness.

use statrs::function::erf::erf;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::neighbors::NeighborList;
use crate::error::{Error, Result};
use crate::matrix::SquareMatrix;

fn validate_k(k: usize) -> Result<()> {
    if k <= 1 {
        return Err(Error::InvalidParameter {
            name: "k",
            message: "must be greater than 1",
        });
    }
    Ok(())
}

fn validate_lambda(lambda: f64) -> Result<()> {
    if !(lambda > 0.0) {
        return Err(Error::InvalidParameter {
            name: "lambda",
            message: "must be positive",
        });
    }
    Ok(())
}

fn validate_size(k: usize, n: usize) -> Result<()> {
    if k >= n {
        return Err(Error::TooFewItems {
            required: k,
            found: n,
        });
    }
    Ok(())
}

/// Square matrix from nested rows, with a dimension error on ragged input.
fn rows_to_matrix(rows: &[Vec<f64>]) -> Result<SquareMatrix> {
    let n = rows.len();
    if let Some(row) = rows.iter().find(|r| r.len() != n) {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: row.len(),
        });
    }
    Ok(SquareMatrix::from_fn(n, |i, j| rows[i][j]))
}

fn row_neighbors(distances: &SquareMatrix, i: usize, k: usize) -> NeighborList {
    let mut list = NeighborList::new(k);
    for (j, d) in distances.row(i).enumerate() {
        if j != i {
            let _ = list.offer(d, j);
        }
    }
    list
}

/// The `k` nearest other elements of every element.
pub fn neighborhoods(distances: &SquareMatrix, k: usize) -> Vec<NeighborList> {
    let n = distances.size();

    #[cfg(feature = "parallel")]
    let lists = (0..n)
        .into_par_iter()
        .map(|i| row_neighbors(distances, i, k))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let lists = (0..n).map(|i| row_neighbors(distances, i, k)).collect();

    lists
}

/// `num / den` where infinite densities compare as equal.
fn density_ratio(num: f64, den: f64) -> f64 {
    if den.is_infinite() {
        if num.is_infinite() {
            1.0
        } else {
            0.0
        }
    } else {
        num / den
    }
}

/// LOF of every element from its neighbour list.
pub(crate) fn lof_from_neighbors(lists: &[NeighborList], k: usize) -> Vec<f64> {
    let lrd: Vec<f64> = lists
        .iter()
        .map(|list| {
            let reach: f64 = list
                .iter()
                .map(|(d, j)| d.max(lists[j].k_distance().unwrap_or(0.0)))
                .sum();
            if reach > 0.0 {
                k as f64 / reach
            } else {
                f64::INFINITY
            }
        })
        .collect();

    lists
        .iter()
        .enumerate()
        .map(|(i, list)| {
            list.iter()
                .map(|(_, j)| density_ratio(lrd[j], lrd[i]))
                .sum::<f64>()
                / k as f64
        })
        .collect()
}

/// LoOP of every element from its neighbour list.
pub(crate) fn loop_from_neighbors(lists: &[NeighborList], k: usize, lambda: f64) -> Vec<f64> {
    let pdist: Vec<f64> = lists
        .iter()
        .map(|list| {
            let sq: f64 = list.iter().map(|(d, _)| d * d).sum();
            lambda * (sq / k as f64).sqrt()
        })
        .collect();

    let plof: Vec<f64> = lists
        .iter()
        .enumerate()
        .map(|(i, list)| {
            let around: f64 = list.iter().map(|(_, j)| pdist[j]).sum();
            let ratio = if around > 0.0 {
                k as f64 * pdist[i] / around
            } else if pdist[i] > 0.0 {
                f64::INFINITY
            } else {
                1.0
            };
            ratio + 1.0
        })
        .collect();

    // Infinite PLOF (a spread-out element among duplicates) scores 1 on its
    // own and is left out of the normalisation.
    let (count, total) = plof
        .iter()
        .filter(|p| p.is_finite())
        .fold((0usize, 0.0), |(c, t), &p| (c + 1, t + p));
    if count == 0 {
        return vec![1.0; plof.len()];
    }
    let nplof = std::f64::consts::SQRT_2 * lambda * count as f64 / total;
    plof.iter()
        .map(|&p| if p.is_finite() { erf(p / nplof).max(0.0) } else { 1.0 })
        .collect()
}

/// Local Outlier Factor of every element.
///
/// Fails when `k <= 1` (domain) or `k >= n` (logic).
pub fn lof(distances: &SquareMatrix, k: usize) -> Result<Vec<f64>> {
    validate_k(k)?;
    validate_size(k, distances.size())?;
    let lists = neighborhoods(distances, k);
    let scores = lof_from_neighbors(&lists, k);
    debug!(n = scores.len(), k, "lof computed");
    Ok(scores)
}

/// [`lof`] for a distance matrix given as nested rows.
pub fn lof_rows(distances: &[Vec<f64>], k: usize) -> Result<Vec<f64>> {
    validate_k(k)?;
    let m = rows_to_matrix(distances)?;
    lof(&m, k)
}

/// Local Outlier Probability of every element.
///
/// Fails when `k <= 1` or `lambda <= 0` (domain) or `k >= n` (logic).
pub fn loop_scores(distances: &SquareMatrix, k: usize, lambda: f64) -> Result<Vec<f64>> {
    validate_k(k)?;
    validate_lambda(lambda)?;
    validate_size(k, distances.size())?;
    let lists = neighborhoods(distances, k);
    let scores = loop_from_neighbors(&lists, k, lambda);
    debug!(n = scores.len(), k, lambda, "loop computed");
    Ok(scores)
}

/// [`loop_scores`] for a distance matrix given as nested rows.
pub fn loop_scores_rows(distances: &[Vec<f64>], k: usize, lambda: f64) -> Result<Vec<f64>> {
    validate_k(k)?;
    validate_lambda(lambda)?;
    let m = rows_to_matrix(distances)?;
    loop_scores(&m, k, lambda)
}
