//! Symmetric eigendecomposition.
//!
//! Householder reduction to tridiagonal form followed by the QL algorithm
//! with implicit shifts (TQLI). The orthogonal transform is accumulated so
//! eigenvectors come out alongside the eigenvalues.
//!
//! Only the lower triangle of the input participates in the reduction; the
//! input is assumed symmetric.
//!
//! # References
//!
//! - Golub & Van Loan (2013). "Matrix Computations", §8.3.
//! - Press et al. (2007). "Numerical Recipes", §11.3–11.4.

use tracing::debug;

use super::SquareMatrix;
use crate::error::{Error, Result};

/// One eigenvalue with its unit-norm eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub struct Eigenpair {
    /// Eigenvalue.
    pub value: f64,
    /// Eigenvector, one component per matrix row.
    pub vector: Vec<f64>,
}

/// Eigenpairs of a symmetric matrix, sorted by descending eigenvalue.
pub(crate) fn symmetric_eigen(m: &SquareMatrix, max_iter: usize) -> Result<Vec<Eigenpair>> {
    let n = m.size();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut z: Vec<Vec<f64>> = (0..n).map(|i| m.row(i).collect()).collect();
    let (mut d, mut e) = tridiagonalize(&mut z);
    let iterations = tql_implicit(&mut d, &mut e, &mut z, max_iter)?;
    debug!(n, iterations, "symmetric eigendecomposition converged");

    let mut pairs: Vec<Eigenpair> = (0..n)
        .map(|k| Eigenpair {
            value: d[k],
            vector: (0..n).map(|i| z[i][k]).collect(),
        })
        .collect();
    pairs.sort_by(|a, b| b.value.total_cmp(&a.value));
    Ok(pairs)
}

/// Householder reduction of `a` (overwritten by the accumulated transform).
///
/// Returns the diagonal `d` and sub-diagonal `e` (with `e[0] == 0`).
fn tridiagonalize(a: &mut [Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let n = a.len();
    let mut d = vec![0.0; n];
    let mut e = vec![0.0; n];

    for i in (1..n).rev() {
        let l = i - 1;
        let mut h = 0.0;
        if l > 0 {
            let scale: f64 = a[i][..=l].iter().map(|x| x.abs()).sum();
            if scale == 0.0 {
                e[i] = a[i][l];
            } else {
                for k in 0..=l {
                    a[i][k] /= scale;
                    h += a[i][k] * a[i][k];
                }
                let mut f = a[i][l];
                let mut g = if f >= 0.0 { -h.sqrt() } else { h.sqrt() };
                e[i] = scale * g;
                h -= f * g;
                a[i][l] = f - g;
                f = 0.0;
                for j in 0..=l {
                    a[j][i] = a[i][j] / h;
                    g = 0.0;
                    for k in 0..=j {
                        g += a[j][k] * a[i][k];
                    }
                    for k in (j + 1)..=l {
                        g += a[k][j] * a[i][k];
                    }
                    e[j] = g / h;
                    f += e[j] * a[i][j];
                }
                let hh = f / (h + h);
                for j in 0..=l {
                    let f = a[i][j];
                    let g = e[j] - hh * f;
                    e[j] = g;
                    for k in 0..=j {
                        a[j][k] -= f * e[k] + g * a[i][k];
                    }
                }
            }
        } else {
            e[i] = a[i][l];
        }
        d[i] = h;
    }

    d[0] = 0.0;
    e[0] = 0.0;
    for i in 0..n {
        if d[i] != 0.0 {
            for j in 0..i {
                let g: f64 = (0..i).map(|k| a[i][k] * a[k][j]).sum();
                for k in 0..i {
                    a[k][j] -= g * a[k][i];
                }
            }
        }
        d[i] = a[i][i];
        a[i][i] = 1.0;
        for j in 0..i {
            a[j][i] = 0.0;
            a[i][j] = 0.0;
        }
    }

    (d, e)
}

/// QL with implicit shifts on the tridiagonal `(d, e)`, rotating `z`.
///
/// Returns the total number of QL sweeps.
fn tql_implicit(
    d: &mut [f64],
    e: &mut [f64],
    z: &mut [Vec<f64>],
    max_iter: usize,
) -> Result<usize> {
    let n = d.len();
    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = 0.0;

    let mut total = 0;
    for l in 0..n {
        let mut iter = 0;
        loop {
            let mut m = l;
            while m + 1 < n {
                let dd = d[m].abs() + d[m + 1].abs();
                if e[m].abs() <= f64::EPSILON * dd {
                    break;
                }
                m += 1;
            }
            if m == l {
                break;
            }

            iter += 1;
            total += 1;
            if iter > max_iter {
                return Err(Error::ConvergenceFailure { iterations: max_iter });
            }

            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = g.hypot(1.0);
            let signed_r = if g >= 0.0 { r } else { -r };
            g = d[m] - d[l] + e[l] / (g + signed_r);
            let mut s = 1.0;
            let mut c = 1.0;
            let mut p = 0.0;
            let mut underflow = false;

            for i in (l..m).rev() {
                let f = s * e[i];
                let b = c * e[i];
                r = f.hypot(g);
                e[i + 1] = r;
                if r == 0.0 {
                    d[i + 1] -= p;
                    e[m] = 0.0;
                    underflow = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                p = s * r;
                d[i + 1] = g + p;
                g = c * r - b;
                for row in z.iter_mut() {
                    let f = row[i + 1];
                    row[i + 1] = s * row[i] + c * f;
                    row[i] = c * row[i] - s * f;
                }
            }
            if underflow {
                continue;
            }
            d[l] -= p;
            e[l] = g;
            e[m] = 0.0;
        }
    }
    Ok(total)
}
