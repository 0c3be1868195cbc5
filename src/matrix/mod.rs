//! Dense square matrices shared by every algorithm in the crate.
//!
//! Distance, similarity, affinity and cost matrices are all `n × n` dense
//! matrices of `f64`. [`SquareMatrix`] wraps a `faer::Mat<f64>` and adds the
//! handful of helpers the algorithms need: validated construction from
//! nested rows, order statistics over the entries, and a symmetric
//! eigensolver (see [`eigen`]).
//!
//! ```rust
//! use crnai::matrix::SquareMatrix;
//!
//! let m = SquareMatrix::from_rows(&[vec![0.0, 2.0], vec![2.0, 0.0]]).unwrap();
//! assert_eq!(m.size(), 2);
//! assert_eq!(m.max(), 2.0);
//! ```

pub mod eigen;

use std::ops::{Index, IndexMut};

use faer::{Mat, MatRef};
use ndarray::Array2;

use crate::error::{Error, Result};

pub use eigen::Eigenpair;

/// An `n × n` matrix of `f64`.
#[derive(Debug, Clone)]
pub struct SquareMatrix {
    inner: Mat<f64>,
}

impl SquareMatrix {
    /// All-zero matrix of size `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            inner: Mat::<f64>::zeros(n, n),
        }
    }

    /// Identity matrix of size `n`.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, |i, j| if i == j { 1.0 } else { 0.0 })
    }

    /// Build a matrix by evaluating `f(row, col)` for every cell.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut inner = Mat::<f64>::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                inner[(i, j)] = f(i, j);
            }
        }
        Self { inner }
    }

    /// Build from nested rows.
    ///
    /// Fails with [`Error::EmptyInput`] when there are no rows and with
    /// [`Error::NotSquare`] when any row length differs from the row count.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n {
                return Err(Error::NotSquare {
                    row,
                    expected: n,
                    found: values.len(),
                });
            }
        }
        Ok(Self::from_fn(n, |i, j| rows[i][j]))
    }

    /// Build from an `ndarray` matrix.
    pub fn from_array2(array: &Array2<f64>) -> Result<Self> {
        let (n, m) = array.dim();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if n != m {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: m,
            });
        }
        Ok(Self::from_fn(n, |i, j| array[[i, j]]))
    }

    /// Wrap a `faer` matrix.
    pub fn from_mat(inner: Mat<f64>) -> Result<Self> {
        if inner.nrows() != inner.ncols() {
            return Err(Error::DimensionMismatch {
                expected: inner.nrows(),
                found: inner.ncols(),
            });
        }
        Ok(Self { inner })
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.inner.nrows()
    }

    /// `true` for the `0 × 0` matrix.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Borrow the underlying `faer` matrix.
    pub fn as_mat_ref(&self) -> MatRef<'_, f64> {
        self.inner.as_ref()
    }

    /// Copy into an `ndarray` matrix.
    pub fn to_array2(&self) -> Array2<f64> {
        let n = self.size();
        Array2::from_shape_fn((n, n), |(i, j)| self.inner[(i, j)])
    }

    /// Iterate over the entries of one row.
    pub fn row(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.size()).map(move |j| self.inner[(i, j)])
    }

    /// Iterate over the entries of one column.
    pub fn col(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.size()).map(move |i| self.inner[(i, j)])
    }

    /// Largest entry (`-inf` for an empty matrix).
    pub fn max(&self) -> f64 {
        let n = self.size();
        let mut best = f64::NEG_INFINITY;
        for i in 0..n {
            for j in 0..n {
                best = best.max(self.inner[(i, j)]);
            }
        }
        best
    }

    /// Smallest entry (`+inf` for an empty matrix).
    pub fn min(&self) -> f64 {
        let n = self.size();
        let mut best = f64::INFINITY;
        for i in 0..n {
            for j in 0..n {
                best = best.min(self.inner[(i, j)]);
            }
        }
        best
    }

    /// All entries in ascending order.
    pub fn sorted_values(&self) -> Vec<f64> {
        let n = self.size();
        let mut values = Vec::with_capacity(n * n);
        for i in 0..n {
            values.extend(self.row(i));
        }
        values.sort_by(f64::total_cmp);
        values
    }

    /// Off-diagonal entries in ascending order.
    pub fn sorted_off_diagonal(&self) -> Vec<f64> {
        let n = self.size();
        let mut values = Vec::with_capacity(n * n.saturating_sub(1));
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    values.push(self.inner[(i, j)]);
                }
            }
        }
        values.sort_by(f64::total_cmp);
        values
    }

    /// Exchange two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.size() {
            let tmp = self.inner[(a, j)];
            self.inner[(a, j)] = self.inner[(b, j)];
            self.inner[(b, j)] = tmp;
        }
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.size(), |i, j| self.inner[(j, i)])
    }

    /// Matrix product `self · rhs`.
    pub fn multiply(&self, rhs: &SquareMatrix) -> Result<Self> {
        let n = self.size();
        if rhs.size() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: rhs.size(),
            });
        }
        Ok(Self::from_fn(n, |i, j| {
            (0..n).map(|k| self.inner[(i, k)] * rhs.inner[(k, j)]).sum()
        }))
    }

    /// Replace every diagonal entry.
    pub fn fill_diagonal(&mut self, value: f64) {
        for i in 0..self.size() {
            self.inner[(i, i)] = value;
        }
    }

    /// `true` when `|m[i][j] - m[j][i]| <= tol` for every pair.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.size();
        (0..n).all(|i| (0..i).all(|j| (self.inner[(i, j)] - self.inner[(j, i)]).abs() <= tol))
    }

    /// Eigendecomposition of a symmetric matrix, eigenvalues descending.
    ///
    /// `max_iter` bounds the QL iterations spent on any single eigenvalue.
    pub fn symmetric_eigen(&self, max_iter: usize) -> Result<Vec<Eigenpair>> {
        eigen::symmetric_eigen(self, max_iter)
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.inner[(i, j)]
    }
}

impl IndexMut<(usize, usize)> for SquareMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.inner[(i, j)]
    }
}

impl TryFrom<&[Vec<f64>]> for SquareMatrix {
    type Error = Error;

    fn try_from(rows: &[Vec<f64>]) -> Result<Self> {
        Self::from_rows(rows)
    }
}

/// Pairwise distance matrix of `items` under `distance`.
///
/// Only the upper triangle is evaluated; the result is symmetric with a zero
/// diagonal.
pub fn distance_matrix<T>(items: &[T], mut distance: impl FnMut(&T, &T) -> f64) -> SquareMatrix {
    let n = items.len();
    let mut m = SquareMatrix::zeros(n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distance(&items[i], &items[j]);
            m[(i, j)] = d;
            m[(j, i)] = d;
        }
    }
    m
}

/// Euclidean distance between two equally sized slices.
#[inline]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
