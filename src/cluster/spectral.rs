//! Spectral analysis of affinity graphs.
//!
//! Spectral methods look at the eigenvectors of a normalized graph matrix
//! built from pairwise affinities. Elements that are strongly connected end
//! up close to each other in the space spanned by the leading eigenvectors,
//! and the number of eigenvalues close to 1 tells how many weakly coupled
//! groups the graph contains.
//!
//! # Algorithm
//!
//! ```text
//! 1. Affinity W from distances: w_ij = exp(-d_ij² / denom), 0 on the diagonal
//!    and beyond the cut-off ε
//! 2. Degree scaling D_ii = 1 / sqrt(Σ_j w_ij)   (0 for isolated elements)
//! 3. L = D · W · D
//! 4. Full eigendecomposition of L, eigenvalues sorted descending
//! ```
//!
//! Step 4 is done once at construction; the eigensystem is immutable
//! afterwards and serves [`SpectralClustering::estimate_cluster_count`] and
//! [`SpectralClustering::project`].
//!
//! # Choosing the kernel width
//!
//! | Scale | denom | Notes |
//! |-------|-------|-------|
//! | [`Scale::Local`] | `2·σᵢ·σⱼ` | σᵢ = distance to the m-th nearest neighbour |
//! | [`Scale::GlobalFromNeighbors`] | `2·σ²` | σ = mean of the σᵢ |
//! | [`Scale::GlobalFromDimension`] | `2·σ²` | σ = max distance / (2·n^(1/dim)) |
//! | [`Scale::Fixed`] | `2·σ²` | σ given |
//!
//! Local scaling adapts to clusters of different densities.
//!
//! # Example
//!
//! ```rust
//! use crnai::cluster::{Affinity, Scale, SpectralClustering};
//! use crnai::matrix::distance_matrix;
//!
//! let points = [0.0, 0.1, 0.2, 5.0, 5.1, 5.2];
//! let d = distance_matrix(&points, |a: &f64, b: &f64| (a - b).abs());
//! let w = Affinity::new(Scale::Fixed { sigma: 0.5 }).build(&d).unwrap();
//! let sc = SpectralClustering::new(&w).unwrap();
//! let values = sc.eigenvalues();
//! assert!(values[0] >= values[1]);
//! ```
//!
//! # References
//!
//! - Ng, Jordan, Weiss (2001). "On Spectral Clustering"
//! - Zelnik-Manor & Perona (2004). "Self-Tuning Spectral Clustering"
//! - von Luxburg (2007). "A Tutorial on Spectral Clustering"

use ndarray::Array2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::{Eigenpair, SquareMatrix};

/// Default bound on QL iterations per eigenvalue.
pub const DEFAULT_EIGEN_MAX_ITER: usize = 1000;

/// Kernel width estimation strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Per-pair width from each element's `neighborhood`-th nearest neighbour.
    Local {
        /// Rank of the neighbour giving σᵢ (1 = nearest).
        neighborhood: usize,
    },
    /// One width: the mean over elements of the local σᵢ.
    GlobalFromNeighbors {
        /// Rank of the neighbour giving σᵢ (1 = nearest).
        neighborhood: usize,
    },
    /// One width derived from the spread of the data and its dimension.
    GlobalFromDimension {
        /// Intrinsic dimension of the data.
        dimension: usize,
    },
    /// Explicit width.
    Fixed {
        /// Kernel width, non-negative.
        sigma: f64,
    },
}

/// Builds a Gaussian affinity matrix from distances.
#[derive(Debug, Clone)]
pub struct Affinity {
    scale: Scale,
    /// Pairs farther apart than this get zero affinity.
    epsilon: f64,
}

impl Affinity {
    /// Create a builder with the given width strategy and no cut-off.
    pub fn new(scale: Scale) -> Self {
        Self {
            scale,
            epsilon: f64::INFINITY,
        }
    }

    /// Set the distance cut-off.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Compute the affinity matrix.
    pub fn build(&self, distances: &SquareMatrix) -> Result<SquareMatrix> {
        let n = distances.size();
        if !(self.epsilon >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "epsilon",
                message: "must be non-negative",
            });
        }
        match self.scale {
            Scale::Local { neighborhood } | Scale::GlobalFromNeighbors { neighborhood } => {
                if neighborhood < 1 {
                    return Err(Error::InvalidArgument {
                        name: "neighborhood",
                        message: "must be at least 1",
                    });
                }
            }
            Scale::GlobalFromDimension { dimension } => {
                if dimension < 1 {
                    return Err(Error::InvalidArgument {
                        name: "dimension",
                        message: "must be at least 1",
                    });
                }
            }
            Scale::Fixed { sigma } => {
                if !(sigma >= 0.0) {
                    return Err(Error::InvalidArgument {
                        name: "sigma",
                        message: "must be non-negative",
                    });
                }
            }
        }
        if n == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }

        let w = match self.scale {
            Scale::Local { neighborhood } => {
                let sigmas = local_sigmas(distances, neighborhood);
                self.kernel(distances, |i, j| 2.0 * sigmas[i] * sigmas[j])
            }
            Scale::GlobalFromNeighbors { neighborhood } => {
                let sigmas = local_sigmas(distances, neighborhood);
                let sigma = sigmas.iter().sum::<f64>() / n as f64;
                debug!(sigma, "global kernel width from neighbours");
                self.kernel(distances, |_, _| 2.0 * sigma * sigma)
            }
            Scale::GlobalFromDimension { dimension } => {
                let sigma = distances.max() / (2.0 * (n as f64).powf(1.0 / dimension as f64));
                debug!(sigma, "global kernel width from dimension");
                self.kernel(distances, |_, _| 2.0 * sigma * sigma)
            }
            Scale::Fixed { sigma } => self.kernel(distances, |_, _| 2.0 * sigma * sigma),
        };
        Ok(w)
    }

    fn kernel(&self, distances: &SquareMatrix, denom: impl Fn(usize, usize) -> f64) -> SquareMatrix {
        SquareMatrix::from_fn(distances.size(), |i, j| {
            let d = distances[(i, j)];
            if i == j || d > self.epsilon {
                return 0.0;
            }
            let den = denom(i, j);
            if den > 0.0 {
                (-d * d / den).exp()
            } else if d == 0.0 {
                1.0
            } else {
                0.0
            }
        })
    }
}

/// Distance from each element to its `neighborhood`-th nearest other element,
/// or to its farthest one when there are fewer.
fn local_sigmas(distances: &SquareMatrix, neighborhood: usize) -> Vec<f64> {
    let n = distances.size();
    (0..n)
        .map(|i| {
            let mut row: Vec<f64> = distances
                .row(i)
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, d)| d)
                .collect();
            if row.is_empty() {
                return 0.0;
            }
            row.sort_by(f64::total_cmp);
            row[neighborhood.min(row.len()) - 1]
        })
        .collect()
}

/// Eigensystem of the normalized affinity matrix `D·W·D`.
#[derive(Debug, Clone)]
pub struct SpectralClustering {
    /// Eigenpairs, descending by eigenvalue.
    eigenpairs: Vec<Eigenpair>,
}

impl SpectralClustering {
    /// Decompose an affinity matrix.
    pub fn new(affinity: &SquareMatrix) -> Result<Self> {
        Self::with_max_iter(affinity, DEFAULT_EIGEN_MAX_ITER)
    }

    /// Decompose an affinity matrix with an explicit eigensolver bound.
    ///
    /// Fails with [`Error::ConvergenceFailure`] when an eigenvalue needs more
    /// than `max_iter` QL iterations.
    pub fn with_max_iter(affinity: &SquareMatrix, max_iter: usize) -> Result<Self> {
        let n = affinity.size();
        if n == 0 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: 0,
            });
        }

        let degree: Vec<f64> = (0..n)
            .map(|i| {
                let sum: f64 = affinity.row(i).sum();
                if sum > 0.0 {
                    1.0 / sum.sqrt()
                } else {
                    0.0
                }
            })
            .collect();
        let laplacian =
            SquareMatrix::from_fn(n, |i, j| degree[i] * affinity[(i, j)] * degree[j]);

        let eigenpairs = laplacian.symmetric_eigen(max_iter)?;
        debug!(
            n,
            largest = eigenpairs.first().map(|p| p.value),
            "spectral decomposition ready"
        );
        Ok(Self { eigenpairs })
    }

    /// Build the affinity from distances and decompose it.
    pub fn from_distances(distances: &SquareMatrix, affinity: &Affinity) -> Result<Self> {
        Self::new(&affinity.build(distances)?)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.eigenpairs.len()
    }

    /// `true` when there are no elements.
    pub fn is_empty(&self) -> bool {
        self.eigenpairs.is_empty()
    }

    /// Eigenvalues in non-increasing order.
    pub fn eigenvalues(&self) -> Vec<f64> {
        self.eigenpairs.iter().map(|p| p.value).collect()
    }

    /// Eigenpairs in non-increasing eigenvalue order.
    pub fn eigenpairs(&self) -> &[Eigenpair] {
        &self.eigenpairs
    }

    /// Count of leading eigenvalues `>= limit`, plus one.
    ///
    /// `limit` must lie in `[0, 1]`.
    pub fn estimate_cluster_count(&self, limit: f64) -> Result<usize> {
        if !(0.0..=1.0).contains(&limit) {
            return Err(Error::InvalidParameter {
                name: "limit",
                message: "must be in [0, 1]",
            });
        }
        let above = self
            .eigenpairs
            .iter()
            .take_while(|p| p.value >= limit)
            .count();
        Ok(above + 1)
    }

    /// Coordinates of every element on the leading `n_coordinates` eigenvectors.
    ///
    /// Returns an `n × c` matrix with `c = min(n_coordinates, n)`. With
    /// `normalize`, every non-zero row is scaled to unit Euclidean norm.
    pub fn project(&self, n_coordinates: usize, normalize: bool) -> Result<Array2<f64>> {
        if n_coordinates < 1 {
            return Err(Error::DimensionMismatch {
                expected: 1,
                found: n_coordinates,
            });
        }
        let n = self.len();
        let c = n_coordinates.min(n);
        let mut out = Array2::<f64>::zeros((n, c));
        for (k, pair) in self.eigenpairs.iter().take(c).enumerate() {
            for i in 0..n {
                out[[i, k]] = pair.vector[i];
            }
        }

        if normalize {
            for mut row in out.rows_mut() {
                let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.mapv_inplace(|x| x / norm);
                }
            }
        }
        Ok(out)
    }
}
