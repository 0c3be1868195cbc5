//! Clustering traits.

use crate::error::Result;
use crate::matrix::SquareMatrix;

/// Trait for clustering algorithms that work from pairwise distances.
pub trait Clustering {
    /// Cluster the elements described by `distances` and return one label per
    /// element.
    ///
    /// Label semantics are algorithm specific: exemplar-based methods return
    /// the index of each element's exemplar.
    fn fit_predict(&self, distances: &SquareMatrix) -> Result<Vec<usize>>;
}
