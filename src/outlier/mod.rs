//! Local density outlier scores.
//!
//! Two batch scores over a distance matrix, plus an incremental structure
//! that keeps neighbourhoods up to date as elements arrive one at a time.
//!
//! | Score | Range | Reads as |
//! |-------|-------|----------|
//! | [`lof`] | `[0, ∞)` | ≈ 1 inlier, ≫ 1 outlier |
//! | [`loop_scores`] | `[0, 1]` | probability of being an outlier |
//!
//! ```rust
//! use crnai::matrix::distance_matrix;
//! use crnai::outlier::lof;
//!
//! let xs = [0.0, 0.1, 0.2, 0.3, 0.4, 5.0];
//! let d = distance_matrix(&xs, |a: &f64, b: &f64| (a - b).abs());
//! let scores = lof(&d, 2).unwrap();
//! assert!(scores[5] > scores[2]);
//! ```

mod iterative;
mod lof;
mod neighbors;

pub use iterative::{FastInsertion, IterativeKnn};
pub use lof::{lof, lof_rows, loop_scores, loop_scores_rows, neighborhoods};
pub use neighbors::NeighborList;
