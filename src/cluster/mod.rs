//! Clustering from pairwise distances.
//!
//! Both algorithms here start from an `n × n` distance matrix produced by
//! some external feature comparison (glyph shapes, word images, layout
//! blocks), so they work for any kind of element as long as it can be
//! compared.
//!
//! ## Exemplar-based vs spectral
//!
//! **Affinity Propagation** picks actual elements as cluster prototypes and
//! finds the number of clusters on its own, steered by a *preference* (how
//! expensive it is for an element to represent itself). Labels are the
//! indices of the chosen prototypes.
//!
//! **Spectral analysis** embeds elements with the leading eigenvectors of a
//! normalized affinity matrix. The eigenvalue spectrum suggests how many
//! groups exist; the embedding can be thresholded or fed to any vector
//! clusterer.
//!
//! | Algorithm | Needs k | Output | Cost |
//! |-----------|---------|--------|------|
//! | Affinity Propagation | No | prototypes + labels | O(n²) per iteration |
//! | Spectral | No (estimated) | eigenvalues + embedding | O(n³) once |
//!
//! ## Usage
//!
//! ```rust
//! use crnai::cluster::{AffinityPropagation, Clustering, Preference};
//! use crnai::matrix::distance_matrix;
//!
//! let points = [0.0, 0.1, 0.2, 10.0, 10.1, 10.2];
//! let d = distance_matrix(&points, |a: &f64, b: &f64| (a - b).abs());
//!
//! let labels = AffinityPropagation::new(Preference::Medium)
//!     .fit_predict(&d)
//!     .unwrap();
//! assert_eq!(labels[0], labels[2]);
//! assert_ne!(labels[0], labels[3]);
//! ```

mod affinity_propagation;
mod traits;

pub mod spectral;

pub use affinity_propagation::{AffinityPropagation, AffinityPropagationFit, Preference};
pub use spectral::{Affinity, Scale, SpectralClustering};
pub use traits::Clustering;
