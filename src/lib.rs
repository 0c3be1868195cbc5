//! # crnai
//!
//! Clustering, outlier scoring and combinatorial optimisation for document
//! image analysis: grouping glyphs and word images, matching layout elements
//! between pages, flagging odd samples before classification.
//!
//! Every algorithm works from pairwise distances or caller-supplied
//! callables, so the element type never matters.
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`assignment`] | Hungarian (Kuhn–Munkres) minimum-cost matching |
//! | [`cluster`] | Affinity Propagation, spectral analysis |
//! | [`outlier`] | LOF / LoOP, incremental k-NN maintenance |
//! | [`search`] | generic A*, `petgraph` adapter |
//! | [`genetic`] | generational genetic driver |
//! | [`matrix`] | square matrices, symmetric eigensolver |
//!
//! Randomised routines take the caller's `rand::Rng`; nothing in the crate
//! holds global state. Diagnostics go through `tracing`.
//!
//! **Features**: `parallel` computes batch k-NN neighbourhoods with `rayon`.

#![forbid(unsafe_code)]

pub mod assignment;
pub mod cluster;
/// Error types used across `crnai`.
pub mod error;
pub mod genetic;
pub mod matrix;
pub mod outlier;
pub mod search;

pub use error::{Error, ErrorKind, Result};
pub use matrix::{distance_matrix, SquareMatrix};

pub use assignment::Assignment;
pub use cluster::{AffinityPropagation, Clustering, Preference, SpectralClustering};
pub use genetic::{GenerationStrategy, Genetic, Population};
pub use outlier::{lof, loop_scores, IterativeKnn};
pub use search::{find_path, find_path_by_scan, find_path_in_graph};
