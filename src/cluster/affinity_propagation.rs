//! Affinity Propagation: exemplar-based clustering by message passing.
//!
//! # The Algorithm (Frey & Dueck, 2007)
//!
//! Every element is a candidate *exemplar* (prototype). Two kinds of
//! messages are exchanged between elements until the choice of exemplars
//! settles:
//!
//! - **Responsibility** `r(i,k)`: how well-suited `k` is to be the exemplar
//!   of `i`, compared with the other candidates.
//! - **Availability** `a(i,k)`: how appropriate it would be for `i` to pick
//!   `k`, given the support `k` collects from other elements.
//!
//! With the similarity `s = -d` (distances with the diagonal replaced by the
//! preference):
//!
//! ```text
//! r(i,k) ← λ·r(i,k) + (1-λ)·( s(i,k) − max_{k'≠k} [a(i,k') + s(i,k')] )
//! a(k,k) ← λ·a(k,k) + (1-λ)·Σ_{i'≠k} max(0, r(i',k))
//! a(i,k) ← λ·a(i,k) + (1-λ)·min(0, r(k,k) + Σ_{i'∉{i,k}} max(0, r(i',k)))
//! ```
//!
//! Each element is assigned to `argmax_k r(i,k) + a(i,k)`.
//!
//! ## Preferences
//!
//! The diagonal of the distance matrix is overwritten with the
//! *preference*: the self-distance an element pays to become an exemplar.
//! Larger self-distances yield fewer clusters. [`Preference::Low`] uses the
//! largest distance (few clusters), [`Preference::Medium`] the median
//! off-diagonal distance (a moderate number).
//!
//! ## Stopping
//!
//! The loop stops once the labelling has been identical for
//! `stable_iterations` consecutive iterations, or after `max_iter`
//! iterations. Hitting the cap is not an error; the last labelling is used.
//!
//! # References
//!
//! Frey & Dueck (2007). "Clustering by Passing Messages Between Data Points."
//! Science 315(5814).

use tracing::{debug, warn};

use super::traits::Clustering;
use crate::error::{Error, Result};
use crate::matrix::SquareMatrix;

/// Self-distance policy written on the diagonal before message passing.
#[derive(Debug, Clone, PartialEq)]
pub enum Preference {
    /// Largest distance in the matrix: few clusters.
    Low,
    /// Median off-diagonal distance: a moderate number of clusters.
    Medium,
    /// The same self-distance for every element.
    Value(f64),
    /// One self-distance per element.
    PerElement(Vec<f64>),
}

/// Result of an Affinity Propagation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityPropagationFit {
    /// Indices of the exemplars, ascending.
    pub prototypes: Vec<usize>,
    /// Exemplar index of every element (`labels[p] == p` for exemplars).
    pub labels: Vec<usize>,
    /// Message-passing iterations performed.
    pub iterations: usize,
    /// Whether the labelling stabilised before `max_iter`.
    pub converged: bool,
}

/// Affinity Propagation clustering.
#[derive(Debug, Clone)]
pub struct AffinityPropagation {
    preference: Preference,
    /// Weight of the previous message, in `[0, 1)`.
    damping: f64,
    /// Consecutive identical labellings required to stop.
    stable_iterations: usize,
    /// Iteration cap.
    max_iter: usize,
}

impl AffinityPropagation {
    /// Create a clusterer with the given preference policy.
    pub fn new(preference: Preference) -> Self {
        Self {
            preference,
            damping: 0.5,
            stable_iterations: 10,
            max_iter: 100,
        }
    }

    /// Set the damping factor.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set how many consecutive identical labellings stop the loop.
    pub fn with_stable_iterations(mut self, stable_iterations: usize) -> Self {
        self.stable_iterations = stable_iterations;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    fn validate(&self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(Error::InvalidParameter {
                name: "damping",
                message: "must be in [0, 1)",
            });
        }
        if self.stable_iterations <= 1 {
            return Err(Error::InvalidParameter {
                name: "stable_iterations",
                message: "must be greater than 1",
            });
        }
        if self.max_iter <= 1 {
            return Err(Error::InvalidParameter {
                name: "max_iter",
                message: "must be greater than 1",
            });
        }
        if let Preference::PerElement(p) = &self.preference {
            if p.len() != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    found: p.len(),
                });
            }
        }
        Ok(())
    }

    /// Distance matrix with the preference written on the diagonal.
    fn with_preference(&self, distances: &SquareMatrix) -> SquareMatrix {
        let n = distances.size();
        let mut d = distances.clone();
        match &self.preference {
            Preference::Low => d.fill_diagonal(distances.max()),
            Preference::Medium => {
                let off = distances.sorted_off_diagonal();
                let median = off.get(off.len() / 2).copied().unwrap_or(0.0);
                d.fill_diagonal(median);
            }
            Preference::Value(v) => d.fill_diagonal(*v),
            Preference::PerElement(p) => {
                for (i, &v) in p.iter().enumerate().take(n) {
                    d[(i, i)] = v;
                }
            }
        }
        d
    }

    /// Run message passing on a distance matrix.
    pub fn fit(&self, distances: &SquareMatrix) -> Result<AffinityPropagationFit> {
        let n = distances.size();
        self.validate(n)?;

        let dm = self.with_preference(distances);
        let mut d = vec![0.0; n * n];
        for i in 0..n {
            for (j, v) in dm.row(i).enumerate() {
                d[i * n + j] = v;
            }
        }

        let lambda = self.damping;
        let mut r = vec![0.0; n * n];
        let mut a = vec![0.0; n * n];
        let mut labels: Vec<usize> = Vec::new();
        let mut stable = 0usize;
        let mut iterations = 0usize;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            // Responsibilities.
            for i in 0..n {
                let row = i * n;
                let (mut first, mut second) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
                let mut first_k = 0;
                for k in 0..n {
                    let v = a[row + k] - d[row + k];
                    if v > first {
                        second = first;
                        first = v;
                        first_k = k;
                    } else if v > second {
                        second = v;
                    }
                }
                for k in 0..n {
                    let competitor = if k == first_k { second } else { first };
                    let competitor = if competitor.is_finite() { competitor } else { 0.0 };
                    let target = -d[row + k] - competitor;
                    r[row + k] = lambda * r[row + k] + (1.0 - lambda) * target;
                }
            }

            // Availabilities.
            for k in 0..n {
                let support: f64 = (0..n)
                    .filter(|&i| i != k)
                    .map(|i| r[i * n + k].max(0.0))
                    .sum();
                for i in 0..n {
                    let target = if i == k {
                        support
                    } else {
                        (r[k * n + k] + support - r[i * n + k].max(0.0)).min(0.0)
                    };
                    a[i * n + k] = lambda * a[i * n + k] + (1.0 - lambda) * target;
                }
            }

            let current: Vec<usize> = (0..n)
                .map(|i| {
                    let row = i * n;
                    let mut best = 0;
                    for k in 1..n {
                        if r[row + k] + a[row + k] > r[row + best] + a[row + best] {
                            best = k;
                        }
                    }
                    best
                })
                .collect();

            if current == labels {
                stable += 1;
            } else {
                stable = 0;
                labels = current;
            }
            if stable >= self.stable_iterations {
                converged = true;
                break;
            }
        }

        let prototypes = settle_prototypes(&mut labels, &r, &a, distances);
        if converged {
            debug!(n, iterations, clusters = prototypes.len(), "affinity propagation converged");
        } else {
            warn!(
                n,
                iterations,
                clusters = prototypes.len(),
                "affinity propagation stopped at iteration cap"
            );
        }

        Ok(AffinityPropagationFit {
            prototypes,
            labels,
            iterations,
            converged,
        })
    }
}

/// Make every label point at an exemplar and return the exemplars.
///
/// Exemplars are the self-assigned elements. An element whose argmax is not
/// an exemplar is attached to its nearest exemplar. Without any
/// self-assigned element, the one with the strongest self-evidence
/// `r(i,i) + a(i,i)` becomes the only exemplar.
fn settle_prototypes(
    labels: &mut [usize],
    r: &[f64],
    a: &[f64],
    distances: &SquareMatrix,
) -> Vec<usize> {
    let n = labels.len();
    let mut prototypes: Vec<usize> = (0..n).filter(|&i| labels[i] == i).collect();
    if prototypes.is_empty() {
        let mut best = 0;
        for i in 1..n {
            if r[i * n + i] + a[i * n + i] > r[best * n + best] + a[best * n + best] {
                best = i;
            }
        }
        prototypes.push(best);
    }

    let mut is_prototype = vec![false; n];
    for &p in &prototypes {
        is_prototype[p] = true;
    }
    for i in 0..n {
        if is_prototype[i] {
            labels[i] = i;
        } else if !is_prototype[labels[i]] {
            let mut nearest = prototypes[0];
            for &p in &prototypes[1..] {
                if distances[(i, p)] < distances[(i, nearest)] {
                    nearest = p;
                }
            }
            labels[i] = nearest;
        }
    }
    prototypes
}

impl Default for AffinityPropagation {
    fn default() -> Self {
        Self::new(Preference::Medium)
    }
}

impl Clustering for AffinityPropagation {
    fn fit_predict(&self, distances: &SquareMatrix) -> Result<Vec<usize>> {
        Ok(self.fit(distances)?.labels)
    }
}
