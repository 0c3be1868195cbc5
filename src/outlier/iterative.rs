//! Online k-nearest-neighbour maintenance.
//!
//! [`IterativeKnn`] keeps, for every element inserted so far, the list of its
//! `k` nearest other elements. Elements are only ever appended; every
//! insertion updates the newcomer's list and, where the newcomer is closer
//! than their current farthest neighbour, the lists of existing elements.
//!
//! Two insertion modes:
//!
//! - [`IterativeKnn::add`] compares the newcomer with every element: exact
//!   lists, O(n) per insertion, O(n²) overall. Lists are identical to the
//!   batch neighbourhoods of [`crate::outlier::neighborhoods`].
//! - [`IterativeKnn::fast_add`] behaves like `add` for small samples, then
//!   switches to a seeded graph search: a few evenly spaced elements are
//!   visited first, and every visited element that enters the newcomer's
//!   list has its own neighbours queued. Lists become approximate, but only
//!   the neighbourhood of the newcomer is explored.
//!
//! Local outlier scores are read straight from the maintained lists, so they
//! can be refreshed cheaply after each batch of insertions.

use std::collections::VecDeque;

use tracing::debug;

use super::lof::{lof_from_neighbors, loop_from_neighbors};
use super::neighbors::NeighborList;
use crate::error::{Error, Result};

/// Knobs for [`IterativeKnn::fast_add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastInsertion {
    /// Below this sample size, insertions are exhaustive.
    pub seed_min: usize,
    /// One seed per `sample_factor` existing elements.
    pub sample_factor: usize,
    /// Upper bound on the number of seeds.
    pub seed_max: usize,
}

impl Default for FastInsertion {
    fn default() -> Self {
        Self {
            seed_min: 50,
            sample_factor: 10,
            seed_max: 100,
        }
    }
}

#[derive(Debug, Clone)]
struct Sample<T> {
    value: T,
    neighbors: NeighborList,
}

/// Incrementally maintained k-nearest-neighbour lists.
#[derive(Debug, Clone)]
pub struct IterativeKnn<T, F> {
    k: usize,
    distance: F,
    fast: FastInsertion,
    samples: Vec<Sample<T>>,
}

impl<T, F> IterativeKnn<T, F>
where
    F: Fn(&T, &T) -> f64,
{
    /// Empty structure for neighbourhoods of size `k` (> 1).
    pub fn new(k: usize, distance: F) -> Result<Self> {
        Self::with_fast_insertion(k, distance, FastInsertion::default())
    }

    /// Empty structure with explicit fast-insertion settings.
    pub fn with_fast_insertion(k: usize, distance: F, fast: FastInsertion) -> Result<Self> {
        if k <= 1 {
            return Err(Error::InvalidParameter {
                name: "k",
                message: "must be greater than 1",
            });
        }
        if fast.sample_factor == 0 {
            return Err(Error::InvalidParameter {
                name: "sample_factor",
                message: "must be at least 1",
            });
        }
        if fast.seed_max == 0 {
            return Err(Error::InvalidParameter {
                name: "seed_max",
                message: "must be at least 1",
            });
        }
        Ok(Self {
            k,
            distance,
            fast,
            samples: Vec::new(),
        })
    }

    /// Neighbourhood size.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of elements inserted.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` before the first insertion.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Value of element `i`.
    pub fn value(&self, i: usize) -> Option<&T> {
        self.samples.get(i).map(|s| &s.value)
    }

    /// Neighbour list of element `i`.
    pub fn neighbors(&self, i: usize) -> Option<&NeighborList> {
        self.samples.get(i).map(|s| &s.neighbors)
    }

    /// Distance from element `i` to its farthest held neighbour.
    pub fn k_distance(&self, i: usize) -> Option<f64> {
        self.neighbors(i).and_then(NeighborList::k_distance)
    }

    /// Insert `value`, comparing it with every element. Returns its index.
    pub fn add(&mut self, value: T) -> usize {
        let index = self.samples.len();
        let mut list = NeighborList::new(self.k);
        for (j, sample) in self.samples.iter_mut().enumerate() {
            let d = (self.distance)(&sample.value, &value);
            let _ = list.offer(d, j);
            let _ = sample.neighbors.offer(d, index);
        }
        self.samples.push(Sample {
            value,
            neighbors: list,
        });
        index
    }

    /// Insert `value` with the seeded neighbourhood search. Returns its index.
    pub fn fast_add(&mut self, value: T) -> usize {
        let existing = self.samples.len();
        if existing < self.fast.seed_min.max(2) {
            return self.add(value);
        }

        let n_seeds = ((existing - 1) / self.fast.sample_factor + 1).min(self.fast.seed_max);
        let stride = existing / n_seeds;

        let mut visited = vec![false; existing];
        let mut queue: VecDeque<usize> = VecDeque::with_capacity(n_seeds);
        for s in 0..n_seeds {
            let seed = s * stride;
            if !visited[seed] {
                visited[seed] = true;
                queue.push_back(seed);
            }
        }

        let mut list = NeighborList::new(self.k);
        let mut compared = 0usize;
        while let Some(c) = queue.pop_front() {
            compared += 1;
            let sample = &mut self.samples[c];
            let d = (self.distance)(&sample.value, &value);
            let _ = sample.neighbors.offer(d, existing);
            if !list.offer(d, c) {
                continue;
            }
            for (_, nb) in sample.neighbors.iter() {
                if nb < existing && !visited[nb] {
                    visited[nb] = true;
                    queue.push_back(nb);
                }
            }
        }
        debug!(index = existing, n_seeds, compared, "fast insertion");

        self.samples.push(Sample {
            value,
            neighbors: list,
        });
        existing
    }

    fn neighbor_lists(&self) -> Result<Vec<NeighborList>> {
        if self.samples.len() <= self.k {
            return Err(Error::DimensionMismatch {
                expected: self.k + 1,
                found: self.samples.len(),
            });
        }
        Ok(self.samples.iter().map(|s| s.neighbors.clone()).collect())
    }

    /// Local Outlier Factor of every element from the maintained lists.
    ///
    /// Requires more than `k` elements so every list holds `k` neighbours;
    /// with `k` or fewer this is a dimension error.
    pub fn lof(&self) -> Result<Vec<f64>> {
        let lists = self.neighbor_lists()?;
        Ok(lof_from_neighbors(&lists, self.k))
    }

    /// Local Outlier Probability of every element from the maintained lists.
    ///
    /// Requires `lambda > 0` and more than `k` elements; with `k` or fewer
    /// this is a dimension error.
    pub fn loop_scores(&self, lambda: f64) -> Result<Vec<f64>> {
        if !(lambda > 0.0) {
            return Err(Error::InvalidParameter {
                name: "lambda",
                message: "must be positive",
            });
        }
        let lists = self.neighbor_lists()?;
        Ok(loop_from_neighbors(&lists, self.k, lambda))
    }
}
