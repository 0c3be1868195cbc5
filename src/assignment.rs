//! Minimum-cost perfect matching (the assignment problem).
//!
//! Given an `n × n` cost matrix `C`, find a permutation `σ` minimising
//! `Σᵢ C[i][σ(i)]`: each row is paired with exactly one column.
//!
//! # Munkres' algorithm
//!
//! The Kuhn–Munkres primal-dual method runs as a small state machine over
//! *starred* zeros (the current partial matching), *primed* zeros (candidate
//! augmentations) and row/column covers:
//!
//! ```text
//! 1. subtract each row's minimum from the row
//! 2. star one zero per row/column where possible
//! 3. cover starred columns; n covered ⇒ done
//! 4. prime an uncovered zero; starred zero in its row ⇒ cover row, uncover
//!    that column and repeat; otherwise go to 5; no uncovered zero ⇒ go to 6
//! 5. flip stars/primes along the alternating path from the step-4 zero,
//!    erase primes and covers, back to 3
//! 6. add the smallest uncovered value to covered rows, subtract it from
//!    uncovered columns, back to 4
//! ```
//!
//! Termination follows from the classical argument: every pass through
//! step 6 creates a new uncovered zero, and every pass through step 5 grows
//! the matching by one. Complexity is O(n³).
//!
//! # Example
//!
//! ```rust
//! use crnai::assignment;
//!
//! let cost = vec![
//!     vec![4.0, 1.0, 3.0],
//!     vec![2.0, 0.0, 5.0],
//!     vec![3.0, 2.0, 2.0],
//! ];
//! let a = assignment::solve_rows(&cost).unwrap();
//! assert_eq!(a.cost, 5.0);
//! assert_eq!(a.pairs, vec![(0, 1), (1, 0), (2, 2)]);
//! ```
//!
//! # References
//!
//! - Kuhn (1955). "The Hungarian Method for the Assignment Problem"
//! - Munkres (1957). "Algorithms for the Assignment and Transportation Problems"

use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::SquareMatrix;

/// Optimal matching between rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Sum of the original costs of the selected cells.
    pub cost: f64,
    /// `(row, column)` pairs, one per row, sorted by row.
    pub pairs: Vec<(usize, usize)>,
}

impl Assignment {
    /// Column assigned to each row.
    pub fn columns(&self) -> Vec<usize> {
        self.pairs.iter().map(|&(_, c)| c).collect()
    }
}

/// Solve the assignment problem for a square cost matrix.
///
/// An empty matrix yields an empty assignment of cost 0. Costs must be
/// finite.
pub fn solve(cost: &SquareMatrix) -> Result<Assignment> {
    let n = cost.size();
    let mut flat = Vec::with_capacity(n * n);
    for i in 0..n {
        flat.extend(cost.row(i));
    }
    if flat.iter().any(|c| !c.is_finite()) {
        return Err(Error::InvalidArgument {
            name: "cost",
            message: "entries must be finite",
        });
    }

    let columns = Munkres::new(flat.clone(), n).run();
    let pairs: Vec<(usize, usize)> = columns.into_iter().enumerate().collect();
    let total = pairs.iter().map(|&(r, c)| flat[r * n + c]).sum();
    debug!(n, cost = total, "assignment solved");
    Ok(Assignment { cost: total, pairs })
}

/// Solve the assignment problem for a cost matrix given as nested rows.
///
/// Fails with [`Error::EmptyInput`] for no rows and [`Error::NotSquare`]
/// when a row length differs from the row count.
pub fn solve_rows(cost: &[Vec<f64>]) -> Result<Assignment> {
    let m = SquareMatrix::from_rows(cost)?;
    solve(&m)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    None,
    Star,
    Prime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CoverStarredColumns,
    PrimeZeros,
    Augment { row: usize, col: usize },
    ShiftMinimum,
    Done,
}

struct Munkres {
    n: usize,
    cost: Vec<f64>,
    marks: Vec<Mark>,
    row_covered: Vec<bool>,
    col_covered: Vec<bool>,
}

impl Munkres {
    fn new(cost: Vec<f64>, n: usize) -> Self {
        Self {
            n,
            cost,
            marks: vec![Mark::None; n * n],
            row_covered: vec![false; n],
            col_covered: vec![false; n],
        }
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> usize {
        i * self.n + j
    }

    /// Column matched to each row.
    fn run(mut self) -> Vec<usize> {
        if self.n == 0 {
            return Vec::new();
        }
        self.reduce_rows();
        self.star_zeros();

        let mut step = Step::CoverStarredColumns;
        let mut augmentations = 0usize;
        let mut shifts = 0usize;
        while step != Step::Done {
            step = match step {
                Step::CoverStarredColumns => self.cover_starred_columns(),
                Step::PrimeZeros => self.prime_zeros(),
                Step::Augment { row, col } => {
                    augmentations += 1;
                    self.augment(row, col)
                }
                Step::ShiftMinimum => {
                    shifts += 1;
                    self.shift_minimum()
                }
                Step::Done => Step::Done,
            };
        }
        debug!(n = self.n, augmentations, shifts, "munkres finished");

        (0..self.n)
            .map(|i| {
                (0..self.n)
                    .find(|&j| self.marks[self.at(i, j)] == Mark::Star)
                    .unwrap_or(i)
            })
            .collect()
    }

    fn reduce_rows(&mut self) {
        let n = self.n;
        for row in self.cost.chunks_mut(n) {
            let min = row.iter().copied().fold(f64::INFINITY, f64::min);
            for c in row.iter_mut() {
                *c -= min;
            }
        }
    }

    fn star_zeros(&mut self) {
        for i in 0..self.n {
            for j in 0..self.n {
                let idx = self.at(i, j);
                if self.cost[idx] == 0.0 && !self.row_covered[i] && !self.col_covered[j] {
                    self.marks[idx] = Mark::Star;
                    self.row_covered[i] = true;
                    self.col_covered[j] = true;
                }
            }
        }
        self.clear_covers();
    }

    fn cover_starred_columns(&mut self) -> Step {
        for j in 0..self.n {
            if (0..self.n).any(|i| self.marks[self.at(i, j)] == Mark::Star) {
                self.col_covered[j] = true;
            }
        }
        if self.col_covered.iter().all(|&c| c) {
            Step::Done
        } else {
            Step::PrimeZeros
        }
    }

    fn prime_zeros(&mut self) -> Step {
        loop {
            let Some((row, col)) = self.find_uncovered_zero() else {
                return Step::ShiftMinimum;
            };
            let idx = self.at(row, col);
            self.marks[idx] = Mark::Prime;
            match self.find_in_row(row, Mark::Star) {
                Some(star_col) => {
                    self.row_covered[row] = true;
                    self.col_covered[star_col] = false;
                }
                None => return Step::Augment { row, col },
            }
        }
    }

    fn augment(&mut self, row: usize, col: usize) -> Step {
        let mut path = vec![(row, col)];
        loop {
            let (_, c) = path[path.len() - 1];
            let Some(r) = self.find_in_col(c, Mark::Star) else {
                break;
            };
            path.push((r, c));
            // A starred zero's row always holds the prime that uncovered its column.
            let Some(pc) = self.find_in_row(r, Mark::Prime) else {
                break;
            };
            path.push((r, pc));
        }

        for &(r, c) in &path {
            let idx = self.at(r, c);
            self.marks[idx] = match self.marks[idx] {
                Mark::Star => Mark::None,
                _ => Mark::Star,
            };
        }
        for mark in self.marks.iter_mut() {
            if *mark == Mark::Prime {
                *mark = Mark::None;
            }
        }
        self.clear_covers();
        Step::CoverStarredColumns
    }

    fn shift_minimum(&mut self) -> Step {
        let mut min = f64::INFINITY;
        for i in 0..self.n {
            if self.row_covered[i] {
                continue;
            }
            for j in 0..self.n {
                if !self.col_covered[j] {
                    min = min.min(self.cost[self.at(i, j)]);
                }
            }
        }
        for i in 0..self.n {
            for j in 0..self.n {
                let idx = self.at(i, j);
                if self.row_covered[i] {
                    self.cost[idx] += min;
                }
                if !self.col_covered[j] {
                    self.cost[idx] -= min;
                }
            }
        }
        Step::PrimeZeros
    }

    fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        for i in 0..self.n {
            if self.row_covered[i] {
                continue;
            }
            for j in 0..self.n {
                if !self.col_covered[j] && self.cost[self.at(i, j)] == 0.0 {
                    return Some((i, j));
                }
            }
        }
        None
    }

    fn find_in_row(&self, row: usize, mark: Mark) -> Option<usize> {
        (0..self.n).find(|&j| self.marks[self.at(row, j)] == mark)
    }

    fn find_in_col(&self, col: usize, mark: Mark) -> Option<usize> {
        (0..self.n).find(|&i| self.marks[self.at(i, col)] == mark)
    }

    fn clear_covers(&mut self) {
        self.row_covered.fill(false);
        self.col_covered.fill(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn brute_force(cost: &[Vec<f64>]) -> f64 {
        fn permute(k: usize, perm: &mut Vec<usize>, cost: &[Vec<f64>], best: &mut f64) {
            if k == perm.len() {
                let total: f64 = perm.iter().enumerate().map(|(i, &j)| cost[i][j]).sum();
                *best = best.min(total);
                return;
            }
            for i in k..perm.len() {
                perm.swap(k, i);
                permute(k + 1, perm, cost, best);
                perm.swap(k, i);
            }
        }
        let mut perm: Vec<usize> = (0..cost.len()).collect();
        let mut best = f64::INFINITY;
        permute(0, &mut perm, cost, &mut best);
        best
    }

    #[test]
    fn test_identity_cost_selects_diagonal() {
        let n = 6;
        let cost: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
            .collect();
        let a = solve_rows(&cost).unwrap();
        assert_eq!(a.cost, 0.0);
        assert_eq!(a.pairs, (0..n).map(|i| (i, i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_classic_example() {
        let cost = vec![
            vec![82.0, 83.0, 69.0, 92.0],
            vec![77.0, 37.0, 49.0, 92.0],
            vec![11.0, 69.0, 5.0, 86.0],
            vec![8.0, 9.0, 98.0, 23.0],
        ];
        let a = solve_rows(&cost).unwrap();
        assert_eq!(a.cost, 140.0);
        assert_eq!(a.columns(), vec![2, 1, 0, 3]);
    }

    #[test]
    fn test_matches_brute_force() {
        let cost = vec![
            vec![7.0, 53.0, 183.0, 439.0, 863.0],
            vec![497.0, 383.0, 563.0, 79.0, 973.0],
            vec![287.0, 63.0, 343.0, 169.0, 583.0],
            vec![627.0, 343.0, 773.0, 959.0, 943.0],
            vec![767.0, 473.0, 103.0, 699.0, 303.0],
        ];
        let a = solve_rows(&cost).unwrap();
        assert_eq!(a.cost, brute_force(&cost));
    }

    #[test]
    fn test_needs_several_augmentations() {
        // All rows prefer column 0, forcing repeated prime/star alternation.
        let cost = vec![
            vec![1.0, 2.0, 3.0],
            vec![1.0, 4.0, 9.0],
            vec![1.0, 3.0, 7.0],
        ];
        let a = solve_rows(&cost).unwrap();
        assert_eq!(a.cost, brute_force(&cost));

        let mut cols = a.columns();
        cols.sort_unstable();
        assert_eq!(cols, vec![0, 1, 2]);
    }

    #[test]
    fn test_typed_and_nested_inputs_agree() {
        let rows = vec![
            vec![3.0, 1.0, 2.0],
            vec![2.0, 3.0, 1.0],
            vec![1.0, 2.0, 3.0],
        ];
        let m = SquareMatrix::from_rows(&rows).unwrap();
        assert_eq!(solve(&m).unwrap(), solve_rows(&rows).unwrap());
    }

    #[test]
    fn test_negative_costs() {
        let cost = vec![vec![-5.0, -1.0], vec![-2.0, -8.0]];
        let a = solve_rows(&cost).unwrap();
        assert_eq!(a.cost, -13.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let err = solve_rows(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = solve_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = solve_rows(&[vec![1.0, f64::NAN], vec![0.0, 1.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_empty_typed_matrix() {
        let a = solve(&SquareMatrix::zeros(0)).unwrap();
        assert!(a.pairs.is_empty());
        assert_eq!(a.cost, 0.0);
    }
}
