//! Generic A* path search over caller-described state spaces.
//!
//! The caller supplies three callables:
//!
//! - `step_cost(a, b)`: cost of moving from `a` to neighbour `b` (non-negative)
//! - `heuristic(a, goal)`: estimated remaining cost from `a`
//! - `neighbors(a)`: states reachable from `a` in one step
//!
//! Search nodes live in a single arena and point at their parent by index,
//! so the path is rebuilt by walking indices back from the goal.
//!
//! ## Expansion order
//!
//! The open node with the lowest *cumulative* cost is expanded first; among
//! equal cumulative costs, the lower estimated total (`cost + heuristic`)
//! wins, then the earlier-discovered node. The heuristic therefore only
//! orders ties. The search still returns a cheapest path, and the two
//! variants below visit nodes in exactly the same order.
//!
//! | Variant | Node bound | Lookup |
//! |---------|-----------|--------|
//! | [`find_path`] | `Ord` | ordered map, ordered open set |
//! | [`find_path_by_scan`] | `PartialEq` | linear scans |

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct SearchNode<N> {
    node: N,
    cost: f64,
    estimate: f64,
    parent: Option<usize>,
    open: bool,
}

impl<N> SearchNode<N> {
    fn key(&self, index: usize) -> OpenKey {
        OpenKey {
            cost: self.cost,
            total: self.cost + self.estimate,
            index,
        }
    }
}

/// Position of a node in the open set.
#[derive(Debug, Clone, Copy)]
struct OpenKey {
    cost: f64,
    total: f64,
    index: usize,
}

impl Ord for OpenKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.total.total_cmp(&other.total))
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl PartialOrd for OpenKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenKey {}

/// Open-set storage.
trait Frontier {
    fn insert(&mut self, key: OpenKey);
    fn remove(&mut self, key: &OpenKey);
    fn pop_min(&mut self) -> Option<OpenKey>;
}

impl Frontier for BTreeSet<OpenKey> {
    fn insert(&mut self, key: OpenKey) {
        let _ = BTreeSet::insert(self, key);
    }

    fn remove(&mut self, key: &OpenKey) {
        let _ = BTreeSet::remove(self, key);
    }

    fn pop_min(&mut self) -> Option<OpenKey> {
        self.pop_first()
    }
}

impl Frontier for Vec<OpenKey> {
    fn insert(&mut self, key: OpenKey) {
        self.push(key);
    }

    fn remove(&mut self, key: &OpenKey) {
        if let Some(pos) = self.iter().position(|k| k == key) {
            let _ = self.swap_remove(pos);
        }
    }

    fn pop_min(&mut self) -> Option<OpenKey> {
        let pos = self
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(pos, _)| pos)?;
        Some(self.swap_remove(pos))
    }
}

/// Lookup from a state to its arena slot.
trait Visited<N> {
    fn find(&self, arena: &[SearchNode<N>], node: &N) -> Option<usize>;
    fn record(&mut self, node: &N, index: usize);
}

struct OrderedVisited<N>(BTreeMap<N, usize>);

impl<N: Ord + Clone> Visited<N> for OrderedVisited<N> {
    fn find(&self, _arena: &[SearchNode<N>], node: &N) -> Option<usize> {
        self.0.get(node).copied()
    }

    fn record(&mut self, node: &N, index: usize) {
        let _ = self.0.insert(node.clone(), index);
    }
}

struct ScannedVisited;

impl<N: PartialEq> Visited<N> for ScannedVisited {
    fn find(&self, arena: &[SearchNode<N>], node: &N) -> Option<usize> {
        arena.iter().position(|s| s.node == *node)
    }

    fn record(&mut self, _node: &N, _index: usize) {}
}

#[allow(clippy::too_many_arguments)]
fn search<N, C, H, G, I, V, F>(
    start: N,
    goal: &N,
    mut step_cost: C,
    mut heuristic: H,
    mut neighbors: G,
    mut visited: V,
    mut open: F,
) -> Result<Vec<N>>
where
    N: PartialEq + Clone,
    C: FnMut(&N, &N) -> f64,
    H: FnMut(&N, &N) -> f64,
    G: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
    V: Visited<N>,
    F: Frontier,
{
    let mut arena = vec![SearchNode {
        estimate: heuristic(&start, goal),
        node: start,
        cost: 0.0,
        parent: None,
        open: true,
    }];
    visited.record(&arena[0].node, 0);
    open.insert(arena[0].key(0));

    let mut expanded = 0usize;
    while let Some(OpenKey { index: current, .. }) = open.pop_min() {
        arena[current].open = false;
        expanded += 1;

        if arena[current].node == *goal {
            let path = reconstruct(&arena, current);
            debug!(
                expanded,
                discovered = arena.len(),
                length = path.len(),
                cost = arena[current].cost,
                "path found"
            );
            return Ok(path);
        }

        let here = arena[current].node.clone();
        let here_cost = arena[current].cost;
        for next in neighbors(&here) {
            let cost = here_cost + step_cost(&here, &next);
            match visited.find(&arena, &next) {
                Some(j) if arena[j].cost <= cost => {}
                Some(j) => {
                    if arena[j].open {
                        open.remove(&arena[j].key(j));
                    }
                    let estimate = heuristic(&next, goal);
                    let slot = &mut arena[j];
                    slot.cost = cost;
                    slot.estimate = estimate;
                    slot.parent = Some(current);
                    slot.open = true;
                    open.insert(slot.key(j));
                }
                None => {
                    let j = arena.len();
                    visited.record(&next, j);
                    arena.push(SearchNode {
                        estimate: heuristic(&next, goal),
                        node: next,
                        cost,
                        parent: Some(current),
                        open: true,
                    });
                    open.insert(arena[j].key(j));
                }
            }
        }
    }

    debug!(expanded, discovered = arena.len(), "no path");
    Err(Error::PathNotFound)
}

fn reconstruct<N: Clone>(arena: &[SearchNode<N>], end: usize) -> Vec<N> {
    let mut path = Vec::new();
    let mut cursor = Some(end);
    while let Some(i) = cursor {
        path.push(arena[i].node.clone());
        cursor = arena[i].parent;
    }
    path.reverse();
    path
}

/// Cheapest path from `start` to `goal`, both ends included.
///
/// States must be totally ordered; they are looked up in ordered maps.
/// Fails with [`Error::PathNotFound`] when `goal` is unreachable.
///
/// ```rust
/// use crnai::search::find_path;
///
/// let path = find_path(
///     0i32,
///     5,
///     |_, _| 1.0,
///     |a, b| f64::from((a - b).abs()),
///     |&n| vec![n - 1, n + 1].into_iter().filter(|m| (0..=9).contains(m)),
/// )
/// .unwrap();
/// assert_eq!(path, vec![0, 1, 2, 3, 4, 5]);
/// ```
pub fn find_path<N, C, H, G, I>(
    start: N,
    goal: N,
    step_cost: C,
    heuristic: H,
    neighbors: G,
) -> Result<Vec<N>>
where
    N: Ord + Clone,
    C: FnMut(&N, &N) -> f64,
    H: FnMut(&N, &N) -> f64,
    G: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    search(
        start,
        &goal,
        step_cost,
        heuristic,
        neighbors,
        OrderedVisited(BTreeMap::new()),
        BTreeSet::new(),
    )
}

/// [`find_path`] for states that only support equality.
///
/// Lookups scan the arena, so this is quadratic in the number of discovered
/// states. Results are identical to [`find_path`] on the same inputs.
pub fn find_path_by_scan<N, C, H, G, I>(
    start: N,
    goal: N,
    step_cost: C,
    heuristic: H,
    neighbors: G,
) -> Result<Vec<N>>
where
    N: PartialEq + Clone,
    C: FnMut(&N, &N) -> f64,
    H: FnMut(&N, &N) -> f64,
    G: FnMut(&N) -> I,
    I: IntoIterator<Item = N>,
{
    search(
        start,
        &goal,
        step_cost,
        heuristic,
        neighbors,
        ScannedVisited,
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    type Edges = Vec<(usize, usize, f64)>;

    fn adjacency(edges: &Edges) -> impl Fn(&usize) -> Vec<usize> + '_ {
        move |&n| {
            edges
                .iter()
                .filter_map(|&(a, b, _)| {
                    if a == n {
                        Some(b)
                    } else if b == n {
                        Some(a)
                    } else {
                        None
                    }
                })
                .collect()
        }
    }

    fn weight(edges: &Edges) -> impl Fn(&usize, &usize) -> f64 + '_ {
        move |&a, &b| {
            edges
                .iter()
                .filter(|&&(x, y, _)| (x == a && y == b) || (x == b && y == a))
                .map(|&(_, _, w)| w)
                .fold(f64::INFINITY, f64::min)
        }
    }

    fn line(n: usize) -> Edges {
        (0..n - 1).map(|i| (i, i + 1, 1.0)).collect()
    }

    fn euclid(a: &usize, b: &usize) -> f64 {
        (*a as f64 - *b as f64).abs()
    }

    #[test]
    fn test_line_graph() {
        let edges = line(10);
        let path = find_path(0, 9, weight(&edges), euclid, adjacency(&edges)).unwrap();
        assert_eq!(path, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_start_is_goal() {
        let edges = line(3);
        let path = find_path(1, 1, weight(&edges), euclid, adjacency(&edges)).unwrap();
        assert_eq!(path, vec![1]);
    }

    #[test]
    fn test_disconnected_is_not_found() {
        let mut edges = line(5);
        edges.extend([(5, 6, 1.0), (6, 7, 1.0)]);
        let err = find_path(0, 7, weight(&edges), euclid, adjacency(&edges)).unwrap_err();
        assert_eq!(err, Error::PathNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = find_path_by_scan(0, 7, weight(&edges), euclid, adjacency(&edges)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_detour_returns_cheapest_path() {
        // The direct 0-3 edge is expensive; the long way round is cheaper.
        let edges: Edges = vec![
            (0, 3, 10.0),
            (0, 1, 1.0),
            (1, 2, 1.0),
            (2, 3, 1.0),
            (3, 4, 1.0),
            (0, 5, 0.5),
            (5, 4, 8.0),
        ];
        let zero = |_: &usize, _: &usize| 0.0;
        let path = find_path(0, 4, weight(&edges), zero, adjacency(&edges)).unwrap();
        assert_eq!(path, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_cheaper_path_replaces_known_entry() {
        // 2 is first reached through the expensive 0-2 edge, then improved via 1.
        let edges: Edges = vec![(0, 2, 5.0), (0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0)];
        let path = find_path(0, 3, weight(&edges), euclid, adjacency(&edges)).unwrap();
        assert_eq!(path, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_variants_agree_on_grid() {
        // 6x6 grid with a wall, states as (row, col) tuples.
        let wall = |r: i32, c: i32| c == 3 && r < 5;
        let neighbors = |&(r, c): &(i32, i32)| {
            [(r - 1, c), (r + 1, c), (r, c - 1), (r, c + 1)]
                .into_iter()
                .filter(|&(r, c)| (0..6).contains(&r) && (0..6).contains(&c) && !wall(r, c))
                .collect::<Vec<_>>()
        };
        let manhattan =
            |a: &(i32, i32), b: &(i32, i32)| f64::from((a.0 - b.0).abs() + (a.1 - b.1).abs());
        let unit = |_: &(i32, i32), _: &(i32, i32)| 1.0;

        let ordered = find_path((0, 0), (0, 5), unit, manhattan, neighbors).unwrap();
        let scanned = find_path_by_scan((0, 0), (0, 5), unit, manhattan, neighbors).unwrap();
        assert_eq!(ordered, scanned);
        assert_eq!(ordered.first(), Some(&(0, 0)));
        assert_eq!(ordered.last(), Some(&(0, 5)));
        // Down to row 5, across, and back up.
        assert_eq!(ordered.len(), 16);
    }
}
