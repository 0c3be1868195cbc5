//! Shortest-path search.
//!
//! [`find_path`] and [`find_path_by_scan`] work on any state type through
//! caller-supplied cost, heuristic and neighbour callables; the state space
//! never has to be materialised. [`find_path_in_graph`] runs the same search
//! over an explicit `petgraph` graph.

mod astar;
mod graph;

pub use astar::{find_path, find_path_by_scan};
pub use graph::find_path_in_graph;
