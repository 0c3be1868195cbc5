//! A* over `petgraph` graphs.

use petgraph::graph::{Graph, IndexType, NodeIndex};
use petgraph::EdgeType;

use super::astar::find_path;
use crate::error::{Error, Result};

/// Cheapest node path between two nodes of a `petgraph::Graph`.
///
/// `edge_cost` prices an edge from its weight; when several edges connect the
/// same pair of nodes the cheapest one is used. Directed graphs follow
/// outgoing edges only.
///
/// Fails with [`Error::InvalidArgument`] when `start` or `goal` is not a node
/// of `graph`, and with [`Error::PathNotFound`] when `goal` is unreachable.
pub fn find_path_in_graph<N, E, Ty, Ix, C, H>(
    graph: &Graph<N, E, Ty, Ix>,
    start: NodeIndex<Ix>,
    goal: NodeIndex<Ix>,
    mut edge_cost: C,
    mut heuristic: H,
) -> Result<Vec<NodeIndex<Ix>>>
where
    Ty: EdgeType,
    Ix: IndexType,
    C: FnMut(&E) -> f64,
    H: FnMut(NodeIndex<Ix>, NodeIndex<Ix>) -> f64,
{
    for (name, node) in [("start", start), ("goal", goal)] {
        if graph.node_weight(node).is_none() {
            return Err(Error::InvalidArgument {
                name,
                message: "not a node of the graph",
            });
        }
    }

    find_path(
        start,
        goal,
        |&a, &b| {
            graph
                .edges_connecting(a, b)
                .map(|e| edge_cost(e.weight()))
                .fold(f64::INFINITY, f64::min)
        },
        |&a, &b| heuristic(a, b),
        |&n| graph.neighbors(n),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use petgraph::graph::{DiGraph, UnGraph};

    #[test]
    fn test_weighted_detour() {
        let mut g: UnGraph<(), f64> = UnGraph::new_undirected();
        let n: Vec<_> = (0..5).map(|_| g.add_node(())).collect();
        let _ = g.add_edge(n[0], n[4], 10.0);
        let _ = g.add_edge(n[0], n[1], 1.0);
        let _ = g.add_edge(n[1], n[2], 1.0);
        let _ = g.add_edge(n[2], n[3], 1.0);
        let _ = g.add_edge(n[3], n[4], 1.0);

        let path = find_path_in_graph(&g, n[0], n[4], |w| *w, |_, _| 0.0).unwrap();
        assert_eq!(path, vec![n[0], n[1], n[2], n[3], n[4]]);
    }

    #[test]
    fn test_parallel_edges_use_cheapest() {
        let mut g: UnGraph<(), f64> = UnGraph::new_undirected();
        let a = g.add_node(());
        let b = g.add_node(());
        let c = g.add_node(());
        let _ = g.add_edge(a, b, 9.0);
        let _ = g.add_edge(a, b, 1.0);
        let _ = g.add_edge(a, c, 3.0);
        let _ = g.add_edge(c, b, 3.0);

        let path = find_path_in_graph(&g, a, b, |w| *w, |_, _| 0.0).unwrap();
        assert_eq!(path, vec![a, b]);
    }

    #[test]
    fn test_directed_edges_are_one_way() {
        let mut g: DiGraph<(), f64> = DiGraph::new();
        let a = g.add_node(());
        let b = g.add_node(());
        let _ = g.add_edge(a, b, 1.0);

        assert_eq!(
            find_path_in_graph(&g, a, b, |w| *w, |_, _| 0.0).unwrap(),
            vec![a, b]
        );
        let err = find_path_in_graph(&g, b, a, |w| *w, |_, _| 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unknown_node() {
        let mut g: UnGraph<(), f64> = UnGraph::new_undirected();
        let a = g.add_node(());
        let err = find_path_in_graph(&g, a, NodeIndex::new(7), |w| *w, |_, _| 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
