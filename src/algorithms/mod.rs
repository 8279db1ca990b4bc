//! Graph algorithms built on the frontier engine (shortest paths, any-path
//! search, meet-in-the-middle) and the connectivity kernel (union-find, SCC)

pub mod bidirectional;
pub mod shortest_path;
pub mod structure;
pub mod traversal;
pub mod union_find;

pub use bidirectional::{bidirectional_path, MeetInTheMiddlePolicy};
pub use shortest_path::{shortest_path, shortest_paths, DistancePolicy};
pub use structure::{
    connected_components, strongly_connected_components, weak_components, LowLinkFinder,
    LowLinkResult,
};
pub use traversal::{any_path, bfs, find_callers, AnyPathPolicy};
pub use union_find::DisjointSet;

use crate::error::GraphError;
use crate::storage::{EdgeId, EdgeRef, NodeId, Topology};
use anyhow::Result;

/// Parent-slot value for a node that was never reached
pub(crate) const UNREACHED: u32 = u32::MAX;
/// Parent-slot value for a run's seed
pub(crate) const ROOT: u32 = u32::MAX - 1;

/// Boxed edge predicate shared by every policy
pub(crate) type EdgeFilter<'a> = Box<dyn Fn(&EdgeRef) -> bool + Send + Sync + 'a>;

/// Walk parent edges from `to` back to `from`
///
/// `parent` yields the raw parent slot of a node (`UNREACHED`, `ROOT`, or an
/// edge id). Returns the edges in `from → to` order, `Some(vec![])` when
/// `from == to` and the node was reached, and `None` when `to` is unreached or
/// `from` is not on its parent chain.
pub(crate) fn trace_parents<G, F>(
    graph: &G,
    from: NodeId,
    to: NodeId,
    parent: F,
) -> Result<Option<Vec<EdgeRef>>>
where
    G: Topology + ?Sized,
    F: Fn(NodeId) -> u32,
{
    if parent(to) == UNREACHED {
        return Ok(None);
    }

    let mut edges = Vec::new();
    let mut current = to;
    // A parent chain never revisits a node, so it is at most node_bound long
    for _ in 0..=graph.node_bound() {
        if current == from {
            edges.reverse();
            return Ok(Some(edges));
        }
        match parent(current) {
            UNREACHED | ROOT => return Ok(None),
            raw => {
                let id = EdgeId(raw);
                let edge = graph.edge(id).ok_or(GraphError::EdgeIdNotFound(id))?;
                edges.push(edge);
                current = edge.opposite(current);
            }
        }
    }
    Ok(None)
}

/// Node sequence of an edge path starting at `from`
pub(crate) fn path_nodes(from: NodeId, edges: &[EdgeRef]) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(from);
    let mut current = from;
    for edge in edges {
        current = edge.opposite(current);
        nodes.push(current);
    }
    nodes
}
