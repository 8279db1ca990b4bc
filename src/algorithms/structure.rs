//! Graph structure algorithms: weak components and strongly connected components
//!
//! Provides structural analysis algorithms:
//! - `weak_components` / `connected_components`: union-find over every edge
//! - `LowLinkFinder`: Tarjan's low-link scan with an explicit work stack
//! - `strongly_connected_components`: grouped SCC membership
//!
//! # Example
//!
//! ```
//! use frontier_graph::{connected_components, strongly_connected_components, Graph, NodeId, ScratchPool};
//!
//! // Build a graph with two components: 0 → 1, 2 → 3
//! let graph = Graph::from_edge_list(&[
//!     (NodeId(0), NodeId(1), 1.0),
//!     (NodeId(2), NodeId(3), 1.0),
//! ]).unwrap();
//! let pool = ScratchPool::new();
//!
//! // Two weakly connected components
//! assert_eq!(connected_components(&graph).unwrap(), 2);
//!
//! // Four SCCs (each node is its own SCC in a DAG)
//! let sccs = strongly_connected_components(&graph, &pool).unwrap();
//! assert_eq!(sccs.len(), 4);
//! ```

use super::union_find::DisjointSet;
use crate::error::GraphError;
use crate::scratch::{ScratchBuffer, ScratchPool};
use crate::storage::{NodeId, Topology};
use anyhow::Result;
use tracing::debug;

/// Low-link / discovery value of a node the scan never reached
pub const UNVISITED: u32 = u32::MAX;

/// Union every edge's endpoints into a forest over the live nodes
///
/// Treats the graph as undirected for connectivity purposes.
///
/// # Errors
///
/// Propagates `NodeNotFound` if the graph yields an edge to a missing node.
#[allow(clippy::cast_possible_truncation)] // ids are u32 by construction
pub fn weak_components<G: Topology + ?Sized>(graph: &G) -> Result<DisjointSet> {
    let mut forest = DisjointSet::from_topology(graph);
    for index in 0..graph.node_bound() {
        for edge in graph.out_edges(NodeId(index as u32)) {
            forest.union(edge.source, edge.target)?;
        }
    }
    Ok(forest)
}

/// Count the number of weakly connected components in the graph
///
/// Two nodes are in the same component if there's a path between them
/// (ignoring edge direction).
///
/// # Errors
///
/// Same as [`weak_components`].
///
/// # Example
///
/// ```
/// use frontier_graph::{connected_components, Graph, NodeId};
///
/// // Two disconnected edges: 0 → 1, 2 → 3
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(2), NodeId(3), 1.0),
/// ]).unwrap();
///
/// assert_eq!(connected_components(&graph).unwrap(), 2);
/// ```
pub fn connected_components<G: Topology + ?Sized>(graph: &G) -> Result<usize> {
    Ok(weak_components(graph)?.set_count())
}

/// Iterative Tarjan scan producing discovery and low-link values
///
/// The recursion of the textbook formulation is replaced by an explicit stack
/// of `(node, out-edge cursor)` frames, so chains of any length are safe.
///
/// Textbook low-link values only identify components within one DFS tree.
/// This scan rewrites every member's low-link to its component root's
/// discovery index when the component closes, so equal low-link means same
/// component across the whole scan.
pub struct LowLinkFinder<'g, 'p, G: Topology + ?Sized> {
    graph: &'g G,
    pool: &'p ScratchPool,
}

/// Per-node discovery index, low-link value and component id of one scan
///
/// Holds its arrays as scratch buffers; dropping the result returns them to
/// the pool.
pub struct LowLinkResult<'p> {
    discovery: ScratchBuffer<'p, u32>,
    low_link: ScratchBuffer<'p, u32>,
    component: ScratchBuffer<'p, u32>,
    count: usize,
}

impl<'g, 'p, G: Topology + ?Sized> LowLinkFinder<'g, 'p, G> {
    /// Finder over `graph` renting its arrays from `pool`
    pub const fn new(graph: &'g G, pool: &'p ScratchPool) -> Self {
        Self { graph, pool }
    }

    /// Scan every live node, roots taken in id order
    ///
    /// # Errors
    ///
    /// Infallible for a consistent graph; shares the signature of
    /// [`run_from`](Self::run_from).
    #[allow(clippy::cast_possible_truncation)] // ids are u32 by construction
    pub fn run(&self) -> Result<LowLinkResult<'p>> {
        let roots: Vec<NodeId> = (0..self.graph.node_bound())
            .map(|index| NodeId(index as u32))
            .filter(|&node| self.graph.contains_node(node))
            .collect();
        self.run_from(&roots)
    }

    /// Scan only what is reachable from `roots`
    ///
    /// Pass the members of one weak component (see [`weak_components`]) to
    /// restrict the scan to that component. Nodes not reached stay
    /// [`UNVISITED`].
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if a root is not in the graph.
    pub fn run_from(&self, roots: &[NodeId]) -> Result<LowLinkResult<'p>> {
        for &root in roots {
            self.graph.check_node(root)?;
        }

        let mut discovery = self.pool.rent_filled(self.graph.node_bound(), UNVISITED);
        let mut low_link = self.pool.rent_filled(self.graph.node_bound(), UNVISITED);
        let mut component = self.pool.rent_filled(self.graph.node_bound(), UNVISITED);
        let mut on_stack = self.pool.rent_filled(self.graph.node_bound(), false);

        let mut next_index: u32 = 0;
        let mut count: u32 = 0;
        let mut members: Vec<NodeId> = Vec::new();
        let mut frames: Vec<(NodeId, usize)> = Vec::new();

        for &root in roots {
            if discovery[root.index()] != UNVISITED {
                continue;
            }
            discovery[root.index()] = next_index;
            low_link[root.index()] = next_index;
            next_index += 1;
            members.push(root);
            on_stack[root.index()] = true;
            frames.push((root, 0));

            while let Some(frame) = frames.last_mut() {
                let (node, position) = *frame;

                if let Some(edge) = self.graph.out_edge_at(node, position) {
                    frame.1 += 1;
                    let next = edge.target;
                    if !self.graph.contains_node(next) {
                        continue;
                    }
                    if discovery[next.index()] == UNVISITED {
                        discovery[next.index()] = next_index;
                        low_link[next.index()] = next_index;
                        next_index += 1;
                        members.push(next);
                        on_stack[next.index()] = true;
                        frames.push((next, 0));
                    } else if on_stack[next.index()] {
                        low_link[node.index()] =
                            low_link[node.index()].min(discovery[next.index()]);
                    }
                    continue;
                }

                // Every out-edge explored: retreat to the parent frame
                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    low_link[parent.index()] =
                        low_link[parent.index()].min(low_link[node.index()]);
                }

                let root_index = discovery[node.index()];
                if low_link[node.index()] == root_index {
                    while let Some(member) = members.pop() {
                        on_stack[member.index()] = false;
                        component[member.index()] = count;
                        low_link[member.index()] = root_index;
                        if member == node {
                            break;
                        }
                    }
                    count += 1;
                }
            }
        }

        debug!(
            visited = next_index,
            components = count,
            "low-link scan finished"
        );

        Ok(LowLinkResult {
            discovery,
            low_link,
            component,
            count: count as usize,
        })
    }
}

impl LowLinkResult<'_> {
    /// Low-link value of `node`, or [`UNVISITED`] for nodes the scan skipped
    /// (including ids absent from the graph)
    #[must_use]
    pub fn low_link(&self, node: NodeId) -> u32 {
        self.low_link.get(node.index()).copied().unwrap_or(UNVISITED)
    }

    /// Discovery index of `node`, or [`UNVISITED`]
    #[must_use]
    pub fn discovery(&self, node: NodeId) -> u32 {
        self.discovery.get(node.index()).copied().unwrap_or(UNVISITED)
    }

    /// Whether `a` and `b` are strongly connected
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for nodes the scan did not visit.
    pub fn same_component(&self, a: NodeId, b: NodeId) -> Result<bool> {
        Ok(self.visited_low_link(a)? == self.visited_low_link(b)?)
    }

    /// Component index of `node`; components are numbered in the order the
    /// scan closed them (reverse topological order of the condensation)
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for nodes the scan did not visit.
    pub fn component_id(&self, node: NodeId) -> Result<usize> {
        match self.component.get(node.index()).copied() {
            Some(id) if id != UNVISITED => Ok(id as usize),
            _ => Err(GraphError::NodeNotFound(node).into()),
        }
    }

    /// Members of every component, indexed by component id, members in id order
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // ids are u32 by construction
    pub fn components(&self) -> Vec<Vec<NodeId>> {
        let mut groups = vec![Vec::new(); self.count];
        for (index, &id) in self.component.iter().enumerate() {
            if let Some(group) = groups.get_mut(id as usize) {
                group.push(NodeId(index as u32));
            }
        }
        groups
    }

    /// Number of strongly connected components found
    #[must_use]
    pub const fn component_count(&self) -> usize {
        self.count
    }

    /// Whether the scan reached `node`
    #[must_use]
    pub fn is_visited(&self, node: NodeId) -> bool {
        self.discovery(node) != UNVISITED
    }

    fn visited_low_link(&self, node: NodeId) -> Result<u32> {
        match self.low_link(node) {
            UNVISITED => Err(GraphError::NodeNotFound(node).into()),
            value => Ok(value),
        }
    }
}

/// Find strongly connected components
///
/// A strongly connected component (SCC) is a maximal set of nodes where
/// every node is reachable from every other node following edge directions.
///
/// # Returns
///
/// A vector of SCCs, where each SCC is a vector of `NodeId`s.
/// SCCs are returned in reverse topological order (sink SCCs first).
///
/// # Errors
///
/// Infallible for a consistent graph.
///
/// # Example
///
/// ```
/// use frontier_graph::{strongly_connected_components, Graph, NodeId, ScratchPool};
///
/// // Cycle: 0 → 1 → 2 → 0
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
///     (NodeId(2), NodeId(0), 1.0),
/// ]).unwrap();
/// let pool = ScratchPool::new();
///
/// let sccs = strongly_connected_components(&graph, &pool).unwrap();
/// // All three nodes form one SCC
/// assert_eq!(sccs.len(), 1);
/// assert_eq!(sccs[0].len(), 3);
/// ```
pub fn strongly_connected_components<G: Topology + ?Sized>(
    graph: &G,
    pool: &ScratchPool,
) -> Result<Vec<Vec<NodeId>>> {
    Ok(LowLinkFinder::new(graph, pool).run()?.components())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CsrGraph, Graph};

    fn graph(edges: &[(u32, u32)]) -> Graph {
        let edges: Vec<_> = edges
            .iter()
            .map(|&(s, t)| (NodeId(s), NodeId(t), 1.0))
            .collect();
        Graph::from_edge_list(&edges).unwrap()
    }

    #[test]
    fn test_empty_graph_components() {
        let g = Graph::new();
        let pool = ScratchPool::new();
        assert_eq!(connected_components(&g).unwrap(), 0);
        assert!(strongly_connected_components(&g, &pool).unwrap().is_empty());
    }

    #[test]
    fn test_two_disconnected_edges() {
        let g = graph(&[(0, 1), (2, 3)]);
        assert_eq!(connected_components(&g).unwrap(), 2);
    }

    #[test]
    fn test_diamond_single_component() {
        // Diamond: 0 → 1 → 3, 0 → 2 → 3
        let g = graph(&[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(connected_components(&g).unwrap(), 1);
    }

    #[test]
    fn test_isolated_node_is_own_component() {
        let mut g = graph(&[(0, 1)]);
        g.ensure_node(NodeId(2));
        assert_eq!(connected_components(&g).unwrap(), 2);
    }

    #[test]
    fn test_scc_dag_each_node_separate() {
        // DAG: 0 → 1 → 2 (no cycles, each node is its own SCC)
        let g = graph(&[(0, 1), (1, 2)]);
        let pool = ScratchPool::new();
        let result = LowLinkFinder::new(&g, &pool).run().unwrap();

        assert_eq!(result.component_count(), 3);
        assert!(!result.same_component(NodeId(0), NodeId(1)).unwrap());
        // Sinks close first
        assert_eq!(result.component_id(NodeId(2)).unwrap(), 0);
        assert_eq!(result.component_id(NodeId(0)).unwrap(), 2);
    }

    #[test]
    fn test_scc_simple_cycle() {
        // Cycle: 0 → 1 → 2 → 0
        let g = graph(&[(0, 1), (1, 2), (2, 0)]);
        let pool = ScratchPool::new();
        let result = LowLinkFinder::new(&g, &pool).run().unwrap();

        assert_eq!(result.component_count(), 1);
        assert_eq!(result.low_link(NodeId(0)), 0);
        assert_eq!(result.low_link(NodeId(1)), 0);
        assert_eq!(result.low_link(NodeId(2)), 0);
        assert_eq!(result.discovery(NodeId(2)), 2);
    }

    #[test]
    fn test_scc_self_loop() {
        let g = graph(&[(0, 0)]);
        let pool = ScratchPool::new();
        let sccs = strongly_connected_components(&g, &pool).unwrap();
        assert_eq!(sccs, vec![vec![NodeId(0)]]);
    }

    #[test]
    fn test_scc_complex_graph() {
        // SCC1: 0 ↔ 1, SCC2: 2 ↔ 3, Bridge: 1 → 2
        let g = graph(&[(0, 1), (1, 0), (1, 2), (2, 3), (3, 2)]);
        let pool = ScratchPool::new();
        let result = LowLinkFinder::new(&g, &pool).run().unwrap();

        assert_eq!(result.component_count(), 2);
        assert!(result.same_component(NodeId(0), NodeId(1)).unwrap());
        assert!(result.same_component(NodeId(2), NodeId(3)).unwrap());
        assert!(!result.same_component(NodeId(1), NodeId(2)).unwrap());
        assert_eq!(
            result.components(),
            vec![vec![NodeId(2), NodeId(3)], vec![NodeId(0), NodeId(1)]]
        );
    }

    #[test]
    fn test_scc_disconnected_with_cycles() {
        let g = graph(&[(0, 1), (1, 2), (2, 0), (3, 4), (4, 3)]);
        let pool = ScratchPool::new();
        let result = LowLinkFinder::new(&g, &pool).run().unwrap();

        assert_eq!(result.component_count(), 2);
        // Rewritten low-links keep the two trees apart
        assert_ne!(result.low_link(NodeId(0)), result.low_link(NodeId(3)));
        let mut sizes: Vec<_> = result.components().iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3]);
    }

    #[test]
    fn test_absent_nodes_get_sentinel() {
        let mut g = graph(&[(0, 1), (1, 0), (2, 3)]);
        g.remove_node_with_edges(NodeId(2)).unwrap();
        let pool = ScratchPool::new();
        let result = LowLinkFinder::new(&g, &pool).run().unwrap();

        assert_eq!(result.low_link(NodeId(2)), UNVISITED);
        assert_eq!(result.low_link(NodeId(500)), UNVISITED);
        assert!(!result.is_visited(NodeId(2)));
        assert!(result.component_id(NodeId(2)).is_err());
        assert!(result.same_component(NodeId(0), NodeId(500)).is_err());
        assert!(result.is_visited(NodeId(3)));
    }

    #[test]
    fn test_run_from_restricts_scan() {
        let g = graph(&[(0, 1), (1, 0), (2, 3), (3, 2)]);
        let pool = ScratchPool::new();
        let forest = weak_components(&g).unwrap();
        assert_eq!(forest.set_count(), 2);

        let result = LowLinkFinder::new(&g, &pool)
            .run_from(&[NodeId(2)])
            .unwrap();
        assert_eq!(result.component_count(), 1);
        assert!(result.same_component(NodeId(2), NodeId(3)).unwrap());
        assert!(!result.is_visited(NodeId(0)));

        let err = LowLinkFinder::new(&g, &pool)
            .run_from(&[NodeId(9)])
            .err()
            .unwrap();
        assert_eq!(
            err.downcast_ref::<GraphError>(),
            Some(&GraphError::NodeNotFound(NodeId(9)))
        );
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        // Recursive DFS would need 100k frames
        let n = 100_000_u32;
        let mut edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        edges.push((n - 1, 0));
        let g = CsrGraph::from_graph(&graph(&edges));
        let pool = ScratchPool::new();

        let result = LowLinkFinder::new(&g, &pool).run().unwrap();
        assert_eq!(result.component_count(), 1);
        assert!(result.same_component(NodeId(0), NodeId(n - 1)).unwrap());
    }

    #[test]
    fn test_result_releases_buffers() {
        let g = graph(&[(0, 1)]);
        let pool = ScratchPool::new();
        {
            let result = LowLinkFinder::new(&g, &pool).run().unwrap();
            assert_eq!(pool.outstanding(), 3);
            assert_eq!(result.component_count(), 2);
        }
        assert_eq!(pool.outstanding(), 0);
    }
}
