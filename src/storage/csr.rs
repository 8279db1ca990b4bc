//! CSR (Compressed Sparse Row) snapshot of a [`Graph`]
//!
//! Based on `GraphBLAST` (Yang et al., ACM `ToMS` 2022) sparse layouts. A
//! snapshot is read-only: it freezes the store's adjacency into flat arrays
//! while keeping the store's [`EdgeId`]s, so parent pointers recorded over a
//! snapshot resolve against the original store too.
//!
//! # CSR Format
//!
//! ```text
//! Graph: 0 → 1 (e0), 0 → 2 (e1), 1 → 2 (e2)
//!
//! CSR:
//!   row_offsets: [0, 2, 3, 3]   // Node 0: edges [0..2), Node 1: [2..3), Node 2: [3..3)
//!   col_indices: [1, 2, 2]
//!   edge_ids:    [e0, e1, e2]
//!   edge_weights: [1.0, 1.0, 1.0]
//! ```

use super::graph::Graph;
use super::topology::{EdgeId, EdgeRef, NodeId, Topology};
use crate::error::GraphError;
use anyhow::Result;

const NO_POSITION: u32 = u32::MAX;

/// Frozen forward + reverse CSR adjacency
///
/// Optimized for:
/// - O(1) access to outgoing edges (via forward CSR)
/// - O(1) access to incoming edges (via reverse CSR)
/// - Cache-friendly sequential scans in frontier rounds
///
/// # Example
///
/// ```
/// use frontier_graph::{CsrGraph, Graph, NodeId};
///
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(0), NodeId(2), 1.0),
/// ]).unwrap();
/// let csr = CsrGraph::from_graph(&graph);
///
/// assert_eq!(csr.outgoing_neighbors(NodeId(0)).unwrap(), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// Forward CSR: node i's edges occupy `row_offsets[i]..row_offsets[i + 1]`
    row_offsets: Vec<u32>,

    /// Forward CSR: edge targets
    col_indices: Vec<u32>,

    /// Forward CSR: store edge ids
    edge_ids: Vec<EdgeId>,

    /// Forward CSR: edge weights
    edge_weights: Vec<f32>,

    /// Forward CSR: edge sources (lets `edge(id)` answer in O(1))
    edge_sources: Vec<u32>,

    /// Reverse CSR: node i's in-edges occupy `rev_row_offsets[i]..rev_row_offsets[i + 1]`
    rev_row_offsets: Vec<u32>,

    /// Reverse CSR: edge sources
    rev_col_indices: Vec<u32>,

    /// Reverse CSR: store edge ids
    rev_edge_ids: Vec<EdgeId>,

    /// Reverse CSR: edge weights (same as forward, reordered)
    rev_edge_weights: Vec<f32>,

    /// Edge id → forward position (`NO_POSITION` for removed ids)
    edge_positions: Vec<u32>,

    /// Live-node flags (removed ids stay as holes)
    live: Vec<bool>,

    num_nodes: usize,
}

impl CsrGraph {
    /// Freeze a [`Graph`] into CSR form
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Graphs >4B edges not supported
    pub fn from_graph(graph: &Graph) -> Self {
        let bound = graph.node_bound();
        let num_edges = graph.num_edges();

        let mut row_offsets = Vec::with_capacity(bound + 1);
        let mut col_indices = Vec::with_capacity(num_edges);
        let mut edge_ids = Vec::with_capacity(num_edges);
        let mut edge_weights = Vec::with_capacity(num_edges);
        let mut edge_sources = Vec::with_capacity(num_edges);
        let mut edge_positions = vec![NO_POSITION; graph.edge_bound()];

        let mut rev_row_offsets = Vec::with_capacity(bound + 1);
        let mut rev_col_indices = Vec::with_capacity(num_edges);
        let mut rev_edge_ids = Vec::with_capacity(num_edges);
        let mut rev_edge_weights = Vec::with_capacity(num_edges);

        let mut live = vec![false; bound];

        row_offsets.push(0);
        rev_row_offsets.push(0);

        for idx in 0..bound {
            let node = NodeId(idx as u32);
            live[idx] = graph.contains_node(node);

            for edge in graph.out_edges(node) {
                edge_positions[edge.id.index()] = col_indices.len() as u32;
                col_indices.push(edge.target.0);
                edge_ids.push(edge.id);
                edge_weights.push(edge.weight);
                edge_sources.push(edge.source.0);
            }
            row_offsets.push(col_indices.len() as u32);

            for edge in graph.in_edges(node) {
                rev_col_indices.push(edge.source.0);
                rev_edge_ids.push(edge.id);
                rev_edge_weights.push(edge.weight);
            }
            rev_row_offsets.push(rev_col_indices.len() as u32);
        }

        Self {
            row_offsets,
            col_indices,
            edge_ids,
            edge_weights,
            edge_sources,
            rev_row_offsets,
            rev_col_indices,
            rev_edge_ids,
            rev_edge_weights,
            edge_positions,
            live,
            num_nodes: graph.num_nodes(),
        }
    }

    /// Build a store from an edge list and freeze it
    ///
    /// # Errors
    ///
    /// Propagates [`Graph::from_edge_list`] failures.
    pub fn from_edge_list(edges: &[(NodeId, NodeId, f32)]) -> Result<Self> {
        Ok(Self::from_graph(&Graph::from_edge_list(edges)?))
    }

    /// Get outgoing neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for out-of-range or removed ids
    pub fn outgoing_neighbors(&self, node: NodeId) -> Result<&[u32]> {
        self.check_node(node)?;
        let (start, end) = self.forward_range(node);
        Ok(&self.col_indices[start..end])
    }

    /// Get incoming neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for out-of-range or removed ids
    pub fn incoming_neighbors(&self, node: NodeId) -> Result<&[u32]> {
        self.check_node(node)?;
        let (start, end) = self.reverse_range(node);
        Ok(&self.rev_col_indices[start..end])
    }

    /// Look up an edge by id
    ///
    /// # Errors
    ///
    /// Returns `EdgeIdNotFound` for ids that were not live at snapshot time
    pub fn edge_ref(&self, id: EdgeId) -> Result<EdgeRef> {
        self.edge(id)
            .ok_or_else(|| GraphError::EdgeIdNotFound(id).into())
    }

    /// Get number of live nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Get number of edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.col_indices.len()
    }

    /// Get forward CSR components (`row_offsets`, `col_indices`, `edge_weights`)
    #[must_use]
    pub fn csr_components(&self) -> (&[u32], &[u32], &[f32]) {
        (&self.row_offsets, &self.col_indices, &self.edge_weights)
    }

    fn forward_range(&self, node: NodeId) -> (usize, usize) {
        let idx = node.index();
        match (self.row_offsets.get(idx), self.row_offsets.get(idx + 1)) {
            (Some(&start), Some(&end)) => (start as usize, end as usize),
            _ => (0, 0),
        }
    }

    fn reverse_range(&self, node: NodeId) -> (usize, usize) {
        let idx = node.index();
        match (self.rev_row_offsets.get(idx), self.rev_row_offsets.get(idx + 1)) {
            (Some(&start), Some(&end)) => (start as usize, end as usize),
            _ => (0, 0),
        }
    }

    fn forward_edge(&self, position: usize) -> EdgeRef {
        EdgeRef {
            id: self.edge_ids[position],
            source: NodeId(self.edge_sources[position]),
            target: NodeId(self.col_indices[position]),
            weight: self.edge_weights[position],
        }
    }
}

impl Topology for CsrGraph {
    fn node_bound(&self) -> usize {
        self.live.len()
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.live.get(node.index()).copied().unwrap_or(false)
    }

    fn edge(&self, id: EdgeId) -> Option<EdgeRef> {
        let position = *self.edge_positions.get(id.index())?;
        if position == NO_POSITION {
            return None;
        }
        Some(self.forward_edge(position as usize))
    }

    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_ {
        let (start, end) = self.forward_range(node);
        (start..end).map(move |position| self.forward_edge(position))
    }

    fn in_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_ {
        let (start, end) = self.reverse_range(node);
        (start..end).map(move |position| EdgeRef {
            id: self.rev_edge_ids[position],
            source: NodeId(self.rev_col_indices[position]),
            target: node,
            weight: self.rev_edge_weights[position],
        })
    }

    fn out_edge_at(&self, node: NodeId, position: usize) -> Option<EdgeRef> {
        let (start, end) = self.forward_range(node);
        let absolute = start + position;
        (absolute < end).then(|| self.forward_edge(absolute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let csr = CsrGraph::from_graph(&Graph::new());
        assert_eq!(csr.num_nodes(), 0);
        assert_eq!(csr.num_edges(), 0);
        assert_eq!(csr.csr_components().0, &[0]);
    }

    #[test]
    fn test_from_edge_list_simple() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(0), NodeId(2), 1.0),
            (NodeId(1), NodeId(2), 1.0),
        ];

        let csr = CsrGraph::from_edge_list(&edges).unwrap();

        assert_eq!(csr.num_nodes(), 3);
        assert_eq!(csr.num_edges(), 3);

        let (row_offsets, col_indices, weights) = csr.csr_components();
        assert_eq!(row_offsets, &[0, 2, 3, 3]);
        assert_eq!(col_indices, &[1, 2, 2]);
        assert_eq!(weights, &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_reverse_csr_structure() {
        let edges = vec![
            (NodeId(0), NodeId(1), 1.0), // 0 → 1
            (NodeId(0), NodeId(2), 2.0), // 0 → 2
            (NodeId(1), NodeId(2), 3.0), // 1 → 2
        ];
        let csr = CsrGraph::from_edge_list(&edges).unwrap();

        let empty: &[u32] = &[];
        assert_eq!(csr.incoming_neighbors(NodeId(0)).unwrap(), empty);
        assert_eq!(csr.incoming_neighbors(NodeId(1)).unwrap(), &[0]);
        assert_eq!(csr.incoming_neighbors(NodeId(2)).unwrap(), &[0, 1]);

        let weights: Vec<f32> = csr.in_edges(NodeId(2)).map(|e| e.weight).collect();
        assert_eq!(weights, vec![2.0, 3.0]);
    }

    #[test]
    fn test_snapshot_keeps_store_edge_ids() {
        let mut graph = Graph::from_edge_list(&[
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(2), 2.0),
            (NodeId(2), NodeId(0), 3.0),
        ])
        .unwrap();
        let removed = graph.remove_edge(NodeId(0), NodeId(1)).unwrap();

        let csr = CsrGraph::from_graph(&graph);
        assert_eq!(csr.num_edges(), 2);
        assert!(csr.edge(removed).is_none());

        for edge in graph.edges() {
            assert_eq!(csr.edge_ref(edge.id).unwrap(), edge);
        }
    }

    #[test]
    fn test_snapshot_preserves_holes() {
        let mut graph = Graph::from_edge_list(&[(NodeId(0), NodeId(2), 1.0)]).unwrap();
        graph.ensure_node(NodeId(4));

        let csr = CsrGraph::from_graph(&graph);
        assert_eq!(csr.node_bound(), 5);
        assert_eq!(csr.num_nodes(), 3);
        assert!(!csr.contains_node(NodeId(1)));
        assert!(csr.outgoing_neighbors(NodeId(1)).is_err());
        assert!(csr.outgoing_neighbors(NodeId(9)).is_err());
    }

    #[test]
    fn test_out_edge_at_matches_iteration() {
        let csr = CsrGraph::from_edge_list(&[
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(0), NodeId(2), 2.0),
            (NodeId(1), NodeId(2), 3.0),
        ])
        .unwrap();

        let iterated: Vec<EdgeRef> = csr.out_edges(NodeId(0)).collect();
        let indexed: Vec<EdgeRef> = (0..)
            .map_while(|i| csr.out_edge_at(NodeId(0), i))
            .collect();
        assert_eq!(iterated, indexed);
        assert!(csr.out_edge_at(NodeId(1), 1).is_none());
    }
}
