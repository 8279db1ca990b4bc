//! Identifiers and the read-only topology seam walked by the engine
//!
//! Both the mutable [`Graph`](super::Graph) and the frozen
//! [`CsrGraph`](super::CsrGraph) implement [`Topology`], so every exploration
//! policy runs unchanged over either representation.

use crate::error::GraphError;
use anyhow::Result;
use std::fmt;

/// Node identifier (zero-indexed, dense but not necessarily contiguous)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of this node in any node-indexed buffer
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edge identifier, stable for the lifetime of the edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Position of this edge in any edge-indexed buffer
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Borrow-free view of one directed edge
///
/// Every stored edge is directed. An undirected edge is a pair of opposite
/// edges managed by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRef {
    /// Edge identifier
    pub id: EdgeId,
    /// Tail of the edge
    pub source: NodeId,
    /// Head of the edge
    pub target: NodeId,
    /// Stored weight
    pub weight: f32,
}

impl EdgeRef {
    /// The endpoint that is not `node` (`source` for self-loops)
    #[must_use]
    pub fn opposite(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

/// Which incident edges a traversal walks from a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Follow edges source → target
    #[default]
    Out,
    /// Follow edges target → source
    In,
    /// Follow both
    Both,
}

/// Read access to a dense-indexed graph
pub trait Topology {
    /// `MaxNodeId + 1`; the length of every node-indexed scratch buffer
    fn node_bound(&self) -> usize;

    /// Whether `node` is a live node
    fn contains_node(&self, node: NodeId) -> bool;

    /// Look up an edge by id
    fn edge(&self, id: EdgeId) -> Option<EdgeRef>;

    /// Edges leaving `node` (empty for unknown nodes)
    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_;

    /// Edges entering `node` (empty for unknown nodes)
    fn in_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_;

    /// The `position`-th out-edge of `node`, in the order `out_edges` yields them
    ///
    /// Lets depth-first walks keep an integer cursor per stack frame.
    fn out_edge_at(&self, node: NodeId, position: usize) -> Option<EdgeRef>;

    /// Highest id ever issued, if any
    #[allow(clippy::cast_possible_truncation)] // ids are u32 by construction
    fn max_node_id(&self) -> Option<NodeId> {
        self.node_bound()
            .checked_sub(1)
            .map(|max| NodeId(max as u32))
    }

    /// Fail with [`GraphError::NodeNotFound`] unless `node` is live
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for out-of-range or removed ids.
    fn check_node(&self, node: NodeId) -> Result<()> {
        if self.contains_node(node) {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound(node).into())
        }
    }
}
