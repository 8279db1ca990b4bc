//! Failure kinds surfaced by the store, the engine and the kernels
//!
//! The public API returns [`anyhow::Result`]; the conditions a caller may want
//! to branch on are carried as a [`GraphError`] and can be recovered with
//! `err.downcast_ref::<GraphError>()`.

use crate::storage::{EdgeId, NodeId};
use thiserror::Error;

/// Distinguishable graph failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Node id is outside `[0, MaxNodeId]` or was removed
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    /// No edge between the given endpoints
    #[error("Edge {from} -> {to} not found")]
    EdgeNotFound {
        /// Edge source
        from: NodeId,
        /// Edge target
        to: NodeId,
    },

    /// Edge id was never issued or was removed
    #[error("Edge id {0} not found")]
    EdgeIdNotFound(EdgeId),

    /// `add_node` on an id that is already live
    #[error("Node {0} already exists")]
    NodeExists(NodeId),

    /// Node still has incident edges
    #[error("Node {node} still has {degree} incident edges")]
    NodeInUse {
        /// Node that was asked to be removed
        node: NodeId,
        /// Number of incident edges still present
        degree: usize,
    },

    /// Weight function produced a negative (or NaN) weight
    #[error("Edge {edge} has invalid weight {weight}; shortest paths need non-negative weights")]
    NegativeWeight {
        /// Offending edge
        edge: EdgeId,
        /// Returned weight
        weight: f32,
    },

    /// Result queried before the owning run completed
    #[error("No completed run to query")]
    NotComputed,
}
