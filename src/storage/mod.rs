//! Graph storage layer
//!
//! Provides the mutable dense-id [`Graph`] store, its read-only CSR snapshot,
//! and the [`Topology`] seam the frontier engine walks.

pub mod csr;
pub mod graph;
pub mod topology;

pub use csr::CsrGraph;
pub use graph::{Graph, NodeData};
pub use topology::{Direction, EdgeId, EdgeRef, NodeId, Topology};
