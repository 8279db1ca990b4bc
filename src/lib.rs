//! frontier-graph: frontier-propagation graph kernel
//!
//! # Overview
//!
//! frontier-graph is the shared computational core for graph algorithms over
//! dense-indexed directed graphs: a bulk-synchronous frontier engine driven by
//! pluggable exploration policies, pooled per-node scratch buffers, and the
//! shortest-path and connectivity kernels built on them.
//!
//! # Quick Start
//!
//! ```
//! use frontier_graph::{
//!     DistancePolicy, EngineConfig, FrontierEngine, Graph, LowLinkFinder, NodeId, ScratchPool,
//! };
//!
//! // Build a graph: 0 → 1 → 2 → 0, plus 2 → 3
//! let mut graph = Graph::from_edge_list(&[
//!     (NodeId(0), NodeId(1), 1.0),
//!     (NodeId(1), NodeId(2), 1.0),
//!     (NodeId(2), NodeId(0), 1.0),
//! ])?;
//! graph.ensure_node(NodeId(3));
//! graph.add_edge(NodeId(2), NodeId(3), 4.0)?;
//!
//! // One pool serves every run
//! let pool = ScratchPool::new();
//!
//! // Shortest paths from node 0, parallel rounds
//! let policy = DistancePolicy::new(&graph, &pool, NodeId(0));
//! FrontierEngine::new(&graph, &pool, EngineConfig::parallel()).run(&policy)?;
//! assert_eq!(policy.distance(NodeId(3))?, 6.0);
//! assert_eq!(policy.get_path(NodeId(0), NodeId(3))?.len(), 4);
//!
//! // Strongly connected components
//! let scc = LowLinkFinder::new(&graph, &pool).run()?;
//! assert!(scc.same_component(NodeId(0), NodeId(2))?);
//! assert!(!scc.same_component(NodeId(0), NodeId(3))?);
//! # Ok::<(), frontier_graph::Error>(())
//! ```
//!
//! # Architecture
//!
//! - **Storage**: mutable [`Graph`] store and read-only [`CsrGraph`] snapshot,
//!   both behind the [`Topology`] seam
//! - **Scratch**: [`ScratchPool`] of node-indexed buffers, returned on drop
//! - **Engine**: [`FrontierEngine`] rounds, sequential or rayon-parallel
//! - **Algorithms**: distance, any-path and meet-in-the-middle policies;
//!   union-find and low-link SCC detection

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod config;
pub mod engine;
pub mod error;
pub mod scratch;
pub mod storage;

// Re-export core types
pub use algorithms::{
    any_path, bfs, bidirectional_path, connected_components, find_callers, shortest_path,
    shortest_paths, strongly_connected_components, weak_components, AnyPathPolicy, DisjointSet,
    DistancePolicy, LowLinkFinder, LowLinkResult, MeetInTheMiddlePolicy,
};
pub use config::{DefaultConfiguration, EngineConfig, ExecutionMode, GraphConfiguration};
pub use engine::{ExplorationPolicy, FrontierEngine, RoundContext, RunSummary, Seed, Step};
pub use error::GraphError;
pub use scratch::{PoolStats, ScratchBuffer, ScratchPool};
pub use storage::{CsrGraph, Direction, EdgeId, EdgeRef, Graph, NodeData, NodeId, Topology};

// Error type
pub use anyhow::{Error, Result};
