//! Single-source shortest paths by round-based relaxation
//!
//! Each engine round relaxes the out-edges of every node whose distance
//! improved in the previous round; the run ends after a round with no
//! improvements. This is Bellman-Ford with early stop, which needs no
//! priority queue and therefore parallelises across a round's frontier.
//!
//! # Example
//!
//! ```
//! use frontier_graph::{shortest_paths, EngineConfig, Graph, NodeId, ScratchPool};
//!
//! // Build a weighted graph
//! let graph = Graph::from_edge_list(&[
//!     (NodeId(0), NodeId(1), 1.0),
//!     (NodeId(1), NodeId(2), 2.0),
//!     (NodeId(0), NodeId(2), 5.0),
//! ]).unwrap();
//! let pool = ScratchPool::new();
//!
//! // Find shortest paths from node 0
//! let distances = shortest_paths(&graph, &pool, NodeId(0), EngineConfig::default()).unwrap();
//! assert_eq!(distances.get(&NodeId(0)), Some(&0.0));
//! assert_eq!(distances.get(&NodeId(1)), Some(&1.0));
//! assert_eq!(distances.get(&NodeId(2)), Some(&3.0)); // 0→1→2 = 3.0, not 0→2 = 5.0
//! ```

use super::{path_nodes, trace_parents, EdgeFilter, ROOT, UNREACHED};
use crate::config::EngineConfig;
use crate::engine::{ExplorationPolicy, FrontierEngine, RoundContext, RunSummary, Seed, Step};
use crate::error::GraphError;
use crate::scratch::{ScratchBuffer, ScratchPool};
use crate::storage::{EdgeId, EdgeRef, NodeId, Topology};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Label of an unreached node: infinite distance (`0x7F80_0000`), no parent
const UNREACHED_LABEL: u64 = (0x7F80_0000_u64 << 32) | UNREACHED as u64;

/// Distance bits in the high half, parent edge id in the low half
fn pack(distance: f32, parent: u32) -> u64 {
    (u64::from(distance.to_bits()) << 32) | u64::from(parent)
}

#[allow(clippy::cast_possible_truncation)] // halves of a packed u64
fn unpack(label: u64) -> (f32, u32) {
    (f32::from_bits((label >> 32) as u32), label as u32)
}

type WeightFn<'a> = Box<dyn Fn(&EdgeRef) -> f32 + Send + Sync + 'a>;

/// Exploration policy computing distances and parent edges from one source
///
/// Every node's label (distance and parent edge) lives in one `AtomicU64`,
/// so a relaxation is a single compare-and-swap that only ever lowers the
/// distance. Concurrent proposals for the same node therefore converge to
/// the minimum regardless of the order they land in.
///
/// The policy can be driven more than once; each run resets its labels.
/// Results are readable only after a run that converged: an aborted run, or
/// one cut short by `max_rounds`, leaves the policy answering `NotComputed`.
pub struct DistancePolicy<'g, 'p, G: Topology + Sync> {
    graph: &'g G,
    source: NodeId,
    labels: ScratchBuffer<'p, AtomicU64>,
    weight_fn: Option<WeightFn<'g>>,
    condition_fn: Option<EdgeFilter<'g>>,
    computed: AtomicBool,
    done: AtomicBool,
}

impl<'g, 'p, G: Topology + Sync> DistancePolicy<'g, 'p, G> {
    /// Distance policy from `source` using stored edge weights
    pub fn new(graph: &'g G, pool: &'p ScratchPool, source: NodeId) -> Self {
        Self {
            graph,
            source,
            labels: pool.rent_nodes(graph),
            weight_fn: None,
            condition_fn: None,
            computed: AtomicBool::new(false),
            done: AtomicBool::new(false),
        }
    }

    /// Replace the stored weight with `weight_fn(edge)`
    ///
    /// The function must be pure and return non-negative values; a negative
    /// or NaN weight aborts the run with [`GraphError::NegativeWeight`].
    #[must_use]
    pub fn with_weight<F>(mut self, weight_fn: F) -> Self
    where
        F: Fn(&EdgeRef) -> f32 + Send + Sync + 'g,
    {
        self.weight_fn = Some(Box::new(weight_fn));
        self
    }

    /// Skip edges for which `condition_fn(edge)` is false
    #[must_use]
    pub fn with_condition<F>(mut self, condition_fn: F) -> Self
    where
        F: Fn(&EdgeRef) -> bool + Send + Sync + 'g,
    {
        self.condition_fn = Some(Box::new(condition_fn));
        self
    }

    /// Source node
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// Distance from the source (`f32::INFINITY` when unreachable)
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run converged and
    /// `NodeNotFound` for ids not in the graph.
    pub fn distance(&self, node: NodeId) -> Result<f32> {
        self.ensure_computed()?;
        self.graph.check_node(node)?;
        Ok(unpack(self.label(node)).0)
    }

    /// Every reached node with its distance, in id order
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run converged.
    #[allow(clippy::cast_possible_truncation)] // buffer length is node_bound
    pub fn distances(&self) -> Result<Vec<(NodeId, f32)>> {
        self.ensure_computed()?;
        Ok(self
            .labels
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| {
                let (distance, _) = unpack(cell.load(Ordering::Acquire));
                distance
                    .is_finite()
                    .then_some((NodeId(index as u32), distance))
            })
            .collect())
    }

    /// Node path `from → … → to` along recorded parent edges
    ///
    /// `from` is normally the source, but any ancestor of `to` in the
    /// shortest-path tree works. Returns an empty path when no path exists.
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run converged and
    /// `NodeNotFound` for ids not in the graph.
    pub fn get_path(&self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .parent_trace(from, to)?
            .map(|edges| path_nodes(from, &edges))
            .unwrap_or_default())
    }

    /// Edge path `from → … → to`; empty when `to` is unreachable or `from == to`
    ///
    /// # Errors
    ///
    /// Same as [`get_path`](Self::get_path).
    pub fn get_edge_path(&self, from: NodeId, to: NodeId) -> Result<Vec<EdgeRef>> {
        Ok(self.parent_trace(from, to)?.unwrap_or_default())
    }

    /// Edge through which `node` obtained its final distance
    #[must_use]
    pub fn parent_edge(&self, node: NodeId) -> Option<EdgeId> {
        match self.parent_slot(node) {
            UNREACHED | ROOT => None,
            raw => Some(EdgeId(raw)),
        }
    }

    /// Whether the last run converged (a round produced no improvement)
    #[must_use]
    pub fn done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    fn parent_trace(&self, from: NodeId, to: NodeId) -> Result<Option<Vec<EdgeRef>>> {
        self.ensure_computed()?;
        self.graph.check_node(from)?;
        self.graph.check_node(to)?;
        trace_parents(self.graph, from, to, |node| self.parent_slot(node))
    }

    fn parent_slot(&self, node: NodeId) -> u32 {
        let (distance, parent) = unpack(self.label(node));
        if distance.is_finite() {
            parent
        } else {
            UNREACHED
        }
    }

    fn label(&self, node: NodeId) -> u64 {
        self.labels
            .get(node.index())
            .map_or(UNREACHED_LABEL, |cell| cell.load(Ordering::Acquire))
    }

    fn ensure_computed(&self) -> Result<()> {
        if self.computed.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(GraphError::NotComputed.into())
        }
    }
}

impl<G: Topology + Sync> ExplorationPolicy for DistancePolicy<'_, '_, G> {
    fn seeds(&self) -> Vec<Seed> {
        // Labels are rented with stale contents
        for cell in self.labels.iter() {
            cell.store(UNREACHED_LABEL, Ordering::Relaxed);
        }
        if let Some(cell) = self.labels.get(self.source.index()) {
            cell.store(pack(0.0, ROOT), Ordering::Release);
        }
        self.done.store(false, Ordering::Release);
        self.computed.store(false, Ordering::Release);
        vec![Seed::new(self.source)]
    }

    fn condition(&self, edge: &EdgeRef) -> bool {
        self.condition_fn.as_ref().map_or(true, |accept| accept(edge))
    }

    fn select(&self, step: &Step, _ctx: &RoundContext<'_>) -> Result<bool> {
        let weight = self
            .weight_fn
            .as_ref()
            .map_or(step.edge.weight, |weigh| weigh(&step.edge));
        if weight.is_nan() || weight < 0.0 {
            return Err(GraphError::NegativeWeight {
                edge: step.edge.id,
                weight,
            }
            .into());
        }

        let (base, _) = unpack(self.label(step.from));
        let candidate = base + weight;
        let Some(cell) = self.labels.get(step.to.index()) else {
            return Ok(false);
        };

        let proposed = pack(candidate, step.edge.id.0);
        let mut current = cell.load(Ordering::Acquire);
        loop {
            let (distance, _) = unpack(current);
            if candidate >= distance {
                return Ok(false);
            }
            match cell.compare_exchange_weak(current, proposed, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return Ok(true),
                Err(actual) => current = actual,
            }
        }
    }

    fn on_round_end(&self, _round: usize, next_frontier: usize) {
        if next_frontier == 0 {
            self.done.store(true, Ordering::Release);
        }
    }

    fn on_run_end(&self, _summary: &RunSummary) {
        self.computed.store(self.done(), Ordering::Release);
    }

    fn is_done(&self) -> bool {
        self.done()
    }
}

/// Compute single-source shortest paths
///
/// # Arguments
///
/// * `graph` - Any [`Topology`] with non-negative edge weights
/// * `pool` - Scratch pool supplying the label buffer
/// * `source` - The starting node
/// * `config` - Engine settings (sequential or parallel rounds)
///
/// # Returns
///
/// A `HashMap` mapping each reachable `NodeId` to its shortest distance from source.
/// Unreachable nodes are not included in the map.
///
/// # Errors
///
/// Returns `NodeNotFound` for an unknown source and `NegativeWeight` when an
/// edge weight is negative or NaN.
///
/// # Example
///
/// ```
/// use frontier_graph::{shortest_paths, EngineConfig, Graph, NodeId, ScratchPool};
///
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 4.0),
///     (NodeId(0), NodeId(2), 1.0),
///     (NodeId(2), NodeId(1), 2.0),
/// ]).unwrap();
/// let pool = ScratchPool::new();
///
/// let distances = shortest_paths(&graph, &pool, NodeId(0), EngineConfig::parallel()).unwrap();
/// // Shortest to node 1: 0→2→1 = 3.0 (not 0→1 = 4.0)
/// assert_eq!(distances.get(&NodeId(1)), Some(&3.0));
/// ```
pub fn shortest_paths<G: Topology + Sync>(
    graph: &G,
    pool: &ScratchPool,
    source: NodeId,
    config: EngineConfig,
) -> Result<HashMap<NodeId, f32>> {
    let policy = DistancePolicy::new(graph, pool, source);
    FrontierEngine::new(graph, pool, config).run(&policy)?;
    Ok(policy.distances()?.into_iter().collect())
}

/// Find the shortest path between two nodes
///
/// # Returns
///
/// * `Some((distance, path))` if a path exists
/// * `None` if target is unreachable from source
///
/// # Errors
///
/// Returns `NodeNotFound` for unknown endpoints and `NegativeWeight` when an
/// edge weight is negative or NaN.
///
/// # Example
///
/// ```
/// use frontier_graph::{shortest_path, Graph, NodeId, ScratchPool};
///
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 2.0),
/// ]).unwrap();
/// let pool = ScratchPool::new();
///
/// let (dist, path) = shortest_path(&graph, &pool, NodeId(0), NodeId(2)).unwrap().unwrap();
/// assert_eq!(dist, 3.0);
/// assert_eq!(path, vec![NodeId(0), NodeId(1), NodeId(2)]);
/// ```
pub fn shortest_path<G: Topology + Sync>(
    graph: &G,
    pool: &ScratchPool,
    source: NodeId,
    target: NodeId,
) -> Result<Option<(f32, Vec<NodeId>)>> {
    graph.check_node(target)?;
    let policy = DistancePolicy::new(graph, pool, source);
    FrontierEngine::new(graph, pool, EngineConfig::default()).run(&policy)?;

    let distance = policy.distance(target)?;
    if distance.is_infinite() {
        return Ok(None);
    }
    Ok(Some((distance, policy.get_path(source, target)?)))
}
