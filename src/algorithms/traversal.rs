//! Any-path search and the traversals built on it (`bfs`, `find_callers`)
//!
//! Based on Ligra (Shun & Blelloch, `PPoPP` 2013) frontier-based traversal patterns:
//! every engine round is one BFS level, so parent links always describe a
//! minimum-hop path from the source.

use super::{path_nodes, trace_parents, EdgeFilter, ROOT, UNREACHED};
use crate::config::EngineConfig;
use crate::engine::{ExplorationPolicy, FrontierEngine, RoundContext, RunSummary, Seed, Step};
use crate::error::GraphError;
use crate::scratch::{ScratchBuffer, ScratchPool};
use crate::storage::{Direction, EdgeRef, NodeId, Topology};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

type StopFn<'a> = Box<dyn Fn(NodeId) -> bool + Send + Sync + 'a>;

/// Exploration policy recording a reached flag and parent edge per node
///
/// The first worker to claim a node wins its parent slot through a
/// compare-and-swap, so parent links stay consistent under parallel rounds.
/// The run stops after the round in which the target (or any node accepted by
/// the stop callback) is first reached.
pub struct AnyPathPolicy<'g, 'p, G: Topology + Sync> {
    graph: &'g G,
    source: NodeId,
    parents: ScratchBuffer<'p, AtomicU32>,
    target: Option<NodeId>,
    stop_fn: Option<StopFn<'g>>,
    condition_fn: Option<EdgeFilter<'g>>,
    computed: AtomicBool,
    done: AtomicBool,
}

impl<'g, 'p, G: Topology + Sync> AnyPathPolicy<'g, 'p, G> {
    /// Any-path search from `source` with no target (explores everything reachable)
    pub fn new(graph: &'g G, pool: &'p ScratchPool, source: NodeId) -> Self {
        Self {
            graph,
            source,
            parents: pool.rent_nodes(graph),
            target: None,
            stop_fn: None,
            condition_fn: None,
            computed: AtomicBool::new(false),
            done: AtomicBool::new(false),
        }
    }

    /// Stop once `target` has been reached
    #[must_use]
    pub fn with_target(mut self, target: NodeId) -> Self {
        self.target = Some(target);
        self
    }

    /// Stop once a reached node satisfies `stop_fn`
    #[must_use]
    pub fn with_stop<F>(mut self, stop_fn: F) -> Self
    where
        F: Fn(NodeId) -> bool + Send + Sync + 'g,
    {
        self.stop_fn = Some(Box::new(stop_fn));
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

    /// Whether `node` was reached in the last run
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run completed and
    /// `NodeNotFound` for ids not in the graph.
    pub fn reached(&self, node: NodeId) -> Result<bool> {
        self.ensure_computed()?;
        self.graph.check_node(node)?;
        Ok(self.parent_slot(node) != UNREACHED)
    }

    /// Every reached node (source included), in id order
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run completed.
    #[allow(clippy::cast_possible_truncation)] // buffer length is node_bound
    pub fn reached_nodes(&self) -> Result<Vec<NodeId>> {
        self.ensure_computed()?;
        Ok(self
            .parents
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.load(Ordering::Acquire) != UNREACHED)
            .map(|(index, _)| NodeId(index as u32))
            .collect())
    }

    /// Node path `from → … → to` along recorded parent edges; empty if none
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run completed and
    /// `NodeNotFound` for ids not in the graph.
    pub fn get_path(&self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>> {
        self.ensure_computed()?;
        self.graph.check_node(from)?;
        self.graph.check_node(to)?;
        Ok(
            trace_parents(self.graph, from, to, |node| self.parent_slot(node))?
                .map(|edges| path_nodes(from, &edges))
                .unwrap_or_default(),
        )
    }

    /// Whether the target or stop callback ended the last run
    #[must_use]
    pub fn done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    fn parent_slot(&self, node: NodeId) -> u32 {
        self.parents
            .get(node.index())
            .map_or(UNREACHED, |slot| slot.load(Ordering::Acquire))
    }

    fn is_goal(&self, node: NodeId) -> bool {
        self.target == Some(node) || self.stop_fn.as_ref().is_some_and(|stop| stop(node))
    }

    fn ensure_computed(&self) -> Result<()> {
        if self.computed.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(GraphError::NotComputed.into())
        }
    }
}

impl<G: Topology + Sync> ExplorationPolicy for AnyPathPolicy<'_, '_, G> {
    fn seeds(&self) -> Vec<Seed> {
        for slot in self.parents.iter() {
            slot.store(UNREACHED, Ordering::Relaxed);
        }
        if let Some(slot) = self.parents.get(self.source.index()) {
            slot.store(ROOT, Ordering::Release);
        }
        self.done.store(self.is_goal(self.source), Ordering::Release);
        self.computed.store(false, Ordering::Release);
        vec![Seed::new(self.source)]
    }

    fn condition(&self, edge: &EdgeRef) -> bool {
        self.condition_fn.as_ref().map_or(true, |accept| accept(edge))
    }

    fn select(&self, step: &Step, _ctx: &RoundContext<'_>) -> Result<bool> {
        let Some(slot) = self.parents.get(step.to.index()) else {
            return Ok(false);
        };
        if slot
            .compare_exchange(UNREACHED, step.edge.id.0, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }
        if self.is_goal(step.to) {
            self.done.store(true, Ordering::Release);
        }
        Ok(true)
    }

    fn on_run_end(&self, _summary: &RunSummary) {
        self.computed.store(true, Ordering::Release);
    }

    fn is_done(&self) -> bool {
        self.done()
    }
}

/// Find a minimum-hop path between two nodes
///
/// # Returns
///
/// The node path `from → … → to`, or an empty path when `to` is unreachable.
///
/// # Errors
///
/// Returns `NodeNotFound` for unknown endpoints.
///
/// # Example
///
/// ```
/// use frontier_graph::{any_path, EngineConfig, Graph, NodeId, ScratchPool};
///
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
///     (NodeId(0), NodeId(3), 1.0),
/// ]).unwrap();
/// let pool = ScratchPool::new();
///
/// let path = any_path(&graph, &pool, NodeId(0), NodeId(2), EngineConfig::default()).unwrap();
/// assert_eq!(path, vec![NodeId(0), NodeId(1), NodeId(2)]);
/// ```
pub fn any_path<G: Topology + Sync>(
    graph: &G,
    pool: &ScratchPool,
    from: NodeId,
    to: NodeId,
    config: EngineConfig,
) -> Result<Vec<NodeId>> {
    graph.check_node(to)?;
    let policy = AnyPathPolicy::new(graph, pool, from).with_target(to);
    FrontierEngine::new(graph, pool, config).run(&policy)?;
    policy.get_path(from, to)
}

/// Find all functions that transitively call the target function
///
/// Walks in-edges from the target, one engine round per call level.
///
/// # Arguments
///
/// * `graph` - Any [`Topology`] (call graph: caller → callee)
/// * `pool` - Scratch pool supplying the parent buffer
/// * `target` - Target node to find callers for
/// * `max_depth` - Maximum number of call levels (1 = direct callers only)
///
/// # Returns
///
/// All node IDs that call the target (directly or transitively), in id order
///
/// # Errors
///
/// Returns `NodeNotFound` if `target` is not in the graph.
///
/// # Example
///
/// ```
/// use frontier_graph::{find_callers, Graph, NodeId, ScratchPool};
///
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(2), 1.0), // main → validate
///     (NodeId(1), NodeId(2), 1.0), // parse → validate
/// ]).unwrap();
/// let pool = ScratchPool::new();
///
/// let callers = find_callers(&graph, &pool, NodeId(2), 10).unwrap();
/// assert_eq!(callers, vec![NodeId(0), NodeId(1)]);
/// ```
pub fn find_callers<G: Topology + Sync>(
    graph: &G,
    pool: &ScratchPool,
    target: NodeId,
    max_depth: usize,
) -> Result<Vec<NodeId>> {
    let policy = AnyPathPolicy::new(graph, pool, target);
    let config = EngineConfig::default()
        .with_direction(Direction::In)
        .with_max_rounds(max_depth);
    FrontierEngine::new(graph, pool, config).run(&policy)?;

    // Callers only, not the target itself
    let mut callers = policy.reached_nodes()?;
    callers.retain(|&node| node != target);
    Ok(callers)
}

/// Breadth-first search from source node
///
/// # Returns
///
/// All node IDs reachable from source (source included), in id order
///
/// # Errors
///
/// Returns `NodeNotFound` if `source` is not in the graph.
///
/// # Example
///
/// ```
/// use frontier_graph::{bfs, Graph, NodeId, ScratchPool};
///
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
/// ]).unwrap();
/// let pool = ScratchPool::new();
///
/// let reachable = bfs(&graph, &pool, NodeId(0)).unwrap();
/// assert_eq!(reachable.len(), 3); // All 3 nodes reachable
/// ```
pub fn bfs<G: Topology + Sync>(
    graph: &G,
    pool: &ScratchPool,
    source: NodeId,
) -> Result<Vec<NodeId>> {
    let policy = AnyPathPolicy::new(graph, pool, source);
    FrontierEngine::new(graph, pool, EngineConfig::default()).run(&policy)?;
    policy.reached_nodes()
}
