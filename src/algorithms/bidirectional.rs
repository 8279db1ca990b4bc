//! Meet-in-the-middle path search
//!
//! Two any-path searches share one engine run: the forward half walks
//! out-edges from the start, the backward half walks in-edges from the end.
//! Every node a half claims is tagged with that half's direction override, so
//! the engine expands it the right way in the next round. The first node
//! claimed by both halves is the meeting point and ends the run.
//!
//! With both fronts advancing one hop per round, the search touches roughly
//! two balls of radius `d/2` instead of one of radius `d`.

use super::{path_nodes, trace_parents, EdgeFilter, ROOT, UNREACHED};
use crate::config::EngineConfig;
use crate::engine::{ExplorationPolicy, FrontierEngine, RoundContext, RunSummary, Seed, Step};
use crate::error::GraphError;
use crate::scratch::{ScratchBuffer, ScratchPool};
use crate::storage::{Direction, EdgeRef, NodeId, Topology};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Exploration policy running a forward and a backward any-path search at once
pub struct MeetInTheMiddlePolicy<'g, 'p, G: Topology + Sync> {
    graph: &'g G,
    start: NodeId,
    end: NodeId,
    forward: ScratchBuffer<'p, AtomicU32>,
    backward: ScratchBuffer<'p, AtomicU32>,
    meeting: AtomicU32,
    condition_fn: Option<EdgeFilter<'g>>,
    computed: AtomicBool,
    done: AtomicBool,
}

impl<'g, 'p, G: Topology + Sync> MeetInTheMiddlePolicy<'g, 'p, G> {
    /// Search for a path `start → … → end`
    pub fn new(graph: &'g G, pool: &'p ScratchPool, start: NodeId, end: NodeId) -> Self {
        Self {
            graph,
            start,
            end,
            forward: pool.rent_nodes(graph),
            backward: pool.rent_nodes(graph),
            meeting: AtomicU32::new(UNREACHED),
            condition_fn: None,
            computed: AtomicBool::new(false),
            done: AtomicBool::new(false),
        }
    }

    /// Skip edges for which `condition_fn(edge)` is false (in both halves)
    #[must_use]
    pub fn with_condition<F>(mut self, condition_fn: F) -> Self
    where
        F: Fn(&EdgeRef) -> bool + Send + Sync + 'g,
    {
        self.condition_fn = Some(Box::new(condition_fn));
        self
    }

    /// Node where the two searches met, if they did
    #[must_use]
    pub fn meeting_point(&self) -> Option<NodeId> {
        match self.meeting.load(Ordering::Acquire) {
            UNREACHED => None,
            raw => Some(NodeId(raw)),
        }
    }

    /// Whether the searches met
    #[must_use]
    pub fn done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Full path `start → … → meeting point → … → end`; empty if they never met
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run completed.
    pub fn path(&self) -> Result<Vec<NodeId>> {
        self.ensure_computed()?;
        let Some(meeting) = self.meeting_point() else {
            return Ok(Vec::new());
        };

        let head = trace_parents(self.graph, self.start, meeting, |node| {
            slot(&self.forward, node)
        })?;
        let tail = trace_parents(self.graph, self.end, meeting, |node| {
            slot(&self.backward, node)
        })?;

        let (Some(head), Some(tail)) = (head, tail) else {
            return Ok(Vec::new());
        };

        let mut nodes = path_nodes(self.start, &head);
        // The backward half was recorded end → meeting; walk it back out
        let mut back = path_nodes(self.end, &tail);
        back.pop();
        nodes.extend(back.into_iter().rev());
        Ok(nodes)
    }

    /// Sub-path `from → … → to` of the met path, else the forward-tree path
    ///
    /// Returns an empty path when neither yields one.
    ///
    /// # Errors
    ///
    /// Returns `NotComputed` unless the last run completed and
    /// `NodeNotFound` for ids not in the graph.
    pub fn get_path(&self, from: NodeId, to: NodeId) -> Result<Vec<NodeId>> {
        self.ensure_computed()?;
        self.graph.check_node(from)?;
        self.graph.check_node(to)?;

        let full = self.path()?;
        let position = |node| full.iter().position(|&n| n == node);
        if let (Some(i), Some(j)) = (position(from), position(to)) {
            if i <= j {
                return Ok(full[i..=j].to_vec());
            }
        }

        Ok(
            trace_parents(self.graph, from, to, |node| slot(&self.forward, node))?
                .map(|edges| path_nodes(from, &edges))
                .unwrap_or_default(),
        )
    }

    fn ensure_computed(&self) -> Result<()> {
        if self.computed.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(GraphError::NotComputed.into())
        }
    }

    fn halves(&self, step: &Step) -> (&[AtomicU32], &[AtomicU32]) {
        if step.is_reversed() {
            (&self.backward[..], &self.forward[..])
        } else {
            (&self.forward[..], &self.backward[..])
        }
    }
}

fn slot(parents: &[AtomicU32], node: NodeId) -> u32 {
    parents
        .get(node.index())
        .map_or(UNREACHED, |cell| cell.load(Ordering::Acquire))
}

impl<G: Topology + Sync> ExplorationPolicy for MeetInTheMiddlePolicy<'_, '_, G> {
    fn seeds(&self) -> Vec<Seed> {
        for cell in self.forward.iter().chain(self.backward.iter()) {
            cell.store(UNREACHED, Ordering::Relaxed);
        }
        if let Some(cell) = self.forward.get(self.start.index()) {
            cell.store(ROOT, Ordering::SeqCst);
        }
        if let Some(cell) = self.backward.get(self.end.index()) {
            cell.store(ROOT, Ordering::SeqCst);
        }
        self.computed.store(false, Ordering::Release);

        if self.start == self.end {
            self.meeting.store(self.start.0, Ordering::Release);
            self.done.store(true, Ordering::Release);
            return vec![Seed::new(self.start)];
        }

        self.meeting.store(UNREACHED, Ordering::Release);
        self.done.store(false, Ordering::Release);
        vec![
            Seed::with_direction(self.start, Direction::Out),
            Seed::with_direction(self.end, Direction::In),
        ]
    }

    fn condition(&self, edge: &EdgeRef) -> bool {
        self.condition_fn.as_ref().map_or(true, |accept| accept(edge))
    }

    fn select(&self, step: &Step, ctx: &RoundContext<'_>) -> Result<bool> {
        let (mine, other) = self.halves(step);
        let Some(cell) = mine.get(step.to.index()) else {
            return Ok(false);
        };

        // SeqCst on both claims: of two halves claiming the same node, at
        // least one observes the other
        if cell
            .compare_exchange(UNREACHED, step.edge.id.0, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(false);
        }

        if slot_seq_cst(other, step.to) != UNREACHED {
            if self
                .meeting
                .compare_exchange(UNREACHED, step.to.0, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.done.store(true, Ordering::Release);
            }
            return Ok(false);
        }

        ctx.set_direction(step.to, step.walked);
        Ok(true)
    }

    fn on_run_end(&self, _summary: &RunSummary) {
        self.computed.store(true, Ordering::Release);
    }

    fn is_done(&self) -> bool {
        self.done()
    }
}

fn slot_seq_cst(parents: &[AtomicU32], node: NodeId) -> u32 {
    parents
        .get(node.index())
        .map_or(UNREACHED, |cell| cell.load(Ordering::SeqCst))
}

/// Find a path `start → … → end` by meet-in-the-middle search
///
/// The returned path is at most one hop longer than the minimum-hop path.
///
/// # Errors
///
/// Returns `NodeNotFound` for unknown endpoints.
///
/// # Example
///
/// ```
/// use frontier_graph::{bidirectional_path, EngineConfig, Graph, NodeId, ScratchPool};
///
/// let edges: Vec<_> = (0..9).map(|i| (NodeId(i), NodeId(i + 1), 1.0)).collect();
/// let graph = Graph::from_edge_list(&edges).unwrap();
/// let pool = ScratchPool::new();
///
/// let path = bidirectional_path(&graph, &pool, NodeId(0), NodeId(9), EngineConfig::default()).unwrap();
/// assert_eq!(path, (0..10).map(NodeId).collect::<Vec<_>>());
/// ```
pub fn bidirectional_path<G: Topology + Sync>(
    graph: &G,
    pool: &ScratchPool,
    start: NodeId,
    end: NodeId,
    config: EngineConfig,
) -> Result<Vec<NodeId>> {
    let policy = MeetInTheMiddlePolicy::new(graph, pool, start, end);
    FrontierEngine::new(graph, pool, config).run(&policy)?;
    policy.path()
}
