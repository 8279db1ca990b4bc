//! Bulk-synchronous frontier engine
//!
//! Based on Ligra (Shun & Blelloch, `PPoPP` 2013) frontier-based traversal:
//! the run advances an active set of nodes one round at a time and hands every
//! candidate edge to an [`ExplorationPolicy`].
//!
//! ```text
//! Seeded ──▶ Round k ──▶ Advance ──▶ Round k+1 ──▶ … ──▶ Done
//!              │  for u in frontier (sequential, or fanned out with rayon)
//!              │    for e in edges(u, override(u) or configured direction)
//!              │      condition(e)? select(step)? queue(step.to)
//!              └─ join: all of round k completes before round k+1 starts
//! ```
//!
//! A run ends when the next frontier is empty, the policy reports done
//! (checked between rounds), or the configured round cap is hit.

pub mod policy;
pub mod state;

pub use policy::{ExplorationPolicy, RoundContext, Seed, Step};
pub use state::{NodeFlags, NodeStateMask};

use crate::config::EngineConfig;
use crate::scratch::ScratchPool;
use crate::storage::{Direction, EdgeRef, NodeId, Topology};
use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, trace};

/// What a completed run did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Rounds executed
    pub rounds: usize,
    /// Nodes that entered any frontier
    pub visited: usize,
    /// Candidate edges handed to `condition`
    pub edges_examined: usize,
    /// Whether the policy reported done
    pub done: bool,
}

/// Drives an exploration policy over a graph in synchronized rounds
///
/// # Example
///
/// ```
/// use frontier_graph::{
///     AnyPathPolicy, EngineConfig, FrontierEngine, Graph, NodeId, ScratchPool,
/// };
///
/// let graph = Graph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
/// ]).unwrap();
/// let pool = ScratchPool::new();
///
/// let policy = AnyPathPolicy::new(&graph, &pool, NodeId(0)).with_target(NodeId(2));
/// let summary = FrontierEngine::new(&graph, &pool, EngineConfig::sequential())
///     .run(&policy)
///     .unwrap();
///
/// assert!(summary.done);
/// assert_eq!(policy.get_path(NodeId(0), NodeId(2)).unwrap(), vec![NodeId(0), NodeId(1), NodeId(2)]);
/// ```
pub struct FrontierEngine<'g, 'p, G: Topology + Sync> {
    graph: &'g G,
    pool: &'p ScratchPool,
    config: EngineConfig,
}

impl<'g, 'p, G: Topology + Sync> FrontierEngine<'g, 'p, G> {
    /// Create an engine over `graph` renting run state from `pool`
    #[must_use]
    pub const fn new(graph: &'g G, pool: &'p ScratchPool, config: EngineConfig) -> Self {
        Self {
            graph,
            pool,
            config,
        }
    }

    /// Engine settings
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `policy` to completion
    ///
    /// The node-state mask is rented for the duration of the call and
    /// returned to the pool on every exit path.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for seeds outside the graph, and propagates the
    /// first error returned by `policy.select`.
    pub fn run<P: ExplorationPolicy>(&self, policy: &P) -> Result<RunSummary> {
        let mask = NodeStateMask::rent(self.pool, self.graph.node_bound());
        let seeds = policy.seeds();

        debug!(
            seeds = seeds.len(),
            mode = ?self.config.mode,
            direction = ?self.config.direction,
            "frontier run starting"
        );

        let mut frontier = Vec::with_capacity(seeds.len());
        for seed in &seeds {
            self.graph.check_node(seed.node)?;
            if let Some(direction) = seed.direction {
                mask.set_direction(seed.node, direction);
            }
            if mask.try_queue(seed.node) {
                self.enter(&mask, policy, seed.node);
                frontier.push(seed.node);
            }
        }

        let mut summary = RunSummary::default();

        while !frontier.is_empty() && !policy.is_done() {
            if self
                .config
                .max_rounds
                .is_some_and(|cap| summary.rounds >= cap)
            {
                break;
            }

            for &node in &frontier {
                mask.clear_queued(node);
            }

            let ctx = RoundContext::new(&mask, summary.rounds);
            let outcome = if self.config.should_parallelize(frontier.len()) {
                self.parallel_round(&frontier, policy, &mask, &ctx)
            } else {
                self.sequential_round(&frontier, policy, &mask, &ctx)
            };

            let (next, examined) = match outcome {
                Ok(result) => result,
                Err(err) => {
                    debug!(round = summary.rounds, error = %err, "frontier run aborted");
                    return Err(err);
                }
            };

            trace!(
                round = summary.rounds,
                frontier = frontier.len(),
                next = next.len(),
                examined,
                "round complete"
            );

            policy.on_round_end(summary.rounds, next.len());
            summary.rounds += 1;
            summary.edges_examined += examined;
            frontier = next;
        }

        summary.visited = mask.visited_count();
        summary.done = policy.is_done();
        policy.on_run_end(&summary);

        debug!(
            rounds = summary.rounds,
            visited = summary.visited,
            edges_examined = summary.edges_examined,
            done = summary.done,
            "frontier run finished"
        );

        Ok(summary)
    }

    fn sequential_round<P: ExplorationPolicy>(
        &self,
        frontier: &[NodeId],
        policy: &P,
        mask: &NodeStateMask<'_>,
        ctx: &RoundContext<'_>,
    ) -> Result<(Vec<NodeId>, usize)> {
        let mut next = Vec::new();
        let mut examined = 0;
        for &node in frontier {
            examined += self.expand(node, policy, mask, ctx, &mut next)?;
        }
        Ok((next, examined))
    }

    fn parallel_round<P: ExplorationPolicy>(
        &self,
        frontier: &[NodeId],
        policy: &P,
        mask: &NodeStateMask<'_>,
        ctx: &RoundContext<'_>,
    ) -> Result<(Vec<NodeId>, usize)> {
        let (mut next, examined) = frontier
            .par_iter()
            .try_fold(
                || (Vec::new(), 0_usize),
                |(mut local, examined), &node| {
                    let more = self.expand(node, policy, mask, ctx, &mut local)?;
                    Ok::<_, anyhow::Error>((local, examined + more))
                },
            )
            .try_reduce(
                || (Vec::new(), 0_usize),
                |(mut left, a), (right, b)| {
                    left.extend(right);
                    Ok((left, a + b))
                },
            )?;

        // Membership is fixed by the QUEUED bit; sorting fixes the order too
        next.par_sort_unstable();
        Ok((next, examined))
    }

    /// Walk one frontier node's edges; returns the number examined
    fn expand<P: ExplorationPolicy>(
        &self,
        node: NodeId,
        policy: &P,
        mask: &NodeStateMask<'_>,
        ctx: &RoundContext<'_>,
        next: &mut Vec<NodeId>,
    ) -> Result<usize> {
        let direction = mask.direction(node).unwrap_or(self.config.direction);
        let mut examined = 0;

        if matches!(direction, Direction::Out | Direction::Both) {
            for edge in self.graph.out_edges(node) {
                examined += 1;
                self.offer(node, edge.target, edge, Direction::Out, policy, mask, ctx, next)?;
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            for edge in self.graph.in_edges(node) {
                examined += 1;
                self.offer(node, edge.source, edge, Direction::In, policy, mask, ctx, next)?;
            }
        }

        Ok(examined)
    }

    #[allow(clippy::too_many_arguments)]
    fn offer<P: ExplorationPolicy>(
        &self,
        from: NodeId,
        to: NodeId,
        edge: EdgeRef,
        walked: Direction,
        policy: &P,
        mask: &NodeStateMask<'_>,
        ctx: &RoundContext<'_>,
        next: &mut Vec<NodeId>,
    ) -> Result<()> {
        if !policy.condition(&edge) {
            return Ok(());
        }

        let step = Step {
            from,
            to,
            edge,
            walked,
            round: ctx.round(),
        };
        let joined = policy.select(&step, ctx)?;
        policy.on_select(&step, joined);

        if joined && mask.try_queue(to) {
            self.enter(mask, policy, to);
            next.push(to);
        }
        Ok(())
    }

    fn enter<P: ExplorationPolicy>(&self, mask: &NodeStateMask<'_>, policy: &P, node: NodeId) {
        if mask.mark_visited(node) {
            policy.on_visit(node);
        }
    }
}
