//! Exploration policy seam
//!
//! A policy decides what a traversal does with each candidate edge. The
//! engine owns the round structure; the policy owns the algorithm state.
//!
//! Callbacks take `&self` because the parallel engine calls them from many
//! workers at once. Policies keep their per-node state in atomics (or lock
//! around non-commutative updates) so that applying same-round proposals in
//! any order converges to the result of a sequential run.

use super::state::NodeStateMask;
use super::RunSummary;
use crate::storage::{Direction, EdgeRef, NodeId};
use anyhow::Result;

/// A starting node and its optional direction override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    /// Starting node
    pub node: NodeId,
    /// Direction override applied before round 0
    pub direction: Option<Direction>,
}

impl Seed {
    /// Seed walking the engine's configured direction
    #[must_use]
    pub const fn new(node: NodeId) -> Self {
        Self {
            node,
            direction: None,
        }
    }

    /// Seed with a per-node direction override
    #[must_use]
    pub const fn with_direction(node: NodeId, direction: Direction) -> Self {
        Self {
            node,
            direction: Some(direction),
        }
    }
}

/// One candidate edge as seen from a frontier node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Frontier node being expanded
    pub from: NodeId,
    /// Node the edge leads to from `from`
    pub to: NodeId,
    /// The stored edge
    pub edge: EdgeRef,
    /// `Out` if the edge is walked source → target, `In` if target → source
    pub walked: Direction,
    /// Zero-based round number
    pub round: usize,
}

impl Step {
    /// Whether the edge is walked against its stored direction
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.walked == Direction::In
    }
}

/// What a policy may touch of the engine's run state during a round
pub struct RoundContext<'a> {
    mask: &'a NodeStateMask<'a>,
    round: usize,
}

impl<'a> RoundContext<'a> {
    pub(crate) const fn new(mask: &'a NodeStateMask<'a>, round: usize) -> Self {
        Self { mask, round }
    }

    /// Zero-based round number
    #[must_use]
    pub const fn round(&self) -> usize {
        self.round
    }

    /// Make `node` walk `direction` whenever it is expanded from now on
    pub fn set_direction(&self, node: NodeId, direction: Direction) {
        self.mask.set_direction(node, direction);
    }

    /// Direction override of `node`, if any
    #[must_use]
    pub fn direction_of(&self, node: NodeId) -> Option<Direction> {
        self.mask.direction(node)
    }

    /// Whether `node` has entered any frontier this run
    #[must_use]
    pub fn is_visited(&self, node: NodeId) -> bool {
        self.mask
            .flags(node)
            .contains(super::state::NodeFlags::VISITED)
    }
}

/// The callback set driving a frontier run
pub trait ExplorationPolicy: Sync {
    /// Nodes forming round 0's frontier
    fn seeds(&self) -> Vec<Seed>;

    /// Reject an edge before selection (forbidden edges, filters)
    fn condition(&self, _edge: &EdgeRef) -> bool {
        true
    }

    /// Apply the algorithm's update for `step`
    ///
    /// Returns `true` if `step.to` should join the next frontier.
    ///
    /// # Errors
    ///
    /// Any error aborts the run and is returned from
    /// [`FrontierEngine::run`](super::FrontierEngine::run).
    fn select(&self, step: &Step, ctx: &RoundContext<'_>) -> Result<bool>;

    /// Fired once per node, the first time it enters any frontier
    fn on_visit(&self, _node: NodeId) {}

    /// Fired for every edge that passed `condition`, after `select` ran
    fn on_select(&self, _step: &Step, _joined: bool) {}

    /// Fired after each round with the size of the next frontier
    fn on_round_end(&self, _round: usize, _next_frontier: usize) {}

    /// Fired once when a run finishes without error
    ///
    /// Aborted runs (unknown seed, failing `select`) never reach this hook,
    /// so policies use it to mark their results readable.
    fn on_run_end(&self, _summary: &RunSummary) {}

    /// Cooperative stop flag, checked between rounds
    fn is_done(&self) -> bool {
        false
    }
}
