//! Per-node state mask owned by one engine run
//!
//! One `AtomicU8` per node id, rented from the scratch pool. The direction
//! override lives in the same byte as data, so frontier workers read it with
//! a plain atomic load.

use crate::scratch::{ScratchBuffer, ScratchPool};
use crate::storage::{Direction, NodeId};
use bitflags::bitflags;
use std::sync::atomic::{AtomicU8, Ordering};

bitflags! {
    /// Bits of the per-node state mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node has entered some frontier
        const VISITED = 1 << 0;
        /// Node is already queued for the next frontier
        const QUEUED = 1 << 1;
        /// Override: walk out-edges
        const WALK_OUT = 1 << 2;
        /// Override: walk in-edges
        const WALK_IN = 1 << 3;
        /// Both override bits
        const OVERRIDE = Self::WALK_OUT.bits() | Self::WALK_IN.bits();
    }
}

impl NodeFlags {
    /// Override bits for a direction
    #[must_use]
    pub const fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Out => Self::WALK_OUT,
            Direction::In => Self::WALK_IN,
            Direction::Both => Self::OVERRIDE,
        }
    }

    /// Direction encoded in the override bits, if any
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        match (self.contains(Self::WALK_OUT), self.contains(Self::WALK_IN)) {
            (true, true) => Some(Direction::Both),
            (true, false) => Some(Direction::Out),
            (false, true) => Some(Direction::In),
            (false, false) => None,
        }
    }
}

/// Node-indexed state mask for one run
pub struct NodeStateMask<'pool> {
    bits: ScratchBuffer<'pool, AtomicU8>,
}

impl<'pool> NodeStateMask<'pool> {
    /// Rent and clear a mask covering `bound` node ids
    pub fn rent(pool: &'pool ScratchPool, bound: usize) -> Self {
        let mut bits = pool.rent::<AtomicU8>(bound);
        bits.fill_with(|| AtomicU8::new(0));
        Self { bits }
    }

    /// Current flags of `node` (empty for out-of-range ids)
    #[must_use]
    pub fn flags(&self, node: NodeId) -> NodeFlags {
        self.bits
            .get(node.index())
            .map_or(NodeFlags::empty(), |cell| {
                NodeFlags::from_bits_retain(cell.load(Ordering::Acquire))
            })
    }

    /// Set `VISITED`; returns `true` only for the first caller
    pub fn mark_visited(&self, node: NodeId) -> bool {
        self.set_once(node, NodeFlags::VISITED)
    }

    /// Set `QUEUED`; returns `true` only for the first caller
    pub fn try_queue(&self, node: NodeId) -> bool {
        self.set_once(node, NodeFlags::QUEUED)
    }

    /// Clear `QUEUED` once the node has moved into the current frontier
    pub fn clear_queued(&self, node: NodeId) {
        if let Some(cell) = self.bits.get(node.index()) {
            cell.fetch_and(!NodeFlags::QUEUED.bits(), Ordering::AcqRel);
        }
    }

    /// Replace the direction override of `node`
    pub fn set_direction(&self, node: NodeId, direction: Direction) {
        if let Some(cell) = self.bits.get(node.index()) {
            let wanted = NodeFlags::for_direction(direction).bits();
            let mut current = cell.load(Ordering::Acquire);
            loop {
                let next = (current & !NodeFlags::OVERRIDE.bits()) | wanted;
                match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                    Ok(_) => break,
                    Err(actual) => current = actual,
                }
            }
        }
    }

    /// Direction override of `node`, if one was set
    #[must_use]
    pub fn direction(&self, node: NodeId) -> Option<Direction> {
        self.flags(node).direction()
    }

    /// Number of nodes that entered any frontier
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.bits
            .iter()
            .filter(|cell| {
                NodeFlags::from_bits_retain(cell.load(Ordering::Relaxed))
                    .contains(NodeFlags::VISITED)
            })
            .count()
    }

    fn set_once(&self, node: NodeId, flag: NodeFlags) -> bool {
        self.bits.get(node.index()).is_some_and(|cell| {
            let previous = cell.fetch_or(flag.bits(), Ordering::AcqRel);
            previous & flag.bits() == 0
        })
    }
}
