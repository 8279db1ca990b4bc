//! Pooled per-node scratch buffers
//!
//! A [`ScratchPool`] hands out node-indexed arrays (distances, flags, parent
//! pointers) and takes them back when the [`ScratchBuffer`] guard drops, so
//! repeated traversals over the same graph stop allocating after warm-up.
//!
//! The pool is an explicit handle, never a process-wide singleton: tests and
//! independent workloads can each own one without cross-contamination.
//!
//! Rented contents are unspecified. A buffer may come back from a previous run
//! holding that run's values; callers fill it before reading.
//!
//! ```
//! use frontier_graph::ScratchPool;
//!
//! let pool = ScratchPool::new();
//! {
//!     let mut dist = pool.rent_filled(4, f32::INFINITY);
//!     dist[0] = 0.0;
//!     assert_eq!(pool.outstanding(), 1);
//! }
//! assert_eq!(pool.outstanding(), 0);
//! ```

use crate::storage::Topology;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Buffers kept per element type once returned
pub const MAX_RETAINED_PER_TYPE: usize = 16;

type FreeList = Vec<Box<dyn Any + Send + Sync>>;

/// Counters describing pool usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers currently checked out
    pub outstanding: usize,
    /// Total rentals since construction
    pub rentals: usize,
    /// Rentals satisfied from a free list
    pub reused: usize,
    /// Buffers parked in free lists
    pub retained: usize,
}

/// Reusable source of node-indexed arrays
///
/// Free lists are keyed by element type and guarded by a concurrent map, so
/// rent and release are safe from any number of frontier workers.
#[derive(Default)]
pub struct ScratchPool {
    free: DashMap<TypeId, FreeList>,
    outstanding: AtomicUsize,
    rentals: AtomicUsize,
    reused: AtomicUsize,
}

impl ScratchPool {
    /// Create an empty pool
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rent a buffer of exactly `len` elements with unspecified contents
    ///
    /// Elements beyond a recycled buffer's previous length start at
    /// `T::default()`; everything else holds whatever the last renter left.
    pub fn rent<T: Default + Send + Sync + 'static>(&self, len: usize) -> ScratchBuffer<'_, T> {
        let mut data = self.take_free::<T>().unwrap_or_default();
        data.resize_with(len, T::default);

        self.rentals.fetch_add(1, Ordering::Relaxed);
        self.outstanding.fetch_add(1, Ordering::AcqRel);

        ScratchBuffer { data, pool: self }
    }

    /// Rent a buffer and fill every element with `value`
    pub fn rent_filled<T: Clone + Default + Send + Sync + 'static>(
        &self,
        len: usize,
        value: T,
    ) -> ScratchBuffer<'_, T> {
        let mut buffer = self.rent(len);
        buffer.fill(value);
        buffer
    }

    /// Rent a buffer sized to `graph.node_bound()` (`MaxNodeId + 1`)
    pub fn rent_nodes<G, T>(&self, graph: &G) -> ScratchBuffer<'_, T>
    where
        G: Topology + ?Sized,
        T: Default + Send + Sync + 'static,
    {
        self.rent(graph.node_bound())
    }

    /// Return a buffer early (equivalent to dropping it)
    pub fn release<T: Send + Sync + 'static>(&self, buffer: ScratchBuffer<'_, T>) {
        drop(buffer);
    }

    /// Buffers currently checked out
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Snapshot of the pool counters
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            outstanding: self.outstanding(),
            rentals: self.rentals.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            retained: self.free.iter().map(|entry| entry.value().len()).sum(),
        }
    }

    /// Drop every parked buffer (checked-out buffers are unaffected)
    pub fn clear(&self) {
        self.free.clear();
    }

    fn take_free<T: Send + Sync + 'static>(&self) -> Option<Vec<T>> {
        let boxed = self.free.get_mut(&TypeId::of::<Vec<T>>())?.pop()?;
        match boxed.downcast::<Vec<T>>() {
            Ok(data) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                Some(*data)
            }
            // Keyed by TypeId, so a mismatch cannot be produced by `give_back`
            Err(_) => None,
        }
    }

    fn give_back<T: Send + Sync + 'static>(&self, data: Vec<T>) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);

        let mut list = self.free.entry(TypeId::of::<Vec<T>>()).or_default();
        if list.len() < MAX_RETAINED_PER_TYPE {
            list.push(Box::new(data));
        }
    }
}

impl fmt::Debug for ScratchPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchPool")
            .field("stats", &self.stats())
            .finish()
    }
}

/// A rented node-indexed array; returns itself to the pool on drop
///
/// Dereferences to `[T]`, so indexing, `fill` and `fill_with` work directly.
pub struct ScratchBuffer<'pool, T: Send + Sync + 'static> {
    data: Vec<T>,
    pool: &'pool ScratchPool,
}

impl<T: Send + Sync + 'static> ScratchBuffer<'_, T> {
    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Send + Sync + 'static> Deref for ScratchBuffer<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T: Send + Sync + 'static> DerefMut for ScratchBuffer<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Send + Sync + 'static> Drop for ScratchBuffer<'_, T> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.data));
    }
}

impl<T: Send + Sync + fmt::Debug + 'static> fmt::Debug for ScratchBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_rent_and_release() {
        let pool = ScratchPool::new();
        let buffer = pool.rent::<u32>(10);
        assert_eq!(buffer.len(), 10);
        assert_eq!(pool.outstanding(), 1);

        pool.release(buffer);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.stats().retained, 1);
    }

    #[test]
    fn test_reuse_same_type() {
        let pool = ScratchPool::new();
        drop(pool.rent_filled(8, 7_u32));

        let again = pool.rent::<u32>(4);
        assert_eq!(again.len(), 4);
        let stats = pool.stats();
        assert_eq!(stats.rentals, 2);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.retained, 0);
    }

    #[test]
    fn test_types_do_not_mix() {
        let pool = ScratchPool::new();
        drop(pool.rent_filled(4, 1.5_f32));

        let ints = pool.rent::<u32>(4);
        assert_eq!(&ints[..], &[0, 0, 0, 0]);
        assert_eq!(pool.stats().reused, 0);
    }

    #[test]
    fn test_growth_pads_with_default() {
        let pool = ScratchPool::new();
        drop(pool.rent_filled(2, 9_u8));

        let grown = pool.rent::<u8>(4);
        // Recycled prefix is stale, padding is default
        assert_eq!(&grown[2..], &[0, 0]);
    }

    #[test]
    fn test_rent_filled_resets_stale_values() {
        let pool = ScratchPool::new();
        drop(pool.rent_filled(3, true));
        let flags = pool.rent_filled(3, false);
        assert!(flags.iter().all(|&f| !f));
    }

    #[test]
    fn test_atomic_buffers() {
        let pool = ScratchPool::new();
        let mut marks = pool.rent::<AtomicU32>(5);
        marks.fill_with(|| AtomicU32::new(u32::MAX));
        marks[3].store(1, Ordering::Relaxed);
        assert_eq!(marks[3].load(Ordering::Relaxed), 1);
        assert_eq!(marks[0].load(Ordering::Relaxed), u32::MAX);
    }

    #[test]
    fn test_retention_is_capped() {
        let pool = ScratchPool::new();
        let buffers: Vec<_> = (0..MAX_RETAINED_PER_TYPE + 4)
            .map(|_| pool.rent::<u64>(1))
            .collect();
        drop(buffers);

        let stats = pool.stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.retained, MAX_RETAINED_PER_TYPE);

        pool.clear();
        assert_eq!(pool.stats().retained, 0);
    }

    #[test]
    fn test_concurrent_rent_release() {
        let pool = ScratchPool::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for len in 0..50 {
                        let mut buffer = pool.rent::<usize>(len);
                        buffer.fill(len);
                    }
                });
            }
        });
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.stats().rentals, 200);
    }

    #[test]
    fn test_independent_pools() {
        let a = ScratchPool::new();
        let b = ScratchPool::new();
        let _held = a.rent::<u8>(1);
        assert_eq!(a.outstanding(), 1);
        assert_eq!(b.outstanding(), 0);
    }
}
