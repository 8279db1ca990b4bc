//! Disjoint-set forest (union-find) over node ids
//!
//! Path compression plus union by rank keep `find` and `union` amortised
//! near-constant. Ties in rank attach the second root under the first, so a
//! given sequence of unions always yields the same representatives.

use crate::error::GraphError;
use crate::storage::{NodeId, Topology};
use anyhow::Result;
use std::collections::BTreeMap;

/// Parent slot of an id that was never made a set
const ABSENT: u32 = u32::MAX;

/// A disjoint-set forest keyed by [`NodeId`]
#[derive(Debug, Clone, Default)]
pub struct DisjointSet {
    /// Parent pointers; a root points at itself
    parent: Vec<u32>,
    /// Rank (depth upper bound) for union-by-rank
    rank: Vec<u8>,
    len: usize,
    sets: usize,
}

impl DisjointSet {
    /// Creates an empty forest
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a forest with room for ids below `bound`
    #[must_use]
    pub fn with_capacity(bound: usize) -> Self {
        Self {
            parent: Vec::with_capacity(bound),
            rank: Vec::with_capacity(bound),
            len: 0,
            sets: 0,
        }
    }

    /// Forest holding one singleton set per live node of `graph`
    #[allow(clippy::cast_possible_truncation)] // ids are u32 by construction
    pub fn from_topology<G: Topology + ?Sized>(graph: &G) -> Self {
        let mut forest = Self::with_capacity(graph.node_bound());
        for index in 0..graph.node_bound() {
            let node = NodeId(index as u32);
            if graph.contains_node(node) {
                forest.make_set(node);
            }
        }
        forest
    }

    /// Add `id` as a singleton set; returns `false` if it was already present
    pub fn make_set(&mut self, id: NodeId) -> bool {
        let index = id.index();
        if index >= self.parent.len() {
            self.parent.resize(index + 1, ABSENT);
            self.rank.resize(index + 1, 0);
        }
        if self.parent[index] != ABSENT {
            return false;
        }
        self.parent[index] = id.0;
        self.len += 1;
        self.sets += 1;
        true
    }

    /// Whether `id` has been made a set
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.parent.get(id.index()).is_some_and(|&p| p != ABSENT)
    }

    /// Representative of the set containing `id`, compressing the path
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if `id` was never made a set.
    pub fn find(&mut self, id: NodeId) -> Result<NodeId> {
        if !self.contains(id) {
            return Err(GraphError::NodeNotFound(id).into());
        }

        // Two passes: locate the root, then point the whole path at it
        let mut root = id.0;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        let mut current = id.0;
        while current != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }

        Ok(NodeId(root))
    }

    /// Representative without path compression, for shared borrows
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if `id` was never made a set.
    pub fn find_root(&self, id: NodeId) -> Result<NodeId> {
        if !self.contains(id) {
            return Err(GraphError::NodeNotFound(id).into());
        }
        let mut root = id.0;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        Ok(NodeId(root))
    }

    /// Merge the sets containing `a` and `b`
    ///
    /// Returns `true` if they were in different sets, `false` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if either id was never made a set.
    pub fn union(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        let root_a = self.find(a)?.index();
        let root_b = self.find(b)?.index();
        if root_a == root_b {
            return Ok(false);
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = self.parent[root_b],
            std::cmp::Ordering::Greater => self.parent[root_b] = self.parent[root_a],
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = self.parent[root_a];
                self.rank[root_a] = self.rank[root_a].saturating_add(1);
            }
        }
        self.sets -= 1;
        Ok(true)
    }

    /// Whether `a` and `b` are in the same set
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if either id was never made a set.
    pub fn same_set(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        Ok(self.find(a)? == self.find(b)?)
    }

    /// Every set, members in id order, sets ordered by smallest member
    #[allow(clippy::cast_possible_truncation)] // ids are u32 by construction
    pub fn components(&mut self) -> Vec<Vec<NodeId>> {
        let mut groups: BTreeMap<u32, Vec<NodeId>> = BTreeMap::new();
        let mut order = Vec::new();
        for index in 0..self.parent.len() {
            let node = NodeId(index as u32);
            if let Ok(root) = self.find(node) {
                let members = groups.entry(root.0).or_default();
                if members.is_empty() {
                    order.push(root.0);
                }
                members.push(node);
            }
        }
        order
            .into_iter()
            .filter_map(|root| groups.remove(&root))
            .collect()
    }

    /// Number of elements
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the forest has no elements
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of disjoint sets
    #[must_use]
    pub const fn set_count(&self) -> usize {
        self.sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Graph;

    fn forest(n: u32) -> DisjointSet {
        let mut ds = DisjointSet::new();
        for i in 0..n {
            assert!(ds.make_set(NodeId(i)));
        }
        ds
    }

    #[test]
    fn test_disjoint_set() {
        let mut ds = forest(3);
        let (a, b, c) = (NodeId(0), NodeId(1), NodeId(2));

        assert_eq!(ds.find(a).unwrap(), a);
        assert_eq!(ds.find(b).unwrap(), b);

        assert!(ds.union(a, b).unwrap());
        assert_eq!(ds.find(a).unwrap(), ds.find(b).unwrap());
        assert_ne!(ds.find(a).unwrap(), ds.find(c).unwrap());

        assert!(ds.union(b, c).unwrap());
        assert_eq!(ds.find(a).unwrap(), ds.find(c).unwrap());

        // Already united
        assert!(!ds.union(a, c).unwrap());
        assert_eq!(ds.set_count(), 1);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn test_make_set_twice() {
        let mut ds = forest(2);
        ds.union(NodeId(0), NodeId(1)).unwrap();
        assert!(!ds.make_set(NodeId(1)));
        // Re-adding does not split the set
        assert!(ds.same_set(NodeId(0), NodeId(1)).unwrap());
    }

    #[test]
    fn test_sparse_ids() {
        let mut ds = DisjointSet::new();
        ds.make_set(NodeId(10));
        ds.make_set(NodeId(3));
        assert!(ds.contains(NodeId(10)));
        assert!(!ds.contains(NodeId(5)));
        assert_eq!(ds.len(), 2);

        let err = ds.find(NodeId(5)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<GraphError>(),
            Some(&GraphError::NodeNotFound(NodeId(5)))
        );
        assert!(ds.union(NodeId(3), NodeId(99)).is_err());
    }

    #[test]
    fn test_find_is_stable() {
        let mut ds = forest(8);
        for (a, b) in [(0, 1), (2, 3), (1, 3), (4, 5), (6, 7), (5, 7)] {
            ds.union(NodeId(a), NodeId(b)).unwrap();
        }
        let first: Vec<_> = (0..8).map(|i| ds.find(NodeId(i)).unwrap()).collect();
        let second: Vec<_> = (0..8).map(|i| ds.find(NodeId(i)).unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(
            (0..8).map(|i| ds.find_root(NodeId(i)).unwrap()).collect::<Vec<_>>(),
            first
        );
    }

    #[test]
    fn test_union_by_rank_keeps_trees_shallow() {
        let mut ds = forest(1024);
        // Pairwise merges build a balanced tree of rank 10
        let mut step = 1_u32;
        while step < 1024 {
            for i in (0..1024).step_by(step as usize * 2) {
                ds.union(NodeId(i), NodeId(i + step)).unwrap();
            }
            step *= 2;
        }
        assert_eq!(ds.set_count(), 1);
        assert!(ds.rank.iter().all(|&r| r <= 10));
    }

    #[test]
    fn test_components() {
        let mut ds = forest(6);
        ds.union(NodeId(4), NodeId(0)).unwrap();
        ds.union(NodeId(1), NodeId(5)).unwrap();

        assert_eq!(
            ds.components(),
            vec![
                vec![NodeId(0), NodeId(4)],
                vec![NodeId(1), NodeId(5)],
                vec![NodeId(2)],
                vec![NodeId(3)],
            ]
        );
    }

    #[test]
    fn test_from_topology_skips_removed_nodes() {
        let mut g = Graph::from_edge_list(&[(NodeId(0), NodeId(1), 1.0)]).unwrap();
        g.ensure_node(NodeId(3));
        let ds = DisjointSet::from_topology(&g);
        assert_eq!(ds.len(), 3);
        assert!(!ds.contains(NodeId(2)));
        assert!(ds.contains(NodeId(3)));
    }
}
