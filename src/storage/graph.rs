//! Mutable dense-id graph store
//!
//! Nodes live in a slot vector indexed by id; removal leaves a hole instead of
//! compacting, so ids (and every scratch buffer sized from them) stay valid.
//!
//! ```text
//! Graph: 0 → 1 (e0), 0 → 2 (e1), 1 → 2 (e2)
//!
//!   nodes:    [Some, Some, Some]
//!   outgoing: [[e0, e1], [e2], []]
//!   incoming: [[], [e0], [e1, e2]]
//!   pairs:    {(0,1): e0, (0,2): e1, (1,2): e2}
//! ```

use super::topology::{EdgeId, EdgeRef, NodeId, Topology};
use crate::config::GraphConfiguration;
use crate::error::GraphError;
use anyhow::Result;
use std::collections::HashMap;

/// Algorithm-agnostic node payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Human-readable name (debugging/export)
    pub label: Option<String>,
    /// Layout position
    pub position: Option<[f32; 2]>,
    /// Color class
    pub color: Option<u32>,
}

impl NodeData {
    /// Payload carrying only a label
    #[must_use]
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EdgeRecord {
    source: u32,
    target: u32,
    weight: f32,
}

/// Dense index-addressable node and edge store
///
/// At most one edge exists per ordered `(source, target)` pair, which keeps
/// pair lookup O(1). Undirected edges are modelled by callers as two directed
/// edges.
///
/// # Example
///
/// ```
/// use frontier_graph::{Graph, NodeId};
///
/// let mut graph = Graph::new();
/// graph.ensure_node(NodeId(0));
/// graph.ensure_node(NodeId(1));
/// let edge = graph.add_edge(NodeId(0), NodeId(1), 2.0).unwrap();
///
/// assert_eq!(graph.edge_between(NodeId(0), NodeId(1)).unwrap().id, edge);
/// assert_eq!(graph.num_edges(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Node payloads; `None` marks a removed (or never created) id
    nodes: Vec<Option<NodeData>>,

    /// Out-edge ids per node, in insertion order
    outgoing: Vec<Vec<EdgeId>>,

    /// In-edge ids per node, in insertion order
    incoming: Vec<Vec<EdgeId>>,

    /// Edge slots; removed edges leave `None`, ids are never reused
    edges: Vec<Option<EdgeRecord>>,

    /// `(source, target)` → edge id
    pairs: HashMap<(u32, u32), EdgeId>,

    num_nodes: usize,
    num_edges: usize,
}

impl Graph {
    /// Create new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for a known graph size
    #[must_use]
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
            outgoing: Vec::with_capacity(node_count),
            incoming: Vec::with_capacity(node_count),
            edges: Vec::with_capacity(edge_count),
            pairs: HashMap::with_capacity(edge_count),
            num_nodes: 0,
            num_edges: 0,
        }
    }

    /// Create graph from edge list, creating every endpoint
    ///
    /// A repeated `(source, target)` pair keeps the last weight.
    ///
    /// # Arguments
    ///
    /// * `edges` - List of (source, target, weight) tuples
    ///
    /// # Errors
    ///
    /// Does not fail for well-formed input; the `Result` mirrors `add_edge`.
    pub fn from_edge_list(edges: &[(NodeId, NodeId, f32)]) -> Result<Self> {
        let max_node = edges.iter().flat_map(|(src, dst, _)| [src.0, dst.0]).max();

        let mut graph = Self::with_capacity(max_node.map_or(0, |m| m as usize + 1), edges.len());
        for &(src, dst, weight) in edges {
            graph.ensure_node(src);
            graph.ensure_node(dst);
            graph.add_edge(src, dst, weight)?;
        }

        Ok(graph)
    }

    /// Add a node with the given payload
    ///
    /// # Errors
    ///
    /// Returns `NodeExists` if the id is already live.
    pub fn add_node(&mut self, id: NodeId, data: NodeData) -> Result<()> {
        self.grow_to(id.index() + 1);
        let slot = &mut self.nodes[id.index()];
        if slot.is_some() {
            return Err(GraphError::NodeExists(id).into());
        }
        *slot = Some(data);
        self.num_nodes += 1;
        Ok(())
    }

    /// Add the node with an empty payload unless it already exists
    ///
    /// Returns `true` if the node was created.
    pub fn ensure_node(&mut self, id: NodeId) -> bool {
        if self.contains_node(id) {
            return false;
        }
        self.grow_to(id.index() + 1);
        self.nodes[id.index()] = Some(NodeData::default());
        self.num_nodes += 1;
        true
    }

    /// Create a node at the next unused id with a payload from `config`
    pub fn insert_node_with<C: GraphConfiguration>(&mut self, config: &mut C) -> NodeId {
        #[allow(clippy::cast_possible_truncation)] // Graphs >4B nodes not supported
        let id = NodeId(self.nodes.len() as u32);
        let data = config.create_node(id);
        self.grow_to(id.index() + 1);
        self.nodes[id.index()] = Some(data);
        self.num_nodes += 1;
        id
    }

    /// Remove a node that has no incident edges
    ///
    /// Ids are not compacted; the slot simply becomes empty.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids and `NodeInUse` while edges
    /// still reference the node.
    pub fn remove_node(&mut self, id: NodeId) -> Result<NodeData> {
        let degree = self.out_edge_ids(id)?.len() + self.in_edge_ids(id)?.len();
        if degree > 0 {
            return Err(GraphError::NodeInUse { node: id, degree }.into());
        }
        self.num_nodes -= 1;
        self.nodes[id.index()]
            .take()
            .ok_or_else(|| GraphError::NodeNotFound(id).into())
    }

    /// Remove every incident edge, then the node
    ///
    /// Returns the number of edges removed.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn remove_node_with_edges(&mut self, id: NodeId) -> Result<usize> {
        let mut incident = self.out_edge_ids(id)?.to_vec();
        incident.extend_from_slice(self.in_edge_ids(id)?);
        incident.sort_unstable();
        incident.dedup();

        for &edge in &incident {
            self.remove_edge_by_id(edge)?;
        }
        self.remove_node(id)?;
        Ok(incident.len())
    }

    /// Add a directed edge between two live nodes
    ///
    /// If the pair already has an edge its weight is replaced and the existing
    /// id returned.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if either endpoint is missing.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, weight: f32) -> Result<EdgeId> {
        self.check_node(src)?;
        self.check_node(dst)?;

        if let Some(&existing) = self.pairs.get(&(src.0, dst.0)) {
            if let Some(record) = self.edges[existing.index()].as_mut() {
                record.weight = weight;
            }
            return Ok(existing);
        }

        #[allow(clippy::cast_possible_truncation)] // Graphs >4B edges not supported
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(EdgeRecord {
            source: src.0,
            target: dst.0,
            weight,
        }));
        self.outgoing[src.index()].push(id);
        self.incoming[dst.index()].push(id);
        self.pairs.insert((src.0, dst.0), id);
        self.num_edges += 1;

        Ok(id)
    }

    /// Add an edge whose weight comes from `config`
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if either endpoint is missing.
    pub fn connect_with<C: GraphConfiguration>(
        &mut self,
        src: NodeId,
        dst: NodeId,
        config: &mut C,
    ) -> Result<EdgeId> {
        let weight = config.create_edge(src, dst);
        self.add_edge(src, dst, weight)
    }

    /// Remove the edge between `src` and `dst`
    ///
    /// # Errors
    ///
    /// Returns `EdgeNotFound` if there is no such edge.
    pub fn remove_edge(&mut self, src: NodeId, dst: NodeId) -> Result<EdgeId> {
        let id = self
            .pairs
            .get(&(src.0, dst.0))
            .copied()
            .ok_or(GraphError::EdgeNotFound { from: src, to: dst })?;
        self.remove_edge_by_id(id)?;
        Ok(id)
    }

    /// Remove an edge by id
    ///
    /// # Errors
    ///
    /// Returns `EdgeIdNotFound` for unknown or already removed ids.
    pub fn remove_edge_by_id(&mut self, id: EdgeId) -> Result<EdgeRef> {
        let record = self
            .edges
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(GraphError::EdgeIdNotFound(id))?;

        self.outgoing[record.source as usize].retain(|&e| e != id);
        self.incoming[record.target as usize].retain(|&e| e != id);
        self.pairs.remove(&(record.source, record.target));
        self.num_edges -= 1;

        Ok(to_ref(id, record))
    }

    /// Look up the edge between two nodes
    ///
    /// # Errors
    ///
    /// Returns `EdgeNotFound` if there is no such edge.
    pub fn edge_between(&self, src: NodeId, dst: NodeId) -> Result<EdgeRef> {
        self.pairs
            .get(&(src.0, dst.0))
            .and_then(|&id| self.edge(id))
            .ok_or_else(|| GraphError::EdgeNotFound { from: src, to: dst }.into())
    }

    /// Whether an edge `src → dst` exists
    #[must_use]
    pub fn contains_edge(&self, src: NodeId, dst: NodeId) -> bool {
        self.pairs.contains_key(&(src.0, dst.0))
    }

    /// Look up an edge by id
    ///
    /// # Errors
    ///
    /// Returns `EdgeIdNotFound` for unknown or removed ids.
    pub fn edge_ref(&self, id: EdgeId) -> Result<EdgeRef> {
        self.edge(id)
            .ok_or_else(|| GraphError::EdgeIdNotFound(id).into())
    }

    /// Get outgoing neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn outgoing_neighbors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.check_node(node)?;
        Ok(self.out_edges(node).map(|e| e.target).collect())
    }

    /// Get incoming neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn incoming_neighbors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        self.check_node(node)?;
        Ok(self.in_edges(node).map(|e| e.source).collect())
    }

    /// Out-edge ids of a node, in insertion order
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn out_edge_ids(&self, node: NodeId) -> Result<&[EdgeId]> {
        self.check_node(node)?;
        Ok(&self.outgoing[node.index()])
    }

    /// In-edge ids of a node, in insertion order
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn in_edge_ids(&self, node: NodeId) -> Result<&[EdgeId]> {
        self.check_node(node)?;
        Ok(&self.incoming[node.index()])
    }

    /// Node payload
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or_else(|| GraphError::NodeNotFound(id).into())
    }

    /// Mutable node payload
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| GraphError::NodeNotFound(id).into())
    }

    /// Set node label (for debugging/export)
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` for unknown ids.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.label = Some(label.into());
        Ok(())
    }

    /// Get node label
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.node(id).ok().and_then(|data| data.label.as_deref())
    }

    /// Get number of live nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Get number of live edges
    #[must_use]
    pub const fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Live node ids in ascending order
    #[allow(clippy::cast_possible_truncation)]
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| NodeId(idx as u32)))
    }

    /// Live edges in id order
    #[allow(clippy::cast_possible_truncation)]
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.map(|record| to_ref(EdgeId(idx as u32), record)))
    }

    /// Highest edge id ever issued plus one (length of edge-indexed buffers)
    #[must_use]
    pub fn edge_bound(&self) -> usize {
        self.edges.len()
    }

    /// Pick a live node using the configuration's random source
    pub fn random_node<C: GraphConfiguration>(&self, config: &mut C) -> Option<NodeId> {
        if self.num_nodes == 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let skip = (config.next_random() % self.num_nodes as u64) as usize;
        self.node_ids().nth(skip)
    }

    /// Copy the subgraph induced by `nodes`, relabelled `0..nodes.len()`
    ///
    /// Payloads start from `config.create_node(new_id)` and inherit the
    /// original label, position and color where set; edge weights are copied.
    /// Duplicate ids in `nodes` are ignored after their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if any requested id is not live.
    pub fn induced_subgraph<C: GraphConfiguration>(
        &self,
        nodes: &[NodeId],
        config: &mut C,
    ) -> Result<Self> {
        let mut mapping: HashMap<NodeId, NodeId> = HashMap::with_capacity(nodes.len());
        let mut sub = Self::with_capacity(nodes.len(), 0);

        for &old in nodes {
            let original = self.node(old)?;
            if mapping.contains_key(&old) {
                continue;
            }
            let new = sub.insert_node_with(config);
            let data = sub.node_mut(new)?;
            if original.label.is_some() {
                data.label.clone_from(&original.label);
            }
            if original.position.is_some() {
                data.position = original.position;
            }
            if original.color.is_some() {
                data.color = original.color;
            }
            mapping.insert(old, new);
        }

        for edge in self.edges() {
            if let (Some(&src), Some(&dst)) = (mapping.get(&edge.source), mapping.get(&edge.target))
            {
                sub.add_edge(src, dst, edge.weight)?;
            }
        }

        Ok(sub)
    }

    /// Expand slot vectors to hold `new_size` ids
    fn grow_to(&mut self, new_size: usize) {
        if new_size <= self.nodes.len() {
            return;
        }
        self.nodes.resize_with(new_size, || None);
        self.outgoing.resize_with(new_size, Vec::new);
        self.incoming.resize_with(new_size, Vec::new);
    }

    fn record(&self, id: EdgeId) -> Option<EdgeRecord> {
        self.edges.get(id.index()).copied().flatten()
    }
}

const fn to_ref(id: EdgeId, record: EdgeRecord) -> EdgeRef {
    EdgeRef {
        id,
        source: NodeId(record.source),
        target: NodeId(record.target),
        weight: record.weight,
    }
}

impl Topology for Graph {
    fn node_bound(&self) -> usize {
        self.nodes.len()
    }

    fn contains_node(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node.index()), Some(Some(_)))
    }

    fn edge(&self, id: EdgeId) -> Option<EdgeRef> {
        self.record(id).map(|record| to_ref(id, record))
    }

    fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_ {
        self.outgoing
            .get(node.index())
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(move |&id| self.edge(id))
    }

    fn in_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeRef> + '_ {
        self.incoming
            .get(node.index())
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(move |&id| self.edge(id))
    }

    fn out_edge_at(&self, node: NodeId, position: usize) -> Option<EdgeRef> {
        let id = *self.outgoing.get(node.index())?.get(position)?;
        self.edge(id)
    }
}
