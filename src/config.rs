//! Engine and graph-materialisation configuration
//!
//! [`EngineConfig`] picks the execution strategy and walk direction of a
//! frontier run. [`GraphConfiguration`] is what higher-level operations hand
//! to the store when they need new nodes or edges materialised.

use crate::storage::{Direction, NodeData, NodeId};

/// Frontiers smaller than this stay on the calling thread in parallel mode
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Seed used by [`DefaultConfiguration::new`]
pub const DEFAULT_RANDOM_SEED: u64 = 12345;

/// How a round's frontier is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Frontier nodes in deterministic order on the calling thread
    #[default]
    Sequential,
    /// Frontier nodes fanned out over the rayon pool, joined per round
    Parallel,
}

/// Frontier engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Sequential or parallel rounds
    pub mode: ExecutionMode,
    /// Default walk direction for nodes without an override
    pub direction: Direction,
    /// Minimum frontier size before parallel mode fans out
    pub parallel_threshold: usize,
    /// Optional cap on the number of rounds
    pub max_rounds: Option<usize>,
}

impl EngineConfig {
    /// Sequential rounds over out-edges
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            direction: Direction::Out,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_rounds: None,
        }
    }

    /// Parallel rounds over out-edges
    #[must_use]
    pub const fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            ..Self::sequential()
        }
    }

    /// Set the default walk direction
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the minimum frontier size for parallel fan-out
    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Stop after at most `rounds` rounds
    #[must_use]
    pub const fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Whether a frontier of `len` nodes should be processed in parallel
    #[must_use]
    pub const fn should_parallelize(&self, len: usize) -> bool {
        matches!(self.mode, ExecutionMode::Parallel) && len >= self.parallel_threshold
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::sequential()
    }
}

/// Factory for nodes and edges that higher-level operations materialise
///
/// The core never invents nodes or edges on its own; it asks this trait
/// whenever a caller requests a new node id, a new edge, or a cloned subgraph.
pub trait GraphConfiguration {
    /// Payload for a freshly created node
    fn create_node(&mut self, id: NodeId) -> NodeData {
        let _ = id;
        NodeData::default()
    }

    /// Weight for a freshly created edge
    fn create_edge(&mut self, source: NodeId, target: NodeId) -> f32 {
        let _ = (source, target);
        1.0
    }

    /// Next value from the configuration's random source
    fn next_random(&mut self) -> u64;
}

/// Unit weights, empty payloads, seeded LCG random source
#[derive(Debug, Clone)]
pub struct DefaultConfiguration {
    rng_state: u64,
    edge_weight: f32,
}

impl DefaultConfiguration {
    /// Configuration seeded with [`DEFAULT_RANDOM_SEED`]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_seed(DEFAULT_RANDOM_SEED)
    }

    /// Configuration with an explicit seed (reproducible runs)
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            rng_state: seed,
            edge_weight: 1.0,
        }
    }

    /// Weight given to every created edge
    #[must_use]
    pub const fn with_edge_weight(mut self, weight: f32) -> Self {
        self.edge_weight = weight;
        self
    }
}

impl Default for DefaultConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphConfiguration for DefaultConfiguration {
    fn create_edge(&mut self, _source: NodeId, _target: NodeId) -> f32 {
        self.edge_weight
    }

    fn next_random(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        // High bits of an LCG are the well-mixed ones
        self.rng_state >> 16
    }
}
