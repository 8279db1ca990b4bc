//! Property-based tests for frontier-graph
//!
//! Verifies kernel invariants hold for arbitrary graphs

use frontier_graph::{
    any_path, bfs, bidirectional_path, CsrGraph, DisjointSet, DistancePolicy, EngineConfig,
    FrontierEngine, Graph, LowLinkFinder, NodeId, ScratchPool, Topology,
};
use proptest::prelude::*;

// Property: sequential and parallel rounds converge to the same distances
proptest! {
    #[test]
    fn prop_parallel_distances_match_sequential(edges in prop_edge_list(0usize..150usize, 1u32..40u32)) {
        let graph = build(&edges);
        let pool = ScratchPool::new();

        let sequential = DistancePolicy::new(&graph, &pool, NodeId(0));
        FrontierEngine::new(&graph, &pool, EngineConfig::sequential()).run(&sequential).unwrap();

        let parallel = DistancePolicy::new(&graph, &pool, NodeId(0));
        FrontierEngine::new(&graph, &pool, EngineConfig::parallel().with_parallel_threshold(1))
            .run(&parallel)
            .unwrap();

        prop_assert_eq!(sequential.distances().unwrap(), parallel.distances().unwrap());
    }
}

// Property: every finite distance is realised by the recorded path
proptest! {
    #[test]
    fn prop_paths_are_valid(edges in prop_edge_list(0usize..150usize, 1u32..40u32)) {
        let graph = build(&edges);
        let pool = ScratchPool::new();
        let policy = DistancePolicy::new(&graph, &pool, NodeId(0));
        FrontierEngine::new(&graph, &pool, EngineConfig::parallel().with_parallel_threshold(2))
            .run(&policy)
            .unwrap();

        for (node, distance) in policy.distances().unwrap() {
            let nodes = policy.get_path(NodeId(0), node).unwrap();
            let edges = policy.get_edge_path(NodeId(0), node).unwrap();

            prop_assert_eq!(nodes.first(), Some(&NodeId(0)));
            prop_assert_eq!(nodes.last(), Some(&node));
            prop_assert_eq!(nodes.len(), edges.len() + 1);
            for pair in nodes.windows(2) {
                prop_assert!(graph.contains_edge(pair[0], pair[1]));
            }
            // Integer weights keep the sum exact
            let total: f32 = edges.iter().map(|edge| edge.weight).sum();
            prop_assert_eq!(total, distance);
        }
    }
}

// Property: find is stable and same_set is an equivalence
proptest! {
    #[test]
    fn prop_union_find_idempotent(
        unions in prop::collection::vec((0u32..30, 0u32..30), 0..60),
        probes in prop::collection::vec((0u32..30, 0u32..30, 0u32..30), 1..20),
    ) {
        let mut forest = DisjointSet::new();
        for i in 0..30 {
            forest.make_set(NodeId(i));
        }
        for &(a, b) in &unions {
            forest.union(NodeId(a), NodeId(b)).unwrap();
        }

        let first: Vec<_> = (0..30).map(|i| forest.find(NodeId(i)).unwrap()).collect();
        let second: Vec<_> = (0..30).map(|i| forest.find(NodeId(i)).unwrap()).collect();
        prop_assert_eq!(&first, &second);

        for &(a, b, c) in &probes {
            let (a, b, c) = (NodeId(a), NodeId(b), NodeId(c));
            prop_assert!(forest.same_set(a, a).unwrap());
            prop_assert_eq!(forest.same_set(a, b).unwrap(), forest.same_set(b, a).unwrap());
            if forest.same_set(a, b).unwrap() && forest.same_set(b, c).unwrap() {
                prop_assert!(forest.same_set(a, c).unwrap());
            }
        }
    }
}

// Property: low-link components agree with brute-force mutual reachability
proptest! {
    #[test]
    fn prop_low_link_matches_reachability(edges in prop_edge_list(0usize..60usize, 1u32..15u32)) {
        let graph = build(&edges);
        let pool = ScratchPool::new();
        let scc = LowLinkFinder::new(&graph, &pool).run().unwrap();

        let ids: Vec<NodeId> = graph.node_ids().collect();
        let reach: Vec<Vec<NodeId>> = ids
            .iter()
            .map(|&node| bfs(&graph, &pool, node).unwrap())
            .collect();

        for (i, &a) in ids.iter().enumerate() {
            for (j, &b) in ids.iter().enumerate() {
                let mutual = reach[i].contains(&b) && reach[j].contains(&a);
                prop_assert_eq!(scc.same_component(a, b).unwrap(), mutual);
            }
        }
    }
}

// Property: meet-in-the-middle finds a path whenever one exists, within one hop of minimal
proptest! {
    #[test]
    fn prop_meet_in_the_middle_bound(
        edges in prop_edge_list(0usize..120usize, 2u32..40u32),
        parallel in any::<bool>(),
    ) {
        let graph = build(&edges);
        let pool = ScratchPool::new();
        let config = if parallel {
            EngineConfig::parallel().with_parallel_threshold(1)
        } else {
            EngineConfig::sequential()
        };
        let target = last_node(&graph);

        let direct = any_path(&graph, &pool, NodeId(0), target, config).unwrap();
        let meet = bidirectional_path(&graph, &pool, NodeId(0), target, config).unwrap();

        prop_assert_eq!(direct.is_empty(), meet.is_empty());
        if !meet.is_empty() {
            prop_assert!(meet.len() <= direct.len() + 1);
            prop_assert_eq!(meet.first(), Some(&NodeId(0)));
            prop_assert_eq!(meet.last(), Some(&target));
            for pair in meet.windows(2) {
                prop_assert!(graph.contains_edge(pair[0], pair[1]));
            }
        }
        prop_assert_eq!(pool.outstanding(), 0);
    }
}

// Property: runs release every buffer, including runs that fail
proptest! {
    #[test]
    fn prop_pool_hygiene(
        edges in prop_edge_list(0usize..80usize, 1u32..30u32),
        poison in any::<bool>(),
    ) {
        let mut graph = build(&edges);
        if poison {
            let last = last_node(&graph);
            graph.ensure_node(NodeId(last.0 + 1));
            graph.add_edge(NodeId(0), NodeId(last.0 + 1), -1.0).unwrap();
        }
        let pool = ScratchPool::new();

        let outcome = {
            let policy = DistancePolicy::new(&graph, &pool, NodeId(0));
            FrontierEngine::new(&graph, &pool, EngineConfig::parallel().with_parallel_threshold(1))
                .run(&policy)
        };
        prop_assert_eq!(outcome.is_err(), poison);
        {
            let _scc = LowLinkFinder::new(&graph, &pool).run().unwrap();
        }
        prop_assert_eq!(pool.outstanding(), 0);
    }
}

// Property: the CSR snapshot exposes the same adjacency as the store
proptest! {
    #[test]
    fn prop_csr_snapshot_matches_store(edges in prop_edge_list(0usize..100usize, 1u32..20u32)) {
        let graph = build(&edges);
        let csr = CsrGraph::from_graph(&graph);

        let (row_offsets, col_indices, edge_weights) = csr.csr_components();
        for pair in row_offsets.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        prop_assert_eq!(row_offsets.last().copied(), Some(col_indices.len() as u32));
        prop_assert_eq!(col_indices.len(), edge_weights.len());
        prop_assert_eq!(csr.num_edges(), graph.num_edges());

        for node in graph.node_ids() {
            let expected: Vec<u32> = graph
                .outgoing_neighbors(node)
                .unwrap()
                .iter()
                .map(|n| n.0)
                .collect();
            prop_assert_eq!(csr.outgoing_neighbors(node).unwrap(), expected.as_slice());
        }
    }
}

// Helper: Generate arbitrary edge list with small integer weights
fn prop_edge_list(
    num_edges: impl Strategy<Value = usize>,
    max_node: impl Strategy<Value = u32>,
) -> impl Strategy<Value = Vec<(NodeId, NodeId, f32)>> {
    (num_edges, max_node).prop_flat_map(|(n, max_node)| {
        // Ensure max_node is at least 1 to avoid empty range
        let max_node = max_node.max(1);
        prop::collection::vec(
            (0..max_node, 0..max_node, 0u8..10)
                .prop_map(|(src, dst, weight)| (NodeId(src), NodeId(dst), f32::from(weight))),
            0..=n,
        )
    })
}

// Helper: Build a store that always contains node 0
fn build(edges: &[(NodeId, NodeId, f32)]) -> Graph {
    let mut graph = Graph::from_edge_list(edges).unwrap();
    graph.ensure_node(NodeId(0));
    graph
}

// Helper: Highest issued id (node 0 is always present)
fn last_node(graph: &Graph) -> NodeId {
    graph.max_node_id().unwrap_or(NodeId(0))
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_edge_list_graph() {
        let graph = build(&[]);
        let pool = ScratchPool::new();

        assert_eq!(graph.num_nodes(), 1);
        assert_eq!(graph.num_edges(), 0);
        assert_eq!(bfs(&graph, &pool, NodeId(0)).unwrap(), vec![NodeId(0)]);
    }

    #[test]
    fn test_single_edge_snapshot() {
        let graph = build(&[(NodeId(0), NodeId(1), 1.0)]);
        let csr = CsrGraph::from_graph(&graph);

        let (row_offsets, col_indices, edge_weights) = csr.csr_components();
        // row_offsets: [0, 1, 1] (node 0 has 1 edge, node 1 has 0 edges)
        assert_eq!(row_offsets, &[0, 1, 1]);
        assert_eq!(col_indices, &[1]);
        assert_eq!(edge_weights, &[1.0]);
    }
}
