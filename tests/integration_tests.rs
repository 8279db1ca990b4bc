//! Integration tests for frontier-graph
//!
//! Tests real-world usage scenarios (cycles, call graphs, long chains) through
//! the public API only

use frontier_graph::{
    any_path, bidirectional_path, find_callers, DefaultConfiguration, DisjointSet,
    DistancePolicy, EngineConfig, FrontierEngine, Graph, GraphError, LowLinkFinder, NodeData,
    NodeId, ScratchPool,
};

fn cycle(n: u32) -> Graph {
    let edges: Vec<_> = (0..n)
        .map(|i| (NodeId(i), NodeId((i + 1) % n), 1.0))
        .collect();
    Graph::from_edge_list(&edges).unwrap()
}

#[test]
fn test_directed_cycle_shortest_path() {
    // 0 → 1 → 2 → 3 → 4 → 0, uniform weight 1
    let graph = cycle(5);
    let pool = ScratchPool::new();

    for config in [EngineConfig::sequential(), EngineConfig::parallel()] {
        let policy = DistancePolicy::new(&graph, &pool, NodeId(0));
        let summary = FrontierEngine::new(&graph, &pool, config)
            .run(&policy)
            .unwrap();

        assert!(summary.done);
        assert_eq!(policy.distance(NodeId(3)).unwrap(), 3.0);
        assert_eq!(
            policy.get_path(NodeId(0), NodeId(3)).unwrap(),
            vec![NodeId(0), NodeId(1), NodeId(2), NodeId(3)]
        );
    }
    assert_eq!(pool.outstanding(), 0);
}

#[test]
fn test_two_triangles_components() {
    // 0 → 1 → 2 → 0 and 3 → 4 → 5 → 3, nothing between them
    let graph = Graph::from_edge_list(&[
        (NodeId(0), NodeId(1), 1.0),
        (NodeId(1), NodeId(2), 1.0),
        (NodeId(2), NodeId(0), 1.0),
        (NodeId(3), NodeId(4), 1.0),
        (NodeId(4), NodeId(5), 1.0),
        (NodeId(5), NodeId(3), 1.0),
    ])
    .unwrap();
    let pool = ScratchPool::new();

    let scc = LowLinkFinder::new(&graph, &pool).run().unwrap();
    assert_eq!(scc.component_count(), 2);
    assert!(scc.same_component(NodeId(0), NodeId(2)).unwrap());
    assert!(scc.same_component(NodeId(4), NodeId(5)).unwrap());
    assert!(!scc.same_component(NodeId(1), NodeId(4)).unwrap());
    assert_ne!(
        scc.component_id(NodeId(0)).unwrap(),
        scc.component_id(NodeId(3)).unwrap()
    );

    let mut forest = frontier_graph::weak_components(&graph).unwrap();
    assert!(forest.same_set(NodeId(0), NodeId(1)).unwrap());
    assert!(!forest.same_set(NodeId(2), NodeId(3)).unwrap());
    assert_eq!(forest.set_count(), 2);
}

#[test]
fn test_removed_edge_is_unreachable() {
    let mut graph = Graph::from_edge_list(&[(NodeId(0), NodeId(1), 1.0)]).unwrap();
    graph.remove_edge(NodeId(0), NodeId(1)).unwrap();
    let pool = ScratchPool::new();

    let policy = DistancePolicy::new(&graph, &pool, NodeId(0));
    FrontierEngine::new(&graph, &pool, EngineConfig::default())
        .run(&policy)
        .unwrap();

    assert!(policy.distance(NodeId(1)).unwrap().is_infinite());
    assert!(policy.get_path(NodeId(0), NodeId(1)).unwrap().is_empty());
}

#[test]
fn test_bidirectional_on_long_path() {
    let edges: Vec<_> = (0..999)
        .map(|i| (NodeId(i), NodeId(i + 1), 1.0))
        .collect();
    let graph = Graph::from_edge_list(&edges).unwrap();
    let pool = ScratchPool::new();

    for config in [EngineConfig::sequential(), EngineConfig::parallel()] {
        let meet = bidirectional_path(&graph, &pool, NodeId(0), NodeId(999), config).unwrap();
        let direct = any_path(&graph, &pool, NodeId(0), NodeId(999), config).unwrap();
        assert_eq!(meet.len(), 1000);
        assert_eq!(meet, direct);
    }
    assert_eq!(pool.outstanding(), 0);
}

#[test]
fn test_simple_call_graph() {
    // main() → parse_args(), validate(), execute()
    // parse_args() → validate()
    let mut graph = Graph::new();
    for (id, name) in ["main", "parse_args", "validate", "execute"]
        .into_iter()
        .enumerate()
    {
        graph
            .add_node(NodeId(id as u32), NodeData::labeled(name))
            .unwrap();
    }
    graph.add_edge(NodeId(0), NodeId(1), 1.0).unwrap(); // main → parse_args
    graph.add_edge(NodeId(0), NodeId(2), 1.0).unwrap(); // main → validate
    graph.add_edge(NodeId(0), NodeId(3), 1.0).unwrap(); // main → execute
    graph.add_edge(NodeId(1), NodeId(2), 1.0).unwrap(); // parse_args → validate

    let pool = ScratchPool::new();
    let callers = find_callers(&graph, &pool, NodeId(2), 10).unwrap();
    let names: Vec<_> = callers.iter().filter_map(|&n| graph.label(n)).collect();
    assert_eq!(names, vec!["main", "parse_args"]);

    assert_eq!(graph.num_nodes(), 4);
    assert_eq!(graph.num_edges(), 4);
}

#[test]
fn test_policy_error_leaves_pool_clean() {
    let graph = Graph::from_edge_list(&[
        (NodeId(0), NodeId(1), 1.0),
        (NodeId(1), NodeId(2), -3.0),
    ])
    .unwrap();
    let pool = ScratchPool::new();

    for config in [
        EngineConfig::sequential(),
        EngineConfig::parallel().with_parallel_threshold(1),
    ] {
        let err = {
            let policy = DistancePolicy::new(&graph, &pool, NodeId(0));
            FrontierEngine::new(&graph, &pool, config)
                .run(&policy)
                .unwrap_err()
        };
        assert!(matches!(
            err.downcast_ref::<GraphError>(),
            Some(GraphError::NegativeWeight { .. })
        ));
        assert_eq!(pool.outstanding(), 0);
    }
}

#[test]
fn test_induced_subgraph_feeds_kernels() {
    let graph = cycle(6);
    let mut config = DefaultConfiguration::new();
    let sub = graph
        .induced_subgraph(&[NodeId(1), NodeId(2), NodeId(3)], &mut config)
        .unwrap();
    let pool = ScratchPool::new();

    // Relabelled chain 0 → 1 → 2, no way back
    let scc = LowLinkFinder::new(&sub, &pool).run().unwrap();
    assert_eq!(scc.component_count(), 3);
    let path = any_path(&sub, &pool, NodeId(0), NodeId(2), EngineConfig::default()).unwrap();
    assert_eq!(path, vec![NodeId(0), NodeId(1), NodeId(2)]);

    let mut forest = DisjointSet::from_topology(&sub);
    forest.union(NodeId(0), NodeId(2)).unwrap();
    assert_eq!(forest.set_count(), 2);
}
