//! Property-based tests for graph validation and transforms.

use graphsim_core::{Error, Graph};
use proptest::prelude::*;

/// Generate a well-formed graph: node types below `vocab`, edges in range.
fn arb_graph(vocab: u32, edge_vocab: u32) -> impl Strategy<Value = Graph> {
    (1usize..24).prop_flat_map(move |n| {
        let nodes = prop::collection::vec(0..vocab, n);
        let edges = prop::collection::vec((0..n as u32, 0..n as u32, 0..edge_vocab), 0..48);
        (nodes, edges).prop_map(|(nodes, edges)| {
            let types = edges.iter().map(|&(_, _, t)| t).collect();
            let edges = edges.iter().map(|&(s, d, _)| (s, d)).collect();
            Graph::new(nodes, edges).with_edge_types(types)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn generated_graphs_validate(g in arb_graph(12, 20)) {
        prop_assert!(g.validate(12, 20).is_ok());
    }

    #[test]
    fn shrunk_vocabulary_is_rejected(g in arb_graph(12, 20)) {
        let max_type = *g.node_types.iter().max().unwrap();
        let result = g.validate(max_type as usize, 20);
        let rejected = matches!(result, Err(Error::NodeTypeOutOfRange { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn transforms_stay_valid(g in arb_graph(12, 20)) {
        prop_assert!(g.add_self_loops().validate(12, 20).is_ok());
        prop_assert!(g.to_undirected().validate(12, 20).is_ok());
        prop_assert_eq!(g.reversed().reversed(), g.clone());
    }

    #[test]
    fn self_loops_cover_every_node(g in arb_graph(12, 20)) {
        let stats = g.add_self_loops().stats();
        prop_assert!(stats.self_loops >= g.num_nodes());
        prop_assert_eq!(stats.isolated_nodes, 0);
    }

    #[test]
    fn undirected_in_degree_equals_out_degree(g in arb_graph(12, 20)) {
        let u = g.to_undirected();
        let mut in_deg = vec![0usize; u.num_nodes()];
        let mut out_deg = vec![0usize; u.num_nodes()];
        for &(s, d) in &u.edges {
            out_deg[s as usize] += 1;
            in_deg[d as usize] += 1;
        }
        prop_assert_eq!(in_deg, out_deg);
    }
}
