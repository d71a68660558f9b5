//! Property-based tests for routing and forwarding.
//!
//! Random undirected graphs with integer latencies are checked against a
//! brute-force all-pairs reference, so every cost compares exactly.
//! Latencies are strictly positive, so forwarding always makes progress.

use std::collections::BTreeMap;

use netsim::{NodeId, PacketSpec, Simulator, SimulatorConfig};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
struct Graph {
    nodes: usize,
    /// Links in insertion order. Later duplicates overwrite earlier ones.
    links: Vec<(usize, usize, u8)>,
}

fn arb_graph(max_nodes: usize, max_links: usize) -> impl Strategy<Value = Graph> {
    (2..=max_nodes).prop_flat_map(move |n| {
        proptest::collection::vec((0..n, 0..n, 1..10u8), 0..=max_links).prop_map(move |raw| Graph {
            nodes: n,
            links: raw.into_iter().filter(|(a, b, _)| a != b).collect(),
        })
    })
}

fn name(i: usize) -> NodeId {
    NodeId::new(format!("n{i}"))
}

fn build(graph: &Graph) -> Simulator {
    let config = SimulatorConfig::default().with_default_processing_delay(0.0);
    let mut sim = Simulator::with_config(config).unwrap();
    for i in 0..graph.nodes {
        sim.add_node(name(i)).unwrap();
    }
    for &(a, b, latency) in &graph.links {
        sim.add_connection(name(a), name(b), latency as f64).unwrap();
    }
    sim
}

/// Floyd–Warshall over the final link set.
fn all_pairs(graph: &Graph) -> Vec<Vec<Option<f64>>> {
    let n = graph.nodes;
    let mut latest: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for &(a, b, latency) in &graph.links {
        latest.insert((a.min(b), a.max(b)), latency as f64);
    }

    let mut dist = vec![vec![None; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = Some(0.0);
    }
    for (&(a, b), &latency) in &latest {
        dist[a][b] = Some(latency);
        dist[b][a] = Some(latency);
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if let (Some(ik), Some(kj)) = (dist[i][k], dist[k][j]) {
                    let via = ik + kj;
                    if dist[i][j].map_or(true, |d| via < d) {
                        dist[i][j] = Some(via);
                    }
                }
            }
        }
    }
    dist
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every link is recorded on both endpoints with the same latency.
    #[test]
    fn connections_are_symmetric(graph in arb_graph(8, 20)) {
        let sim = build(&graph);
        for node in sim.topology().nodes() {
            for (neighbor, &latency) in node.connections() {
                let back = sim.node(neighbor).and_then(|n| n.latency_to(node.id()));
                prop_assert_eq!(back, Some(latency));
            }
        }
    }

    /// Next hops lie on a shortest path; unreachable nodes have none.
    #[test]
    fn next_hops_are_optimal(graph in arb_graph(8, 20)) {
        let sim = build(&graph);
        let dist = all_pairs(&graph);

        for s in 0..graph.nodes {
            let table = sim.routing_table(&name(s)).unwrap();
            prop_assert!(table.next_hop(&name(s)).is_none());

            for d in (0..graph.nodes).filter(|&d| d != s) {
                let hop = table.next_hop(&name(d));
                match dist[s][d] {
                    None => {
                        prop_assert!(hop.is_none());
                        prop_assert!(sim.shortest_path(&name(s), &name(d)).is_none());
                    }
                    Some(best) => {
                        let hop = hop.unwrap();
                        let h: usize = hop.as_str()[1..].parse().unwrap();
                        let first = sim.topology().latency(&name(s), hop).unwrap();
                        prop_assert_eq!(Some(first + dist[h][d].unwrap()), Some(best));

                        let (src, dst) = (name(s), name(d));
                        let route = sim.shortest_path(&src, &dst).unwrap();
                        prop_assert_eq!(route.cost, best);
                        prop_assert_eq!(route.path.first(), Some(&src));
                        prop_assert_eq!(route.path.last(), Some(&dst));
                    }
                }
            }
        }
    }

    /// With zero processing delay, a reachable packet arrives exactly at
    /// its shortest-path distance; an unreachable one logs only its source.
    #[test]
    fn packets_arrive_at_shortest_distance(
        graph in arb_graph(7, 15),
        s in 0..7usize,
        d in 0..7usize,
    ) {
        prop_assume!(s < graph.nodes && d < graph.nodes);
        let mut sim = build(&graph);
        let dist = all_pairs(&graph);

        let log = sim
            .run_simulation(1_000.0, vec![PacketSpec::new(name(s), name(d), "")])
            .unwrap();
        let last = log.entries().last().unwrap();
        let dst = name(d);

        match dist[s][d] {
            Some(best) => {
                prop_assert_eq!(&last.node, &dst);
                prop_assert_eq!(last.time.as_secs(), best);
                prop_assert_eq!(last.hops as usize, log.len() - 1);
            }
            None => prop_assert_eq!(log.len(), 1),
        }
        prop_assert!(sim.is_idle());
    }
}
