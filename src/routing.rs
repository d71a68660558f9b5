//! Route calculation over the latency-weighted topology.
//!
//! Routing tables are derived data: the topology store recomputes every
//! node's table from scratch after each link change. Next hops come
//! from a single-source Dijkstra pass that carries "the hop taken out
//! of the source" forward through each relaxation, so the table entry
//! for a destination is the first node on the chosen shortest path.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::node::NodeId;
use crate::topology::Topology;

// ── Protocol flag ─────────────────────────────────────────────────────

/// Which routing protocol the topology store runs on link changes.
///
/// Only `ShortestPath` computes tables. The other settings are accepted
/// as configuration but leave routing tables untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RoutingProtocol {
    #[default]
    ShortestPath,
    DistanceVector,
    LinkState,
}

impl std::fmt::Display for RoutingProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoutingProtocol::ShortestPath => "shortest_path",
            RoutingProtocol::DistanceVector => "distance_vector",
            RoutingProtocol::LinkState => "link_state",
        };
        f.write_str(name)
    }
}

// ── Routing table ─────────────────────────────────────────────────────

/// Destination → next hop. Never contains the owning node's own id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RoutingTable {
    routes: BTreeMap<NodeId, NodeId>,
}

impl RoutingTable {
    pub fn new() -> Self {
        RoutingTable {
            routes: BTreeMap::new(),
        }
    }

    pub fn next_hop(&self, destination: &NodeId) -> Option<&NodeId> {
        self.routes.get(destination)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate `(destination, next_hop)` pairs in destination order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.routes.iter()
    }
}

impl From<BTreeMap<NodeId, NodeId>> for RoutingTable {
    fn from(routes: BTreeMap<NodeId, NodeId>) -> Self {
        RoutingTable { routes }
    }
}

// ── Route ─────────────────────────────────────────────────────────────

/// A full shortest path between two nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Every node visited, source first and destination last.
    pub path: Vec<NodeId>,
    /// Sum of link latencies along `path`.
    pub cost: f64,
}

impl Route {
    /// Number of links traversed.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────

/// Heap entry. Ordered so `BinaryHeap` pops the smallest
/// `(cost, seq)` first; `seq` is the push order and makes ties
/// between equal-cost paths deterministic.
#[derive(Debug)]
struct Candidate<'a> {
    cost: f64,
    seq: u64,
    node: &'a NodeId,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behaviour.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Settled state of one single-source search.
struct ShortestPathTree<'a> {
    cost: BTreeMap<&'a NodeId, f64>,
    /// Destination → first hop out of the source.
    first_hop: BTreeMap<&'a NodeId, &'a NodeId>,
    /// Destination → previous node on the path.
    previous: BTreeMap<&'a NodeId, &'a NodeId>,
}

fn dijkstra<'a>(topology: &'a Topology, source: &'a NodeId) -> ShortestPathTree<'a> {
    let mut tree = ShortestPathTree {
        cost: BTreeMap::new(),
        first_hop: BTreeMap::new(),
        previous: BTreeMap::new(),
    };
    if !topology.contains(source) {
        return tree;
    }

    let mut heap = BinaryHeap::new();
    let mut settled: BTreeSet<&NodeId> = BTreeSet::new();
    let mut seq = 0u64;

    tree.cost.insert(source, 0.0);
    heap.push(Candidate {
        cost: 0.0,
        seq,
        node: source,
    });

    while let Some(Candidate { cost, node, .. }) = heap.pop() {
        if !settled.insert(node) {
            continue;
        }
        let Some(current) = topology.node(node) else {
            continue;
        };

        for (neighbor, latency) in current.connections() {
            let candidate = cost + latency;
            let improves = tree
                .cost
                .get(neighbor)
                .map_or(true, |best| candidate < *best);
            if !improves {
                continue;
            }
            let hop = if node == source {
                Some(neighbor)
            } else {
                tree.first_hop.get(node).copied()
            };
            let Some(hop) = hop else {
                continue;
            };

            tree.cost.insert(neighbor, candidate);
            tree.previous.insert(neighbor, node);
            tree.first_hop.insert(neighbor, hop);

            seq += 1;
            heap.push(Candidate {
                cost: candidate,
                seq,
                node: neighbor,
            });
        }
    }

    tree
}

/// Next hop from `source` to every reachable destination.
///
/// Unreachable nodes and `source` itself are omitted. An unknown
/// `source` yields an empty map.
pub fn compute_next_hops(topology: &Topology, source: &NodeId) -> BTreeMap<NodeId, NodeId> {
    dijkstra(topology, source)
        .first_hop
        .into_iter()
        .filter(|(dest, _)| *dest != source)
        .map(|(dest, hop)| (dest.clone(), hop.clone()))
        .collect()
}

/// The full shortest path from `from` to `to`, or `None` if either node
/// is unknown or `to` is unreachable.
///
/// Uses the same search as [`compute_next_hops`], so `path[1]` agrees
/// with `from`'s routing-table entry for `to`.
pub fn shortest_path(topology: &Topology, from: &NodeId, to: &NodeId) -> Option<Route> {
    if !topology.contains(to) {
        return None;
    }
    let tree = dijkstra(topology, from);
    if from == to {
        return tree.cost.contains_key(from).then(|| Route {
            path: vec![from.clone()],
            cost: 0.0,
        });
    }

    let cost = *tree.cost.get(to)?;
    let mut path = vec![to.clone()];
    let mut cursor = to;
    while cursor != from {
        cursor = *tree.previous.get(cursor)?;
        path.push(cursor.clone());
    }
    path.reverse();
    Some(Route { path, cost })
}
