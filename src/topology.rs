//! Topology store: nodes, symmetric weighted links and routing tables.
//!
//! Every successful link change recomputes the routing table of every
//! node from scratch. Global recomputation costs O(V·(V+E) log V) per
//! link but keeps routing state a pure function of the current graph.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{NetSimError, NetSimResult};
use crate::node::{Node, NodeId};
use crate::packet::PacketId;
use crate::routing::{self, RoutingProtocol, RoutingTable};

/// Owns every `Node` in the simulated network.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: BTreeMap<NodeId, Node>,
    protocol: RoutingProtocol,
}

impl Topology {
    /// Create an empty topology that routes with `protocol`.
    pub fn new(protocol: RoutingProtocol) -> Self {
        Topology {
            nodes: BTreeMap::new(),
            protocol,
        }
    }

    pub fn protocol(&self) -> RoutingProtocol {
        self.protocol
    }

    // ── Mutation ──────────────────────────────────────────────────

    /// Register a node with no links and an empty routing table.
    ///
    /// Rejects duplicate ids and negative or non-finite delays; the
    /// existing node is left untouched in both cases.
    pub fn add_node(&mut self, id: NodeId, processing_delay: f64) -> NetSimResult<()> {
        if !processing_delay.is_finite() || processing_delay < 0.0 {
            return Err(NetSimError::InvalidDelay {
                node: id,
                delay: processing_delay,
            });
        }
        if self.nodes.contains_key(&id) {
            return Err(NetSimError::NodeAlreadyRegistered(id));
        }

        debug!(node = %id, processing_delay, "node added");
        self.nodes.insert(id.clone(), Node::new(id, processing_delay));
        Ok(())
    }

    /// Link `a` and `b` in both directions with the same latency, then
    /// recompute every routing table.
    ///
    /// Re-linking an existing pair overwrites the latency on both sides.
    pub fn add_connection(&mut self, a: &NodeId, b: &NodeId, latency: f64) -> NetSimResult<()> {
        if !latency.is_finite() || latency < 0.0 {
            return Err(NetSimError::InvalidLatency {
                a: a.clone(),
                b: b.clone(),
                latency,
            });
        }
        for id in [a, b] {
            if !self.nodes.contains_key(id) {
                return Err(NetSimError::NodeNotFound(id.clone()));
            }
        }

        if let Some(node) = self.nodes.get_mut(a) {
            node.connect(b.clone(), latency);
        }
        if let Some(node) = self.nodes.get_mut(b) {
            node.connect(a.clone(), latency);
        }
        debug!(%a, %b, latency, "link added");

        self.recompute_routes();
        Ok(())
    }

    /// Rebuild the routing table of every node for the configured protocol.
    pub fn recompute_routes(&mut self) {
        if self.protocol != RoutingProtocol::ShortestPath {
            debug!(protocol = %self.protocol, "routing tables left unchanged");
            return;
        }

        let tables: Vec<(NodeId, RoutingTable)> = self
            .nodes
            .keys()
            .map(|id| {
                let hops = routing::compute_next_hops(self, id);
                (id.clone(), RoutingTable::from(hops))
            })
            .collect();

        for (id, table) in tables {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.set_routing_table(table);
            }
        }
        debug!(nodes = self.nodes.len(), "routing tables recomputed");
    }

    /// Record that `packet` reached `node`. Returns `false` on repeat
    /// deliveries and for unknown nodes.
    pub(crate) fn mark_delivered(&mut self, node: &NodeId, packet: PacketId) -> bool {
        self.nodes
            .get_mut(node)
            .is_some_and(|n| n.mark_delivered(packet))
    }

    // ── Inspection ────────────────────────────────────────────────

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Latency of the direct link between `a` and `b`.
    pub fn latency(&self, a: &NodeId, b: &NodeId) -> Option<f64> {
        self.nodes.get(a)?.latency_to(b)
    }

    /// Number of undirected links.
    pub fn link_count(&self) -> usize {
        let endpoints: usize = self.nodes.values().map(|n| n.connections().len()).sum();
        let self_loops = self
            .nodes
            .values()
            .filter(|n| n.connections().contains_key(n.id()))
            .count();
        (endpoints + self_loops) / 2
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new(RoutingProtocol::default())
    }
}
