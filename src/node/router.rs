//! Per-node state held by the topology store.

use std::collections::{BTreeMap, BTreeSet};

use super::id::NodeId;
use crate::packet::PacketId;
use crate::routing::RoutingTable;

/// A simulated router: processing delay, links, routes and deliveries.
///
/// Nodes are created once by the topology store and never removed. All
/// mutation goes through crate-internal methods so the store can keep
/// connection tables symmetric across both endpoints of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    /// Delay applied to every packet forwarded out of this node.
    processing_delay: f64,
    /// Neighbor → link latency.
    connections: BTreeMap<NodeId, f64>,
    routing_table: RoutingTable,
    /// Packets whose destination is this node and which have arrived.
    delivered: BTreeSet<PacketId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, processing_delay: f64) -> Self {
        Node {
            id,
            processing_delay,
            connections: BTreeMap::new(),
            routing_table: RoutingTable::new(),
            delivered: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn processing_delay(&self) -> f64 {
        self.processing_delay
    }

    /// Neighbor → latency map for this node.
    pub fn connections(&self) -> &BTreeMap<NodeId, f64> {
        &self.connections
    }

    /// Latency of the direct link to `neighbor`, if one exists.
    pub fn latency_to(&self, neighbor: &NodeId) -> Option<f64> {
        self.connections.get(neighbor).copied()
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    /// Next hop toward `destination`, if a route is known.
    pub fn next_hop(&self, destination: &NodeId) -> Option<&NodeId> {
        self.routing_table.next_hop(destination)
    }

    pub fn delivered(&self) -> &BTreeSet<PacketId> {
        &self.delivered
    }

    pub fn has_delivered(&self, packet: PacketId) -> bool {
        self.delivered.contains(&packet)
    }

    /// Insert or overwrite one side of a link.
    pub(crate) fn connect(&mut self, neighbor: NodeId, latency: f64) {
        self.connections.insert(neighbor, latency);
    }

    pub(crate) fn set_routing_table(&mut self, table: RoutingTable) {
        self.routing_table = table;
    }

    /// Record a delivery. Returns `false` if the packet was already recorded.
    pub(crate) fn mark_delivered(&mut self, packet: PacketId) -> bool {
        self.delivered.insert(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_empty() {
        let node = Node::new(NodeId::from("a"), 0.1);
        assert_eq!(node.id().as_str(), "a");
        assert_eq!(node.processing_delay(), 0.1);
        assert!(node.connections().is_empty());
        assert!(node.routing_table().is_empty());
        assert!(node.delivered().is_empty());
    }

    #[test]
    fn test_connect_overwrites_latency() {
        let mut node = Node::new(NodeId::from("a"), 0.1);
        node.connect(NodeId::from("b"), 3.0);
        node.connect(NodeId::from("b"), 1.5);
        assert_eq!(node.latency_to(&NodeId::from("b")), Some(1.5));
        assert_eq!(node.connections().len(), 1);
        assert_eq!(node.latency_to(&NodeId::from("c")), None);
    }

    #[test]
    fn test_mark_delivered_is_idempotent() {
        let mut node = Node::new(NodeId::from("a"), 0.1);
        assert!(node.mark_delivered(PacketId::new(7)));
        assert!(!node.mark_delivered(PacketId::new(7)));
        assert_eq!(node.delivered().len(), 1);
        assert!(node.has_delivered(PacketId::new(7)));
    }
}
