//! Per-arrival forwarding decision.
//!
//! Given a packet that has just arrived at a node, decide whether it is
//! delivered, forwarded (and with what delay), or dropped. The decision
//! mutates the packet's hop count and the node's delivered set. The
//! simulator turns the outcome into the next scheduled event.

use tracing::debug;

use crate::node::NodeId;
use crate::packet::Packet;
use crate::topology::Topology;

/// Why a packet stopped short of its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The node has no routing-table entry for the destination.
    NoRoute,
    /// The routing table names a neighbor the node has no link to.
    StaleRoute,
    /// The arrival targeted a node that is not registered.
    UnknownNode,
}

/// The outcome of processing one arrival.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardDecision {
    /// The node is the packet's destination.
    Delivered {
        /// `false` if this packet had already been recorded here.
        first_delivery: bool,
    },
    /// The packet leaves for `next_hop`, arriving `delay` later.
    Forwarded { next_hop: NodeId, delay: f64 },
    /// The packet goes no further.
    Dropped(DropReason),
}

/// Process `packet` arriving at `node`.
///
/// On any non-destination node the hop count is incremented before the
/// route lookup, so a dropped packet still carries the hop it would
/// have taken. The forwarding delay is the node's processing delay plus
/// the latency of the link to the next hop.
pub fn decide(topology: &mut Topology, node: &NodeId, packet: &mut Packet) -> ForwardDecision {
    if packet.is_destined_for(node) {
        let first_delivery = topology.mark_delivered(node, packet.id);
        return ForwardDecision::Delivered { first_delivery };
    }

    let Some(current) = topology.node(node) else {
        debug!(packet = %packet.id, %node, "arrival at unknown node");
        return ForwardDecision::Dropped(DropReason::UnknownNode);
    };

    packet.hop_count += 1;

    let Some(next_hop) = current.next_hop(&packet.destination) else {
        debug!(
            packet = %packet.id,
            %node,
            destination = %packet.destination,
            "no route, dropping packet"
        );
        return ForwardDecision::Dropped(DropReason::NoRoute);
    };

    let Some(latency) = current.latency_to(next_hop) else {
        debug!(packet = %packet.id, %node, %next_hop, "route names a missing link");
        return ForwardDecision::Dropped(DropReason::StaleRoute);
    };

    ForwardDecision::Forwarded {
        next_hop: next_hop.clone(),
        delay: current.processing_delay() + latency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PacketId;
    use crate::routing::RoutingProtocol;
    use crate::time::SimTime;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn packet(src: &str, dst: &str) -> Packet {
        Packet::new(PacketId::new(0), id(src), id(dst), "x", SimTime::ZERO)
    }

    fn line() -> Topology {
        let mut topo = Topology::default();
        topo.add_node(id("a"), 0.25).unwrap();
        topo.add_node(id("b"), 0.5).unwrap();
        topo.add_node(id("c"), 0.75).unwrap();
        topo.add_connection(&id("a"), &id("b"), 1.0).unwrap();
        topo.add_connection(&id("b"), &id("c"), 2.0).unwrap();
        topo
    }

    #[test]
    fn test_forward_uses_processing_plus_latency() {
        let mut topo = line();
        let mut p = packet("a", "c");
        let decision = decide(&mut topo, &id("a"), &mut p);
        assert_eq!(
            decision,
            ForwardDecision::Forwarded {
                next_hop: id("b"),
                delay: 1.25,
            }
        );
        assert_eq!(p.hop_count, 1);

        let decision = decide(&mut topo, &id("b"), &mut p);
        assert_eq!(
            decision,
            ForwardDecision::Forwarded {
                next_hop: id("c"),
                delay: 2.5,
            }
        );
        assert_eq!(p.hop_count, 2);
    }

    #[test]
    fn test_delivery_marks_node_without_hop() {
        let mut topo = line();
        let mut p = packet("a", "c");
        p.hop_count = 2;

        let decision = decide(&mut topo, &id("c"), &mut p);
        assert_eq!(decision, ForwardDecision::Delivered { first_delivery: true });
        assert_eq!(p.hop_count, 2);
        assert!(topo.node(&id("c")).unwrap().has_delivered(p.id));

        let again = decide(&mut topo, &id("c"), &mut p);
        assert_eq!(again, ForwardDecision::Delivered { first_delivery: false });
        assert_eq!(topo.node(&id("c")).unwrap().delivered().len(), 1);
    }

    #[test]
    fn test_source_equals_destination_delivers_immediately() {
        let mut topo = line();
        let mut p = packet("b", "b");
        let decision = decide(&mut topo, &id("b"), &mut p);
        assert!(matches!(decision, ForwardDecision::Delivered { .. }));
        assert_eq!(p.hop_count, 0);
    }

    #[test]
    fn test_no_route_drops_after_counting_hop() {
        let mut topo = line();
        topo.add_node(id("island"), 0.1).unwrap();
        let mut p = packet("a", "island");
        let decision = decide(&mut topo, &id("a"), &mut p);
        assert_eq!(decision, ForwardDecision::Dropped(DropReason::NoRoute));
        assert_eq!(p.hop_count, 1);
    }

    #[test]
    fn test_unknown_node_dropped() {
        let mut topo = line();
        let mut p = packet("a", "c");
        let decision = decide(&mut topo, &id("ghost"), &mut p);
        assert_eq!(decision, ForwardDecision::Dropped(DropReason::UnknownNode));
        assert_eq!(p.hop_count, 0);
    }

    #[test]
    fn test_protocol_without_tables_drops() {
        let mut topo = Topology::new(RoutingProtocol::LinkState);
        topo.add_node(id("a"), 0.1).unwrap();
        topo.add_node(id("b"), 0.1).unwrap();
        topo.add_connection(&id("a"), &id("b"), 1.0).unwrap();
        let mut p = packet("a", "b");
        let decision = decide(&mut topo, &id("a"), &mut p);
        assert_eq!(decision, ForwardDecision::Dropped(DropReason::NoRoute));
    }
}
