//! Simulation execution loop.
//!
//! `Simulator` owns the topology, the scheduler and the clock. A run
//! pops every event due within the time bound, logs the arrival, asks
//! the forwarding layer what happens next and schedules the follow-up
//! arrival. The loop is synchronous and single-threaded; state persists
//! between runs, so a simulation can be advanced in slices.

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::config::SimulatorConfig;
use crate::error::{NetSimError, NetSimResult};
use crate::event::{Event, EventKind};
use crate::eventlog::{LogEntry, SimulationLog};
use crate::forwarding::{self, ForwardDecision};
use crate::node::{Node, NodeId};
use crate::packet::{Packet, PacketId, PacketIdGen};
use crate::routing::{self, Route, RoutingTable};
use crate::scheduler::Scheduler;
use crate::time::SimTime;
use crate::topology::Topology;

// ── Packet spec ───────────────────────────────────────────────────────

/// A packet to inject at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PacketSpec {
    pub source: NodeId,
    pub destination: NodeId,
    #[cfg_attr(feature = "serialize", serde(default))]
    pub payload: String,
}

impl PacketSpec {
    pub fn new(
        source: impl Into<NodeId>,
        destination: impl Into<NodeId>,
        payload: impl Into<String>,
    ) -> Self {
        PacketSpec {
            source: source.into(),
            destination: destination.into(),
            payload: payload.into(),
        }
    }
}

// ── Simulator ─────────────────────────────────────────────────────────

/// Top-level packet-forwarding simulator.
///
/// One instance is one independent network. Calls must be serialized by
/// the caller; nothing here is shared between instances.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    topology: Topology,
    scheduler: Scheduler,
    current_time: SimTime,
    packet_ids: PacketIdGen,
    events_processed: u64,
}

impl Simulator {
    /// Create a simulator with the default configuration, at time zero.
    pub fn new() -> Self {
        let config = SimulatorConfig::default();
        Simulator {
            topology: Topology::new(config.protocol),
            config,
            scheduler: Scheduler::new(),
            current_time: SimTime::ZERO,
            packet_ids: PacketIdGen::new(),
            events_processed: 0,
        }
    }

    pub fn with_config(config: SimulatorConfig) -> NetSimResult<Self> {
        config.validate()?;
        Ok(Simulator {
            topology: Topology::new(config.protocol),
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    // ── Topology ──────────────────────────────────────────────────

    /// Add a node with the configured default processing delay.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> NetSimResult<()> {
        let delay = self.config.default_processing_delay;
        self.topology.add_node(id.into(), delay)
    }

    pub fn add_node_with_delay(
        &mut self,
        id: impl Into<NodeId>,
        processing_delay: f64,
    ) -> NetSimResult<()> {
        self.topology.add_node(id.into(), processing_delay)
    }

    /// Link two registered nodes and recompute all routing tables.
    pub fn add_connection(
        &mut self,
        a: impl Into<NodeId>,
        b: impl Into<NodeId>,
        latency: f64,
    ) -> NetSimResult<()> {
        self.topology.add_connection(&a.into(), &b.into(), latency)
    }

    // ── Packets ───────────────────────────────────────────────────

    /// Inject a packet at `source`, arriving there at the current time.
    ///
    /// Returns `None` without consuming a packet id if either endpoint
    /// is unknown.
    pub fn create_packet(
        &mut self,
        source: impl Into<NodeId>,
        destination: impl Into<NodeId>,
        payload: impl Into<String>,
    ) -> Option<Packet> {
        let source = source.into();
        let destination = destination.into();
        for endpoint in [&source, &destination] {
            if !self.topology.contains(endpoint) {
                debug!(node = %endpoint, "packet refused, unknown endpoint");
                return None;
            }
        }

        let packet = Packet::new(
            self.packet_ids.next_id(),
            source.clone(),
            destination,
            payload,
            self.current_time,
        );
        self.scheduler.schedule(
            self.current_time,
            EventKind::PacketArrival,
            source,
            packet.clone(),
        );
        Some(packet)
    }

    // ── Execution ─────────────────────────────────────────────────

    /// Inject `packets`, then run for `duration`.
    ///
    /// Packets naming unknown nodes are skipped. The duration is checked
    /// before anything is injected.
    pub fn run_simulation<I>(&mut self, duration: f64, packets: I) -> NetSimResult<SimulationLog>
    where
        I: IntoIterator<Item = PacketSpec>,
    {
        self.end_time(duration)?;
        for spec in packets {
            self.create_packet(spec.source, spec.destination, spec.payload);
        }
        self.run(duration)
    }

    /// Process every event due at or before `now + duration`.
    ///
    /// Afterwards the clock stands at the end of the window, so
    /// back-to-back runs cover consecutive windows. Later events stay
    /// queued for the next run.
    pub fn run(&mut self, duration: f64) -> NetSimResult<SimulationLog> {
        let end = self.end_time(duration)?;
        let mut log = SimulationLog::new();

        while let Some(event) = self.scheduler.pop_due(end) {
            log.record(self.dispatch(event));
        }
        self.current_time = self.current_time.max(end);

        debug!(
            entries = log.len(),
            pending = self.scheduler.len(),
            clock = self.current_time.as_secs(),
            "run complete"
        );
        Ok(log)
    }

    /// Process exactly one event, ignoring any time bound.
    ///
    /// Returns `None` when no events are pending.
    pub fn step(&mut self) -> Option<LogEntry> {
        let event = self.scheduler.pop_next()?;
        Some(self.dispatch(event))
    }

    fn end_time(&self, duration: f64) -> NetSimResult<SimTime> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(NetSimError::InvalidDuration(duration));
        }
        self.current_time
            .plus(duration)
            .ok_or(NetSimError::InvalidDuration(duration))
    }

    fn dispatch(&mut self, event: Event) -> LogEntry {
        debug_assert!(
            event.scheduled_at >= self.current_time,
            "time went backward: current={}, event={}",
            self.current_time,
            event.scheduled_at
        );
        self.current_time = event.scheduled_at;
        self.events_processed += 1;
        trace!(%event, "dispatch");

        // Arrivals are the only event kind.
        let Event { node, mut packet, .. } = event;
        let entry = LogEntry::arrived(
            self.current_time,
            packet.id,
            node.clone(),
            packet.hop_count,
        );

        match forwarding::decide(&mut self.topology, &node, &mut packet) {
            ForwardDecision::Delivered { first_delivery } => {
                trace!(packet = %packet.id, %node, first_delivery, "delivered");
            }
            ForwardDecision::Forwarded { next_hop, delay } => match self.current_time.plus(delay) {
                Some(at) => {
                    self.scheduler
                        .schedule(at, EventKind::PacketArrival, next_hop, packet);
                }
                None => {
                    warn!(packet = %packet.id, delay, "arrival time overflows clock, dropping");
                }
            },
            ForwardDecision::Dropped(reason) => {
                trace!(packet = %packet.id, %node, ?reason, "dropped");
            }
        }

        entry
    }

    // ── Inspection ────────────────────────────────────────────────

    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Events dispatched over the simulator's lifetime.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    /// Returns `true` if no events are pending.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_empty()
    }

    /// The id the next injected packet will receive.
    pub fn next_packet_id(&self) -> PacketId {
        self.packet_ids.peek()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.topology.node(id)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.topology.node_ids()
    }

    pub fn routing_table(&self, id: &NodeId) -> Option<&RoutingTable> {
        self.topology.node(id).map(Node::routing_table)
    }

    /// Packets delivered at `id` so far.
    pub fn delivered_at(&self, id: &NodeId) -> Option<&BTreeSet<PacketId>> {
        self.topology.node(id).map(Node::delivered)
    }

    /// Every packet delivered anywhere so far, ascending.
    pub fn delivered_packets(&self) -> BTreeSet<PacketId> {
        self.topology
            .nodes()
            .flat_map(|node| node.delivered().iter().copied())
            .collect()
    }

    /// The shortest path a packet from `from` to `to` would follow.
    pub fn shortest_path(&self, from: &NodeId, to: &NodeId) -> Option<Route> {
        routing::shortest_path(&self.topology, from, to)
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn t(secs: f64) -> SimTime {
        SimTime::new(secs).unwrap()
    }

    /// a --1-- b --1-- c, all processing delays 0.5.
    fn line() -> Simulator {
        let config = SimulatorConfig::default().with_default_processing_delay(0.5);
        let mut sim = Simulator::with_config(config).unwrap();
        for n in ["a", "b", "c"] {
            sim.add_node(n).unwrap();
        }
        sim.add_connection("a", "b", 1.0).unwrap();
        sim.add_connection("b", "c", 1.0).unwrap();
        sim
    }

    #[test]
    fn test_create_packet_schedules_source_arrival() {
        let mut sim = line();
        let p = sim.create_packet("a", "c", "hi").unwrap();
        assert_eq!(p.id, PacketId::new(0));
        assert_eq!(p.hop_count, 0);
        assert_eq!(p.created_at, SimTime::ZERO);
        assert_eq!(sim.pending_events(), 1);
        assert_eq!(sim.next_packet_id(), PacketId::new(1));
    }

    #[test]
    fn test_create_packet_unknown_endpoint() {
        let mut sim = line();
        assert!(sim.create_packet("a", "ghost", "").is_none());
        assert!(sim.create_packet("ghost", "a", "").is_none());
        assert!(sim.is_idle());
        assert_eq!(sim.next_packet_id(), PacketId::new(0));
    }

    #[test]
    fn test_full_delivery_timeline() {
        let mut sim = line();
        sim.create_packet("a", "c", "hi");
        let log = sim.run(10.0).unwrap();

        let rows: Vec<(f64, &str, u32)> = log
            .iter()
            .map(|e| (e.time.as_secs(), e.node.as_str(), e.hops))
            .collect();
        assert_eq!(rows, vec![(0.0, "a", 0), (1.5, "b", 1), (3.0, "c", 2)]);
        assert!(sim.delivered_at(&id("c")).unwrap().contains(&PacketId::new(0)));
        assert!(sim.is_idle());
        assert_eq!(sim.delivered_packets().len(), 1);
        assert_eq!(sim.current_time(), t(10.0));
        assert_eq!(sim.events_processed(), 3);
    }

    #[test]
    fn test_run_bound_is_inclusive() {
        let mut sim = line();
        sim.create_packet("a", "c", "");
        let log = sim.run(1.5).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(sim.pending_events(), 1);
    }

    #[test]
    fn test_step_ignores_bound() {
        let mut sim = line();
        sim.create_packet("a", "c", "");
        assert_eq!(sim.step().unwrap().node, id("a"));
        let second = sim.step().unwrap();
        assert_eq!(second.node, id("b"));
        assert_eq!(sim.current_time(), t(1.5));
        assert!(sim.step().is_some());
        assert!(sim.step().is_none());
    }

    #[test]
    fn test_invalid_duration_injects_nothing() {
        let mut sim = line();
        let err = sim
            .run_simulation(-1.0, vec![PacketSpec::new("a", "c", "")])
            .unwrap_err();
        assert_eq!(err, NetSimError::InvalidDuration(-1.0));
        assert!(sim.is_idle());
        assert!(sim.run(f64::NAN).is_err());
    }

    #[test]
    fn test_packets_created_later_stamped_with_clock() {
        let mut sim = line();
        sim.run(2.0).unwrap();
        let p = sim.create_packet("b", "a", "").unwrap();
        assert_eq!(p.created_at, t(2.0));
        let log = sim.run(5.0).unwrap();
        assert_eq!(log.entries()[0].time, t(2.0));
        assert_eq!(log.entries()[1].time, t(3.5));
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = SimulatorConfig::default().with_default_processing_delay(f64::NAN);
        assert!(Simulator::with_config(config).is_err());
    }

    #[test]
    fn test_inspection_helpers() {
        let sim = line();
        let ids: Vec<&str> = sim.node_ids().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(
            sim.routing_table(&id("a")).unwrap().next_hop(&id("c")),
            Some(&id("b"))
        );
        let route = sim.shortest_path(&id("a"), &id("c")).unwrap();
        assert_eq!(route.cost, 2.0);
        assert!(sim.routing_table(&id("ghost")).is_none());
    }
}
