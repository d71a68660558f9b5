//! Events driving the forwarding engine.
//!
//! Every packet movement is an `Event`: an immutable record placed on
//! the scheduler's priority queue and dispatched exactly once. An event
//! owns the packet it carries, so scheduling the next hop moves the
//! packet into a fresh event instead of sharing it.

use std::cmp::Ordering;

use crate::node::NodeId;
use crate::packet::Packet;
use crate::time::SimTime;

// ── Event ID ──────────────────────────────────────────────────────────

/// A strictly increasing event identifier.
///
/// Breaks ties in the scheduler: two events at the same `SimTime` are
/// dispatched in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EventId(u64);

impl EventId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        EventId(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E#{}", self.0)
    }
}

// ── Event ID Generator ───────────────────────────────────────────────

/// Deterministic, strictly increasing event-ID generator.
///
/// Each `Scheduler` owns exactly one of these.
#[derive(Debug, Clone, Default)]
pub struct EventIdGen {
    next: u64,
}

impl EventIdGen {
    pub fn new() -> Self {
        EventIdGen { next: 0 }
    }

    /// Mint the next event ID.
    pub fn next_id(&mut self) -> EventId {
        let id = EventId(self.next);
        self.next += 1;
        id
    }

    /// Peek at the next ID without consuming it.
    pub fn peek(&self) -> EventId {
        EventId(self.next)
    }
}

// ── Event Kind ────────────────────────────────────────────────────────

/// What happens when an event is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// A packet arrives at the event's target node and is processed there.
    PacketArrival,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::PacketArrival => write!(f, "Arrival"),
        }
    }
}

// ── Event ─────────────────────────────────────────────────────────────

/// A single scheduled event.
///
/// The scheduler orders events by `(scheduled_at, id)`. Kind, node and
/// packet carry no ordering weight.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub id: EventId,
    pub scheduled_at: SimTime,
    pub kind: EventKind,
    /// Node at which the event fires.
    pub node: NodeId,
    pub packet: Packet,
}

impl Event {
    pub fn new(
        id: EventId,
        scheduled_at: SimTime,
        kind: EventKind,
        node: NodeId,
        packet: Packet,
    ) -> Self {
        Event {
            id,
            scheduled_at,
            kind,
            node,
            packet,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}({} @ {})",
            self.id, self.scheduled_at, self.kind, self.packet.id, self.node
        )
    }
}

impl Eq for Event {}

/// Ordering: smallest `(scheduled_at, id)` first.
///
/// `BinaryHeap` is a max-heap, so the natural ordering is reversed here.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .scheduled_at
            .cmp(&self.scheduled_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
