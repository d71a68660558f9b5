//! Deterministic event scheduler.
//!
//! Uses a `BinaryHeap` with reversed `Ord` on `Event` to act as a
//! min-heap keyed by `(scheduled_at, event_id)`. Event ids are strictly
//! increasing, so events at the same time pop in the order they were
//! scheduled and two identical runs dispatch identically.

use std::collections::BinaryHeap;

use crate::event::{Event, EventId, EventIdGen, EventKind};
use crate::node::NodeId;
use crate::packet::Packet;
use crate::time::SimTime;

/// Time-ordered queue of pending events.
///
/// Knows nothing about forwarding: it orders events and hands them out.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    /// Min-heap (via reversed Ord on Event).
    queue: BinaryHeap<Event>,

    id_gen: EventIdGen,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            queue: BinaryHeap::new(),
            id_gen: EventIdGen::new(),
        }
    }

    /// Schedule an event for `node` at time `at`.
    ///
    /// Returns the `EventId` assigned to this event.
    pub fn schedule(
        &mut self,
        at: SimTime,
        kind: EventKind,
        node: NodeId,
        packet: Packet,
    ) -> EventId {
        let id = self.id_gen.next_id();
        self.queue.push(Event::new(id, at, kind, node, packet));
        id
    }

    /// Pop the next event (earliest time, lowest ID).
    ///
    /// Returns `None` when the queue is empty.
    pub fn pop_next(&mut self) -> Option<Event> {
        self.queue.pop()
    }

    /// Pop the next event only if it is due at or before `end`.
    ///
    /// Later events stay queued.
    pub fn pop_due(&mut self, end: SimTime) -> Option<Event> {
        if self.queue.peek()?.scheduled_at > end {
            return None;
        }
        self.queue.pop()
    }

    /// Peek at the next event without removing it.
    pub fn peek_next(&self) -> Option<&Event> {
        self.queue.peek()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// The ID the next scheduled event will receive.
    pub fn next_event_id(&self) -> EventId {
        self.id_gen.peek()
    }

    /// Drain all events in dispatch order into a `Vec`.
    pub fn drain_ordered(&mut self) -> Vec<Event> {
        let mut events = Vec::with_capacity(self.queue.len());
        while let Some(e) = self.queue.pop() {
            events.push(e);
        }
        events
    }
}
