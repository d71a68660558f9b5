//! Packets injected into the simulated network.
//!
//! A `Packet` is a plain value. Each scheduled arrival event owns its
//! packet, and forwarding moves the (updated) packet into the next
//! event, so no two events ever alias the same packet state.

use crate::node::NodeId;
use crate::time::SimTime;

// ── Packet ID ─────────────────────────────────────────────────────────

/// A simulator-wide unique, strictly increasing packet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PacketId(u64);

impl PacketId {
    #[inline]
    pub fn new(raw: u64) -> Self {
        PacketId(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P#{}", self.0)
    }
}

/// Monotonic packet-ID generator. Owned by exactly one `Simulator`.
#[derive(Debug, Clone, Default)]
pub struct PacketIdGen {
    next: u64,
}

impl PacketIdGen {
    pub fn new() -> Self {
        PacketIdGen { next: 0 }
    }

    /// Mint the next packet ID.
    pub fn next_id(&mut self) -> PacketId {
        let id = PacketId(self.next);
        self.next += 1;
        id
    }

    /// Peek at the next ID without consuming it.
    pub fn peek(&self) -> PacketId {
        PacketId(self.next)
    }
}

// ── Packet ────────────────────────────────────────────────────────────

/// A packet travelling hop by hop toward its destination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    pub id: PacketId,
    pub source: NodeId,
    pub destination: NodeId,
    /// Opaque application payload; never inspected by the engine.
    pub payload: String,
    /// Forwarding steps taken so far. Zero while still at the source.
    pub hop_count: u32,
    /// Clock value when the packet was injected.
    pub created_at: SimTime,
}

impl Packet {
    pub fn new(
        id: PacketId,
        source: NodeId,
        destination: NodeId,
        payload: impl Into<String>,
        created_at: SimTime,
    ) -> Self {
        Packet {
            id,
            source,
            destination,
            payload: payload.into(),
            hop_count: 0,
            created_at,
        }
    }

    /// Whether `node` is this packet's destination.
    #[inline]
    pub fn is_destined_for(&self, node: &NodeId) -> bool {
        &self.destination == node
    }
}
