//! Simulation log: the ordered record of packet arrivals.
//!
//! One `LogEntry` is appended per dispatched arrival, including the
//! arrival at the source and the final delivery. The log is the
//! simulator's observable output: a packet whose history stops short of
//! its destination was dropped.

use std::io::{self, Write};

use crate::node::NodeId;
use crate::packet::PacketId;
use crate::time::SimTime;

// ── Hash utility ──────────────────────────────────────────────────────

/// Combine two u64 hashes deterministically.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut h = a;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h = h.wrapping_add(b);
    h ^= h >> 32;
    h
}

/// Hash a byte slice deterministically (FNV-1a).
pub fn hash_bytes(data: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

// ── Log entry ─────────────────────────────────────────────────────────

/// What a log entry records. Arrivals are the only logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LogEvent {
    Arrived,
}

impl std::fmt::Display for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogEvent::Arrived => f.write_str("arrived"),
        }
    }
}

/// A packet arrived at `node` at `time` having taken `hops` hops.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub time: SimTime,
    pub packet_id: PacketId,
    pub event: LogEvent,
    pub node: NodeId,
    pub hops: u32,
}

impl LogEntry {
    pub fn arrived(time: SimTime, packet_id: PacketId, node: NodeId, hops: u32) -> Self {
        LogEntry {
            time,
            packet_id,
            event: LogEvent::Arrived,
            node,
            hops,
        }
    }

    fn hash(&self) -> u64 {
        let mut h = hash_combine(0, self.time.as_secs().to_bits());
        h = hash_combine(h, self.packet_id.raw());
        h = hash_combine(h, hash_bytes(self.node.as_str().as_bytes()));
        hash_combine(h, self.hops as u64)
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} at {} (hops={})",
            self.time, self.packet_id, self.event, self.node, self.hops
        )
    }
}

// ── Simulation log ────────────────────────────────────────────────────

/// Append-only sequence of log entries in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct SimulationLog {
    entries: Vec<LogEntry>,
}

impl SimulationLog {
    pub fn new() -> Self {
        SimulationLog {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Append every entry of `other`, keeping order.
    pub fn extend(&mut self, other: SimulationLog) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// History of one packet, in arrival order.
    pub fn for_packet(&self, packet: PacketId) -> Vec<&LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.packet_id == packet)
            .collect()
    }

    /// Nodes visited by `packet`, in order.
    pub fn path_of(&self, packet: PacketId) -> Vec<&NodeId> {
        self.for_packet(packet).into_iter().map(|e| &e.node).collect()
    }

    /// Distinct packet ids appearing in the log, ascending.
    pub fn packet_ids(&self) -> Vec<PacketId> {
        let mut ids: Vec<PacketId> = self.entries.iter().map(|e| e.packet_id).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Deterministic hash of the whole log, for replay verification.
    pub fn log_hash(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |h, entry| hash_combine(h, entry.hash()))
    }

    // ── Export ────────────────────────────────────────────────────

    /// Write one line per entry in a stable text format.
    pub fn export<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "# NETSIM LOG v1")?;
        writeln!(w, "# entries: {}", self.entries.len())?;
        for e in &self.entries {
            writeln!(
                w,
                "{} {} {} {} {}",
                e.time.as_secs(),
                e.packet_id.raw(),
                e.event,
                e.node,
                e.hops
            )?;
        }
        Ok(())
    }

    /// Render the log as a pretty-printed JSON array.
    #[cfg(feature = "serialize")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a SimulationLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for SimulationLog {
    type Item = LogEntry;
    type IntoIter = std::vec::IntoIter<LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<LogEntry> for SimulationLog {
    fn from_iter<I: IntoIterator<Item = LogEntry>>(iter: I) -> Self {
        SimulationLog {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Whether two logs record identical arrivals in identical order.
pub fn logs_match(a: &SimulationLog, b: &SimulationLog) -> bool {
    a.entries == b.entries
}
