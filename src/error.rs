//! Structured error types for the network simulator.
//!
//! Fallible public APIs return `Result<T, NetSimError>`. Topology and
//! parameter problems are reported to the caller; conditions that occur
//! while packets are in flight (no route, unknown endpoint on injection)
//! never surface as errors and only shorten that packet's log history.

use crate::node::NodeId;

/// The top-level error type for the simulator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetSimError {
    // ── Topology errors ───────────────────────────────────

    /// A node ID was referenced but is not registered.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// Attempted to register a node with an ID that is already in use.
    #[error("node {0} is already registered")]
    NodeAlreadyRegistered(NodeId),

    // ── Parameter errors ──────────────────────────────────

    /// A link latency was negative, NaN or infinite.
    #[error("invalid latency {latency} on link {a} <-> {b}")]
    InvalidLatency { a: NodeId, b: NodeId, latency: f64 },

    /// A processing delay was negative, NaN or infinite.
    #[error("invalid processing delay {delay} for node {node}")]
    InvalidDelay { node: NodeId, delay: f64 },

    /// A run duration was negative, NaN or infinite.
    #[error("invalid simulation duration {0}")]
    InvalidDuration(f64),

    /// A timestamp was negative, NaN or infinite.
    #[error("invalid simulation time {0}")]
    InvalidTime(f64),

    // ── Scenario / I/O errors ─────────────────────────────

    /// A scenario description could not be parsed or applied.
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    /// A request or response body could not be decoded or encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for NetSimError {
    fn from(e: std::io::Error) -> Self {
        NetSimError::Io(e.to_string())
    }
}

/// Convenience alias for `Result<T, NetSimError>`.
pub type NetSimResult<T> = Result<T, NetSimError>;
