//! Request/response API for hosting layers.
//!
//! Wraps a `Simulator` behind the three calls a transport adapter
//! forwards: add a node, add a connection, run a simulation. Requests
//! and responses are plain serde values using camelCase field names, so
//! an adapter only has to decode, call, and encode.
//!
//! Unknown endpoints on `add_connection` are acknowledged and ignored,
//! keeping the simulator usable; invalid numbers are reported as errors.

use tracing::debug;

use crate::error::{NetSimError, NetSimResult};
use crate::eventlog::{LogEntry, LogEvent, SimulationLog};
use crate::node::NodeId;
use crate::scenario::DEFAULT_DURATION;
use crate::simulation::{PacketSpec, Simulator};

// ── Requests ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNodeRequest {
    pub node_id: NodeId,
    /// `None` means the simulator's default delay.
    #[serde(default)]
    pub processing_delay: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddConnectionRequest {
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub latency: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub packets: Vec<PacketSpec>,
}

fn default_duration() -> f64 {
    DEFAULT_DURATION
}

// ── Responses ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Success,
}

/// Acknowledgement for topology mutations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ack {
    pub status: AckStatus,
}

impl Ack {
    pub fn success() -> Self {
        Ack {
            status: AckStatus::Success,
        }
    }
}

/// One log line as seen by a hosting layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub time: f64,
    pub packet_id: u64,
    pub event: LogEvent,
    pub node: NodeId,
    pub hops: u32,
}

impl From<&LogEntry> for LogRecord {
    fn from(entry: &LogEntry) -> Self {
        LogRecord {
            time: entry.time.as_secs(),
            packet_id: entry.packet_id.raw(),
            event: entry.event,
            node: entry.node.clone(),
            hops: entry.hops,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulateResponse {
    pub logs: Vec<LogRecord>,
}

impl From<&SimulationLog> for SimulateResponse {
    fn from(log: &SimulationLog) -> Self {
        SimulateResponse {
            logs: log.iter().map(LogRecord::from).collect(),
        }
    }
}

// ── SimulationApi ─────────────────────────────────────────────────────

/// One simulator instance exposed through request/response calls.
///
/// Every run's log is also appended to a cumulative history, available
/// through [`SimulationApi::history`].
#[derive(Debug, Clone, Default)]
pub struct SimulationApi {
    sim: Simulator,
    history: SimulationLog,
}

impl SimulationApi {
    pub fn new(sim: Simulator) -> Self {
        SimulationApi {
            sim,
            history: SimulationLog::new(),
        }
    }

    pub fn add_node(&mut self, req: AddNodeRequest) -> NetSimResult<Ack> {
        match req.processing_delay {
            Some(delay) => self.sim.add_node_with_delay(req.node_id, delay)?,
            None => self.sim.add_node(req.node_id)?,
        }
        Ok(Ack::success())
    }

    pub fn add_connection(&mut self, req: AddConnectionRequest) -> NetSimResult<Ack> {
        match self
            .sim
            .add_connection(req.source_id, req.target_id, req.latency)
        {
            Ok(()) => {}
            Err(NetSimError::NodeNotFound(node)) => {
                debug!(%node, "connection to unknown node ignored");
            }
            Err(e) => return Err(e),
        }
        Ok(Ack::success())
    }

    pub fn simulate(&mut self, req: SimulateRequest) -> NetSimResult<SimulateResponse> {
        let log = self.sim.run_simulation(req.duration, req.packets)?;
        let response = SimulateResponse::from(&log);
        self.history.extend(log);
        Ok(response)
    }

    // ── Decoding entry points ─────────────────────────────────

    /// Decode a JSON request, apply it, and encode the reply.
    pub fn add_node_json(&mut self, body: &str) -> NetSimResult<String> {
        let req = decode(body)?;
        encode(&self.add_node(req)?)
    }

    pub fn add_connection_json(&mut self, body: &str) -> NetSimResult<String> {
        let req = decode(body)?;
        encode(&self.add_connection(req)?)
    }

    pub fn simulate_json(&mut self, body: &str) -> NetSimResult<String> {
        let req = decode(body)?;
        encode(&self.simulate(req)?)
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// Every entry logged by this instance, across all runs.
    pub fn history(&self) -> &SimulationLog {
        &self.history
    }

    /// Snapshot of the simulator as pretty JSON.
    pub fn state_json(&self) -> NetSimResult<String> {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct NodeState<'a> {
            id: &'a NodeId,
            processing_delay: f64,
            connections: &'a std::collections::BTreeMap<NodeId, f64>,
            routing_table: &'a crate::routing::RoutingTable,
            delivered: Vec<u64>,
        }

        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ApiState<'a> {
            current_time: f64,
            events_processed: u64,
            pending_events: usize,
            nodes: Vec<NodeState<'a>>,
        }

        let nodes = self
            .sim
            .topology()
            .nodes()
            .map(|node| NodeState {
                id: node.id(),
                processing_delay: node.processing_delay(),
                connections: node.connections(),
                routing_table: node.routing_table(),
                delivered: node.delivered().iter().map(|p| p.raw()).collect(),
            })
            .collect();

        let state = ApiState {
            current_time: self.sim.current_time().as_secs(),
            events_processed: self.sim.events_processed(),
            pending_events: self.sim.pending_events(),
            nodes,
        };
        serde_json::to_string_pretty(&state).map_err(|e| NetSimError::Serialization(e.to_string()))
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> NetSimResult<T> {
    serde_json::from_str(body).map_err(|e| NetSimError::Serialization(e.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> NetSimResult<String> {
    serde_json::to_string(value).map_err(|e| NetSimError::Serialization(e.to_string()))
}
