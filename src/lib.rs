//! # netsim: deterministic packet-network simulator
//!
//! Models a packet-switched network as nodes joined by latency-weighted
//! links, keeps every node's routing table at the shortest-path next
//! hop, and forwards packets hop by hop on a virtual clock. A run's
//! only output is the ordered log of packet arrivals.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────┐
//! │          Simulator            │ ← clock, packet injection, run loop
//! │  ┌─────────────────────────┐  │
//! │  │       Topology          │  │ ← nodes, symmetric links
//! │  │  ┌───────────────────┐  │  │
//! │  │  │ Routing (Dijkstra)│  │  │ ← next-hop tables per node
//! │  │  └───────────────────┘  │  │
//! │  └─────────────────────────┘  │
//! │  ┌─────────────────────────┐  │
//! │  │       Scheduler         │  │ ← min-heap on (time, event id)
//! │  └─────────────────────────┘  │
//! │  ┌─────────────────────────┐  │
//! │  │      Forwarding         │  │ ← deliver / forward / drop
//! │  └─────────────────────────┘  │
//! │  ┌─────────────────────────┐  │
//! │  │    SimulationLog        │  │ ← one entry per arrival
//! │  └─────────────────────────┘  │
//! └───────────────────────────────┘
//! ```
//!
//! ```rust
//! use netsim::{PacketSpec, Simulator};
//!
//! let mut sim = Simulator::new();
//! sim.add_node("a").unwrap();
//! sim.add_node("b").unwrap();
//! sim.add_connection("a", "b", 1.0).unwrap();
//!
//! let log = sim
//!     .run_simulation(2.0, vec![PacketSpec::new("a", "b", "hello")])
//!     .unwrap();
//! let hops: Vec<u32> = log.iter().map(|e| e.hops).collect();
//! assert_eq!(hops, vec![0, 1]);
//! ```

#[cfg(feature = "serialize")]
pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod eventlog;
pub mod forwarding;
pub mod node;
pub mod packet;
pub mod routing;
pub mod scenario;
pub mod scheduler;
pub mod simulation;
pub mod time;
pub mod topology;

// Re-exports for convenience.
#[cfg(feature = "serialize")]
pub use api::SimulationApi;
pub use config::SimulatorConfig;
pub use error::{NetSimError, NetSimResult};
pub use event::{Event, EventId, EventKind};
pub use eventlog::{logs_match, LogEntry, LogEvent, SimulationLog};
pub use forwarding::{DropReason, ForwardDecision};
pub use node::{Node, NodeId};
pub use packet::{Packet, PacketId};
pub use routing::{Route, RoutingProtocol, RoutingTable};
pub use scenario::{Scenario, ScenarioBuilder};
pub use scheduler::Scheduler;
pub use simulation::{PacketSpec, Simulator};
pub use time::SimTime;
pub use topology::Topology;
