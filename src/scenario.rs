//! Scenario descriptions and a fluent builder for them.
//!
//! A `Scenario` is plain data: configuration, nodes, links, the packets
//! to inject and how long to run. It can be written by hand in YAML or
//! JSON, or assembled in code with [`ScenarioBuilder`]:
//!
//! ```rust
//! use netsim::scenario::ScenarioBuilder;
//!
//! let scenario = ScenarioBuilder::new()
//!     .node("a")
//!     .node_with_delay("b", 0.2)
//!     .node("c")
//!     .link("a", "b", 1.0)
//!     .link("b", "c", 1.0)
//!     .packet("a", "c", "hello")
//!     .duration(5.0)
//!     .build();
//!
//! let (_sim, log) = scenario.run().unwrap();
//! assert_eq!(log.len(), 3);
//! ```

#[cfg(feature = "serialize")]
use std::path::Path;

use tracing::info;

use crate::config::SimulatorConfig;
use crate::error::NetSimResult;
#[cfg(feature = "serialize")]
use crate::error::NetSimError;
use crate::eventlog::SimulationLog;
use crate::node::NodeId;
use crate::routing::RoutingProtocol;
use crate::simulation::{PacketSpec, Simulator};

/// Run length used when a scenario does not name one.
pub const DEFAULT_DURATION: f64 = 1.0;

/// A node to register. `None` delay means the configured default.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSpec {
    pub id: NodeId,
    #[cfg_attr(feature = "serialize", serde(default))]
    pub processing_delay: Option<f64>,
}

/// An undirected link.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkSpec {
    pub a: NodeId,
    pub b: NodeId,
    pub latency: f64,
}

/// Everything needed to build a simulator and run it once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Scenario {
    pub config: SimulatorConfig,
    pub nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
    pub packets: Vec<PacketSpec>,
    pub duration: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            config: SimulatorConfig::default(),
            nodes: Vec::new(),
            links: Vec::new(),
            packets: Vec::new(),
            duration: DEFAULT_DURATION,
        }
    }
}

impl Scenario {
    /// Build a simulator with this scenario's nodes and links.
    ///
    /// Nodes are added before links, in file order. Packets are not
    /// injected.
    pub fn build(&self) -> NetSimResult<Simulator> {
        let mut sim = Simulator::with_config(self.config.clone())?;
        for node in &self.nodes {
            match node.processing_delay {
                Some(delay) => sim.add_node_with_delay(node.id.clone(), delay)?,
                None => sim.add_node(node.id.clone())?,
            }
        }
        for link in &self.links {
            sim.add_connection(link.a.clone(), link.b.clone(), link.latency)?;
        }
        Ok(sim)
    }

    /// Build the simulator, inject the packets and run for `duration`.
    pub fn run(&self) -> NetSimResult<(Simulator, SimulationLog)> {
        let mut sim = self.build()?;
        let log = sim.run_simulation(self.duration, self.packets.iter().cloned())?;
        info!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            packets = self.packets.len(),
            entries = log.len(),
            "scenario complete"
        );
        Ok((sim, log))
    }

    #[cfg(feature = "serialize")]
    pub fn from_yaml_str(s: &str) -> NetSimResult<Self> {
        serde_yaml::from_str(s).map_err(|e| NetSimError::InvalidScenario(e.to_string()))
    }

    #[cfg(feature = "serialize")]
    pub fn from_json_str(s: &str) -> NetSimResult<Self> {
        serde_json::from_str(s).map_err(|e| NetSimError::InvalidScenario(e.to_string()))
    }

    /// Load a scenario file. `.json` files are parsed as JSON, anything
    /// else as YAML.
    #[cfg(feature = "serialize")]
    pub fn from_path(path: impl AsRef<Path>) -> NetSimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    #[cfg(feature = "serialize")]
    pub fn to_yaml_string(&self) -> NetSimResult<String> {
        serde_yaml::to_string(self).map_err(|e| NetSimError::InvalidScenario(e.to_string()))
    }
}

// ── ScenarioBuilder ───────────────────────────────────────────────────

/// Fluent builder for a [`Scenario`].
#[derive(Debug, Clone, Default)]
pub struct ScenarioBuilder {
    scenario: Scenario,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Config ────────────────────────────────────────────────

    pub fn config(mut self, config: SimulatorConfig) -> Self {
        self.scenario.config = config;
        self
    }

    pub fn protocol(mut self, protocol: RoutingProtocol) -> Self {
        self.scenario.config.protocol = protocol;
        self
    }

    pub fn default_processing_delay(mut self, delay: f64) -> Self {
        self.scenario.config.default_processing_delay = delay;
        self
    }

    // ── Topology ──────────────────────────────────────────────

    /// Add a node with the default processing delay.
    pub fn node(mut self, id: impl Into<NodeId>) -> Self {
        self.scenario.nodes.push(NodeSpec {
            id: id.into(),
            processing_delay: None,
        });
        self
    }

    pub fn node_with_delay(mut self, id: impl Into<NodeId>, delay: f64) -> Self {
        self.scenario.nodes.push(NodeSpec {
            id: id.into(),
            processing_delay: Some(delay),
        });
        self
    }

    pub fn link(mut self, a: impl Into<NodeId>, b: impl Into<NodeId>, latency: f64) -> Self {
        self.scenario.links.push(LinkSpec {
            a: a.into(),
            b: b.into(),
            latency,
        });
        self
    }

    // ── Traffic ───────────────────────────────────────────────

    pub fn packet(
        mut self,
        source: impl Into<NodeId>,
        destination: impl Into<NodeId>,
        payload: impl Into<String>,
    ) -> Self {
        self.scenario
            .packets
            .push(PacketSpec::new(source, destination, payload));
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.scenario.duration = duration;
        self
    }

    // ── Build ─────────────────────────────────────────────────

    pub fn build(self) -> Scenario {
        self.scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetSimError;

    #[test]
    fn test_builder_defaults() {
        let scenario = ScenarioBuilder::new().build();
        assert_eq!(scenario.duration, DEFAULT_DURATION);
        assert_eq!(scenario.config, SimulatorConfig::default());
        assert!(scenario.nodes.is_empty());
    }

    #[test]
    fn test_builder_run() {
        let (sim, log) = ScenarioBuilder::new()
            .default_processing_delay(0.25)
            .node("a")
            .node_with_delay("b", 0.0)
            .link("a", "b", 0.5)
            .packet("a", "b", "x")
            .duration(2.0)
            .build()
            .run()
            .unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].time.as_secs(), 0.75);
        assert_eq!(sim.node(&NodeId::from("b")).unwrap().processing_delay(), 0.0);
    }

    #[test]
    fn test_build_reports_bad_link() {
        let err = ScenarioBuilder::new()
            .node("a")
            .link("a", "ghost", 1.0)
            .build()
            .build()
            .unwrap_err();
        assert_eq!(err, NetSimError::NodeNotFound(NodeId::from("ghost")));
    }

    #[test]
    fn test_build_reports_duplicate_node() {
        let err = ScenarioBuilder::new()
            .node("a")
            .node("a")
            .build()
            .build()
            .unwrap_err();
        assert_eq!(err, NetSimError::NodeAlreadyRegistered(NodeId::from("a")));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_from_yaml() {
        let yaml = r#"
config:
  default_processing_delay: 0.25
nodes:
  - id: a
  - id: b
    processing_delay: 0.5
links:
  - { a: a, b: b, latency: 1.0 }
packets:
  - { source: a, destination: b, payload: ping }
  - { source: b, destination: a }
duration: 3.0
"#;
        let scenario = Scenario::from_yaml_str(yaml).unwrap();
        assert_eq!(scenario.config.default_processing_delay, 0.25);
        assert_eq!(scenario.nodes[1].processing_delay, Some(0.5));
        assert_eq!(scenario.packets[1].payload, "");
        assert_eq!(scenario.duration, 3.0);

        let (_, log) = scenario.run().unwrap();
        assert_eq!(log.len(), 4);
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_from_json_defaults_duration() {
        let json = r#"{"nodes": [{"id": "x"}]}"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert_eq!(scenario.duration, DEFAULT_DURATION);
        assert_eq!(scenario.nodes.len(), 1);
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_malformed_yaml() {
        let err = Scenario::from_yaml_str("nodes: [[[").unwrap_err();
        assert!(matches!(err, NetSimError::InvalidScenario(_)));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_yaml_round_trip_preserves_scenario() {
        let scenario = ScenarioBuilder::new()
            .node("a")
            .node("b")
            .link("a", "b", 2.0)
            .packet("a", "b", "p")
            .build();
        let yaml = scenario.to_yaml_string().unwrap();
        assert_eq!(Scenario::from_yaml_str(&yaml).unwrap(), scenario);
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_from_path_missing_file() {
        let err = Scenario::from_path("/nonexistent/netsim/scenario.yaml").unwrap_err();
        assert!(matches!(err, NetSimError::Io(_)));
    }
}
