//! Simulator configuration.

use crate::error::{NetSimError, NetSimResult};
use crate::node::NodeId;
use crate::routing::RoutingProtocol;

/// Processing delay given to nodes added without an explicit one.
pub const DEFAULT_PROCESSING_DELAY: f64 = 0.1;

/// Tunables fixed for the lifetime of a `Simulator`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialize",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SimulatorConfig {
    /// Delay applied per hop by nodes added without an explicit delay.
    pub default_processing_delay: f64,
    /// Routing protocol run on every link change.
    pub protocol: RoutingProtocol,
}

impl SimulatorConfig {
    /// Reject a default delay that could never be given to a node.
    pub fn validate(&self) -> NetSimResult<()> {
        let delay = self.default_processing_delay;
        if !delay.is_finite() || delay < 0.0 {
            return Err(NetSimError::InvalidDelay {
                node: NodeId::from("<default>"),
                delay,
            });
        }
        Ok(())
    }

    pub fn with_protocol(mut self, protocol: RoutingProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_default_processing_delay(mut self, delay: f64) -> Self {
        self.default_processing_delay = delay;
        self
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            default_processing_delay: DEFAULT_PROCESSING_DELAY,
            protocol: RoutingProtocol::ShortestPath,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SimulatorConfig::default();
        assert_eq!(cfg.default_processing_delay, 0.1);
        assert_eq!(cfg.protocol, RoutingProtocol::ShortestPath);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_delay() {
        let cfg = SimulatorConfig::default().with_default_processing_delay(-1.0);
        assert!(matches!(cfg.validate(), Err(NetSimError::InvalidDelay { .. })));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_partial_yaml_uses_defaults() {
        let cfg: SimulatorConfig = serde_yaml::from_str("protocol: link_state\n").unwrap();
        assert_eq!(cfg.protocol, RoutingProtocol::LinkState);
        assert_eq!(cfg.default_processing_delay, DEFAULT_PROCESSING_DELAY);
    }
}
