use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Knobs of the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Blocks the chain has to produce before a bootstrap is considered complete.
    pub bootstrap_blocks: u64,
    /// Interval between height queries while waiting for blocks.
    pub liveness_poll_interval_ms: u64,
    /// Budget for waiting for blocks.
    pub liveness_timeout_secs: u64,
    /// P2P port of the nodes, as used in peer addresses.
    pub p2p_port: u16,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bootstrap_blocks: 5,
            liveness_poll_interval_ms: 1000,
            liveness_timeout_secs: 300,
            p2p_port: crate::P2P_PORT,
        }
    }
}

impl OrchestratorConfig {
    /// Interval between height queries.
    pub fn liveness_poll_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_poll_interval_ms)
    }

    /// Budget for waiting for blocks.
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_secs(self.liveness_timeout_secs)
    }
}
