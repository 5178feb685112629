use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Amounts and waiting windows of the relay scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Native tokens given in genesis to the users and to the relayer wallets.
    pub user_funds: i64,
    /// Amount sent in transfer scenarios.
    pub transfer_amount: i64,
    /// Amount sent through the interchain account.
    pub ica_transfer_amount: i64,
    /// Blocks both chains produce after the relayer starts, before balances are checked.
    pub relay_wait_blocks: u64,
    /// Same as `relay_wait_blocks`, for timestamp timeouts.
    pub timestamp_relay_wait_blocks: u64,
    /// Same as `relay_wait_blocks`, for each direction of the bidirectional scenario.
    pub bidirectional_relay_wait_blocks: u64,
    /// Blocks to wait for the interchain account registration and for the transfer through it.
    pub ica_wait_blocks: u64,
    /// Relative height timeout of packets in the height timeout scenario.
    pub height_timeout_blocks: u64,
    /// Blocks the counterparty produces before the relayer starts in the height timeout scenario.
    pub height_timeout_wait_blocks: u64,
    /// Relative timestamp timeout of packets in the timestamp timeout scenario.
    pub timestamp_timeout_secs: u64,
    /// Time to let pass before the relayer starts in the timestamp timeout scenario.
    pub timestamp_timeout_sleep_secs: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            user_funds: 10_000_000_000,
            transfer_amount: 1_000_000,
            ica_transfer_amount: 1_000,
            relay_wait_blocks: 10,
            timestamp_relay_wait_blocks: 20,
            bidirectional_relay_wait_blocks: 30,
            ica_wait_blocks: 10,
            height_timeout_blocks: 10,
            height_timeout_wait_blocks: 11,
            timestamp_timeout_secs: 10,
            timestamp_timeout_sleep_secs: 15,
        }
    }
}

impl ScenarioConfig {
    /// Relative timestamp timeout.
    pub fn timestamp_timeout(&self) -> Duration {
        Duration::from_secs(self.timestamp_timeout_secs)
    }

    /// Time to let pass for a timestamp timeout to expire.
    pub fn timestamp_timeout_sleep(&self) -> Duration {
        Duration::from_secs(self.timestamp_timeout_sleep_secs)
    }
}
