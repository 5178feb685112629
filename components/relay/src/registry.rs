//! Test cases addressable by name.
use crate::{
    BidirectionalTransfer, InterchainAccountTransfer, Scenario, ScenarioConfig, TimeoutPolicy,
    Transfer,
};
use std::{fmt, str::FromStr};

/// Relay test case known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCase {
    /// Transfers in both directions, relayed.
    RelayPacket,
    /// Transfer with both timeouts disabled, relayed.
    RelayPacketNoTimeout,
    /// Transfer which expires by height before the relayer starts.
    RelayPacketHeightTimeout,
    /// Transfer which expires by timestamp before the relayer starts.
    RelayPacketTimestampTimeout,
    /// Transfer through an interchain account.
    InterchainAccount,
}

/// Error returned when parsing an unknown `TestCase` name.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown test case {0:?}")]
pub struct UnknownTestCase(pub String);

impl TestCase {
    /// All test cases.
    pub const ALL: [Self; 5] = [
        Self::RelayPacket,
        Self::RelayPacketNoTimeout,
        Self::RelayPacketHeightTimeout,
        Self::RelayPacketTimestampTimeout,
        Self::InterchainAccount,
    ];

    /// Name the test case is registered under.
    pub fn name(self) -> &'static str {
        match self {
            Self::RelayPacket => "RelayPacketTest",
            Self::RelayPacketNoTimeout => "RelayPacketTestNoTimeout",
            Self::RelayPacketHeightTimeout => "RelayPacketTestHeightTimeout",
            Self::RelayPacketTimestampTimeout => "RelayPacketTestTimestampTimeout",
            Self::InterchainAccount => "RelayerInterchainAccountTest",
        }
    }

    /// Builds the scenario of the test case.
    pub fn scenario(self, cfg: &ScenarioConfig) -> Box<dyn Scenario> {
        let transfer = |policy, relay_wait_blocks| {
            Box::new(Transfer::new(
                self.name(),
                policy,
                cfg.transfer_amount,
                relay_wait_blocks,
            ))
        };
        match self {
            Self::RelayPacket => Box::new(BidirectionalTransfer::new(
                cfg.transfer_amount,
                cfg.bidirectional_relay_wait_blocks,
            )),
            Self::RelayPacketNoTimeout => transfer(TimeoutPolicy::Disabled, cfg.relay_wait_blocks),
            Self::RelayPacketHeightTimeout => transfer(
                TimeoutPolicy::Height {
                    blocks: cfg.height_timeout_blocks,
                    wait_blocks: cfg.height_timeout_wait_blocks,
                },
                cfg.relay_wait_blocks,
            ),
            Self::RelayPacketTimestampTimeout => transfer(
                TimeoutPolicy::Timestamp {
                    timeout: cfg.timestamp_timeout(),
                    sleep: cfg.timestamp_timeout_sleep(),
                },
                cfg.timestamp_relay_wait_blocks,
            ),
            Self::InterchainAccount => Box::new(InterchainAccountTransfer::new(
                cfg.ica_transfer_amount,
                cfg.ica_wait_blocks,
            )),
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestCase {
    type Err = UnknownTestCase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|case| case.name() == s)
            .ok_or_else(|| UnknownTestCase(s.to_owned()))
    }
}
