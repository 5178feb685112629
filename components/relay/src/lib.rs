//! Relay scenarios: two bootstrapped chains, a relayer between them, a packet sent
//! before the relayer starts, and the balances expected once it has had time to act.

mod config;
mod delta;
mod engine;
mod error;
mod registry;
mod relayer;
mod scenarios;
pub mod testonly;

#[cfg(test)]
mod tests;

pub use config::ScenarioConfig;
pub use delta::Delta;
pub use engine::{Context, Scenario, ScenarioEngine, State, Wiring, PATH_NAME, USER_KEY};
pub use error::{AssertionFailure, ScenarioError};
pub use registry::{TestCase, UnknownTestCase};
pub use relayer::Relayer;
pub use scenarios::{
    BidirectionalTransfer, InterchainAccountTransfer, TimeoutPolicy, Transfer,
};
