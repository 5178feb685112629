//! Lifecycle of the nodes of a chain under test: allocation, genesis replication,
//! container creation, peering, start and liveness, and the two ways of bootstrapping
//! a chain out of these steps.
//!
//! The container runtime and the node binary are reached through the [`NodeRuntime`]
//! trait, so that everything here can run against [`testonly::FakeRuntime`].

mod bootstrap;
mod chain;
mod config;
mod error;
mod node;
mod orchestrator;
mod runtime;
pub mod testonly;

#[cfg(test)]
mod tests;

pub use bootstrap::{
    GENESIS_ACCOUNT_NATIVE_AMOUNT, GENESIS_ACCOUNT_STAKE_AMOUNT, SELF_DELEGATION_AMOUNT,
    STAKE_DENOM, VALIDATOR_KEY,
};
pub use chain::CosmosChain;
pub use config::OrchestratorConfig;
pub use error::BootstrapError;
pub use node::{Container, NodeHandle, NodeSet, Peer, Peers, GRPC_PORT, P2P_PORT, RPC_PORT};
pub use orchestrator::{Orchestrator, StartOrder};
pub use runtime::NodeRuntime;
