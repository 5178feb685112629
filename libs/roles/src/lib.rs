//! Types describing the chains, nodes and IBC objects that a test network is made of,
//! together with the `Chain` contract which the scenario engine drives.

pub mod chain;
pub mod config;
pub mod ibc;
pub mod node;
pub mod validator;

#[cfg(test)]
mod tests;

pub use chain::Chain;
pub use config::{ChainConfig, DockerImage, GasPrice};
pub use ibc::{
    ChannelCounterparty, ChannelOutput, Coin, ConnectionOutput, ContractStateModel,
    DumpContractStateResponse, IbcTimeout, TxResponse, User, WalletAmount,
};
pub use node::{NodeIdentity, NodeRole, PrivValidatorKeyFile, TypedKey};
pub use validator::ValidatorRecord;
