use crate::{Container, NodeHandle};
use ibc_testnet_roles::{
    ChainConfig, Coin, DockerImage, DumpContractStateResponse, IbcTimeout, TxResponse,
    WalletAmount,
};
use std::path::Path;

/// Container runtime and node binary, as seen by the orchestrator.
///
/// Every call targets a single node. Files the node binary produces (genesis, consensus
/// keys, gentxs) live in the node home, which the orchestrator reads and writes directly.
#[async_trait::async_trait]
pub trait NodeRuntime: Send + Sync + 'static {
    /// Pulls an image into the local image store.
    async fn pull_image(&self, image: &DockerImage) -> anyhow::Result<()>;

    /// Initializes the home folder of a node, generating its consensus key.
    async fn init_home(&self, chain: &ChainConfig, node: &NodeHandle) -> anyhow::Result<()>;

    /// Initializes the home folder of a validator for a chain built from scratch: a genesis
    /// template funding the validator key with `genesis_amounts`, and a gentx delegating
    /// `self_delegation` to the validator.
    async fn init_validator_files(
        &self,
        chain: &ChainConfig,
        node: &NodeHandle,
        genesis_amounts: &[Coin],
        self_delegation: &Coin,
    ) -> anyhow::Result<()>;

    /// Initializes the home folder of a full node for a chain built from scratch.
    async fn init_full_node_files(&self, chain: &ChainConfig, node: &NodeHandle)
        -> anyhow::Result<()>;

    /// P2P id of a node, derived from its node key.
    async fn node_id(&self, node: &NodeHandle) -> anyhow::Result<String>;

    /// Raw address of a key in the keyring of a node.
    async fn key_address(&self, node: &NodeHandle, key_name: &str) -> anyhow::Result<Vec<u8>>;

    /// Adds a funded account to the genesis document of a node.
    async fn add_genesis_account(
        &self,
        node: &NodeHandle,
        address: &str,
        amounts: &[Coin],
    ) -> anyhow::Result<()>;

    /// Folds the gentxs of a node into its genesis document.
    async fn collect_gentxs(&self, node: &NodeHandle) -> anyhow::Result<()>;

    /// Creates the container of a node. The container is not started.
    async fn create_container(
        &self,
        chain: &ChainConfig,
        node: &NodeHandle,
    ) -> anyhow::Result<Container>;

    /// Writes the validator configuration and the persistent peers of a node.
    async fn set_validator_config_and_peers(
        &self,
        node: &NodeHandle,
        peers: &str,
    ) -> anyhow::Result<()>;

    /// Starts the container of a node.
    async fn start_container(&self, node: &NodeHandle) -> anyhow::Result<()>;

    /// Latest block height known to a node.
    async fn height(&self, node: &NodeHandle) -> anyhow::Result<u64>;

    /// Creates a key in the keyring of a node.
    async fn create_key(&self, node: &NodeHandle, key_name: &str) -> anyhow::Result<()>;

    /// Sends funds from a key of a node.
    async fn send_funds(
        &self,
        node: &NodeHandle,
        key_name: &str,
        amount: &WalletAmount,
    ) -> anyhow::Result<()>;

    /// Sends an ICS-20 transfer from a key of a node. Returns the transaction hash.
    async fn send_ibc_transfer(
        &self,
        node: &NodeHandle,
        channel_id: &str,
        key_name: &str,
        amount: &WalletAmount,
        timeout: Option<IbcTimeout>,
    ) -> anyhow::Result<String>;

    /// Stores and instantiates a wasm contract. Returns the contract address.
    async fn instantiate_contract(
        &self,
        node: &NodeHandle,
        key_name: &str,
        amount: &WalletAmount,
        file_path: &Path,
        init_message: &str,
        need_admin: bool,
    ) -> anyhow::Result<String>;

    /// Executes a message on a wasm contract.
    async fn execute_contract(
        &self,
        node: &NodeHandle,
        key_name: &str,
        contract_address: &str,
        message: &str,
    ) -> anyhow::Result<()>;

    /// Raw state of a wasm contract.
    async fn dump_contract_state(
        &self,
        node: &NodeHandle,
        contract_address: &str,
        height: u64,
    ) -> anyhow::Result<DumpContractStateResponse>;

    /// Exports the application state as a genesis document.
    async fn export_state(&self, node: &NodeHandle, height: u64) -> anyhow::Result<String>;

    /// Creates a liquidity pool.
    async fn create_pool(
        &self,
        node: &NodeHandle,
        key_name: &str,
        pool_file: &Path,
    ) -> anyhow::Result<()>;

    /// Registers an interchain account. Returns the transaction hash.
    async fn register_interchain_account(
        &self,
        node: &NodeHandle,
        address: &str,
        connection_id: &str,
    ) -> anyhow::Result<String>;

    /// Address of an interchain account on the host chain.
    async fn query_interchain_account(
        &self,
        node: &NodeHandle,
        connection_id: &str,
        address: &str,
    ) -> anyhow::Result<String>;

    /// Submits a bank transfer executed by an interchain account.
    async fn send_ica_bank_transfer(
        &self,
        node: &NodeHandle,
        connection_id: &str,
        from_address: &str,
        to_address: &str,
        denom: &str,
        amount: i64,
    ) -> anyhow::Result<()>;

    /// Balance of an address.
    async fn get_balance(
        &self,
        node: &NodeHandle,
        address: &str,
        denom: &str,
    ) -> anyhow::Result<i64>;

    /// Looks a transaction up by its hash.
    async fn get_transaction(&self, node: &NodeHandle, tx_hash: &str)
        -> anyhow::Result<TxResponse>;
}
