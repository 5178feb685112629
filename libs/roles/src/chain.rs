//! Contract between a chain under test and the code driving it.
use crate::{
    ChainConfig, DumpContractStateResponse, IbcTimeout, TxResponse, WalletAmount,
};
use std::path::Path;

/// A running (or about to be running) chain.
///
/// Every operation is fallible: the chain is backed by containers and remote
/// endpoints which may go away at any time.
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Configuration the chain was created with.
    fn config(&self) -> &ChainConfig;

    /// Pulls the images and allocates the nodes of the chain under `home`.
    /// Must be called exactly once, before `start`.
    async fn initialize(&mut self, test_name: &str, home: &Path) -> anyhow::Result<()>;

    /// Bootstraps the chain from scratch. `additional_genesis_wallets` are funded in genesis.
    async fn start(
        &mut self,
        test_name: &str,
        additional_genesis_wallets: &[WalletAmount],
    ) -> anyhow::Result<()>;

    /// Bootstraps the chain from an existing genesis document.
    async fn start_with_genesis_file(
        &mut self,
        test_name: &str,
        genesis_file: &Path,
    ) -> anyhow::Result<()> {
        let _ = (test_name, genesis_file);
        anyhow::bail!(
            "chain {} cannot be started from a genesis file",
            self.config().chain_id
        )
    }

    /// RPC address of the node designated for the relayer, reachable from the container network.
    fn rpc_address(&self) -> String;
    /// gRPC address of the node designated for the relayer, reachable from the container network.
    fn grpc_address(&self) -> String;
    /// RPC address of the node designated for the relayer, reachable from the host.
    fn host_rpc_address(&self) -> String;
    /// gRPC address of the node designated for the relayer, reachable from the host.
    fn host_grpc_address(&self) -> String;

    /// Creates a key in the keyring of the relayer node.
    async fn create_key(&self, key_name: &str) -> anyhow::Result<()>;
    /// Raw address of a key in the keyring of the relayer node.
    async fn get_address(&self, key_name: &str) -> anyhow::Result<Vec<u8>>;

    /// Sends funds from a key to an address on the same chain.
    async fn send_funds(&self, key_name: &str, amount: &WalletAmount) -> anyhow::Result<()>;

    /// Sends an ICS-20 transfer over `channel_id`. Returns the transaction hash.
    /// `None` leaves the default timeout of the node binary in place.
    async fn send_ibc_transfer(
        &self,
        channel_id: &str,
        key_name: &str,
        amount: &WalletAmount,
        timeout: Option<IbcTimeout>,
    ) -> anyhow::Result<String>;

    /// Stores and instantiates a wasm contract. Returns the contract address.
    async fn instantiate_contract(
        &self,
        key_name: &str,
        amount: &WalletAmount,
        file_path: &Path,
        init_message: &str,
        need_admin: bool,
    ) -> anyhow::Result<String>;

    /// Executes a message on a wasm contract.
    async fn execute_contract(
        &self,
        key_name: &str,
        contract_address: &str,
        message: &str,
    ) -> anyhow::Result<()>;

    /// Raw state of a wasm contract at `height`.
    async fn dump_contract_state(
        &self,
        contract_address: &str,
        height: u64,
    ) -> anyhow::Result<DumpContractStateResponse>;

    /// Exports the application state at `height` as a genesis document.
    async fn export_state(&self, height: u64) -> anyhow::Result<String>;

    /// Creates a liquidity pool described by the file at `pool_file`.
    async fn create_pool(&self, key_name: &str, pool_file: &Path) -> anyhow::Result<()>;

    /// Registers an interchain account for `address` over `connection_id`.
    /// Returns the transaction hash.
    async fn register_interchain_account(
        &self,
        address: &str,
        connection_id: &str,
    ) -> anyhow::Result<String>;

    /// Address of the interchain account registered for `address` over `connection_id`,
    /// on the host chain.
    async fn query_interchain_account(
        &self,
        connection_id: &str,
        address: &str,
    ) -> anyhow::Result<String>;

    /// Submits a bank transfer executed by the interchain account of `from_address`
    /// on the host chain.
    async fn send_ica_bank_transfer(
        &self,
        connection_id: &str,
        from_address: &str,
        to_address: &str,
        denom: &str,
        amount: i64,
    ) -> anyhow::Result<()>;

    /// Waits until `blocks` more blocks are produced. Returns the height reached.
    async fn wait_for_blocks(&self, blocks: u64) -> anyhow::Result<u64>;
    /// Latest block height.
    async fn height(&self) -> anyhow::Result<u64>;

    /// Balance of `address` in `denom`.
    async fn get_balance(&self, address: &str, denom: &str) -> anyhow::Result<i64>;
    /// Looks a transaction up by its hash.
    async fn get_transaction(&self, tx_hash: &str) -> anyhow::Result<TxResponse>;

    /// Fees paid in the native denomination for `gas` units of gas.
    fn gas_fees_in_native_denom(&self, gas: i64) -> anyhow::Result<i64> {
        self.config().gas_fees(gas)
    }
}
