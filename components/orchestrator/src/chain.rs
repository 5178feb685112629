use crate::{
    NodeHandle, NodeRuntime, NodeSet, Orchestrator, OrchestratorConfig, GRPC_PORT, RPC_PORT,
};
use anyhow::Context as _;
use ibc_testnet_roles::{
    Chain, ChainConfig, DumpContractStateResponse, IbcTimeout, TxResponse, WalletAmount,
};
use std::{path::Path, sync::Arc};

/// Cosmos SDK chain run in containers. Queries and transactions go through the relayer node.
#[derive(Debug)]
pub struct CosmosChain {
    orchestrator: Orchestrator,
    num_validators: usize,
    num_full_nodes: usize,
    nodes: Option<NodeSet>,
}

impl CosmosChain {
    /// Constructs a chain with the given number of nodes. Nothing is allocated until `initialize`.
    pub fn new(
        runtime: Arc<dyn NodeRuntime>,
        chain: ChainConfig,
        cfg: OrchestratorConfig,
        num_validators: usize,
        num_full_nodes: usize,
    ) -> Self {
        Self {
            orchestrator: Orchestrator::new(runtime, chain, cfg),
            num_validators,
            num_full_nodes,
            nodes: None,
        }
    }

    /// Nodes of the chain, once initialized.
    pub fn nodes(&self) -> Option<&NodeSet> {
        self.nodes.as_ref()
    }

    fn node_set(&self) -> anyhow::Result<&NodeSet> {
        self.nodes
            .as_ref()
            .with_context(|| format!("chain {} is not initialized", self.config().chain_id))
    }

    fn node_set_mut(&mut self) -> anyhow::Result<&mut NodeSet> {
        let chain_id = self.orchestrator.chain().chain_id.clone();
        self.nodes
            .as_mut()
            .with_context(|| format!("chain {chain_id} is not initialized"))
    }

    fn relayer(&self) -> anyhow::Result<&NodeHandle> {
        Ok(self.node_set()?.relayer_node())
    }

    fn runtime(&self) -> &dyn NodeRuntime {
        self.orchestrator.runtime().as_ref()
    }

    fn relayer_hostname(&self) -> String {
        match &self.nodes {
            Some(nodes) => nodes.relayer_node().hostname().to_owned(),
            None => String::new(),
        }
    }

    fn relayer_host_port(&self, port: u16) -> String {
        self.nodes
            .as_ref()
            .and_then(|n| n.relayer_node().host_port(port))
            .unwrap_or_default()
            .to_owned()
    }
}

#[async_trait::async_trait]
impl Chain for CosmosChain {
    fn config(&self) -> &ChainConfig {
        self.orchestrator.chain()
    }

    async fn initialize(&mut self, test_name: &str, home: &Path) -> anyhow::Result<()> {
        anyhow::ensure!(self.nodes.is_none(), "chain is already initialized");
        let nodes = self
            .orchestrator
            .allocate(home, test_name, self.num_validators, self.num_full_nodes)
            .await?;
        self.nodes = Some(nodes);
        Ok(())
    }

    async fn start(
        &mut self,
        _test_name: &str,
        additional_genesis_wallets: &[WalletAmount],
    ) -> anyhow::Result<()> {
        let orchestrator = self.orchestrator.clone();
        let nodes = self.node_set_mut()?;
        orchestrator
            .bootstrap_from_scratch(nodes, additional_genesis_wallets)
            .await?;
        Ok(())
    }

    async fn start_with_genesis_file(
        &mut self,
        _test_name: &str,
        genesis_file: &Path,
    ) -> anyhow::Result<()> {
        let reference = tokio::fs::read(genesis_file)
            .await
            .with_context(|| format!("fs::read({genesis_file:?})"))?;
        let orchestrator = self.orchestrator.clone();
        let nodes = self.node_set_mut()?;
        orchestrator.bootstrap_from_genesis(nodes, reference).await?;
        Ok(())
    }

    fn rpc_address(&self) -> String {
        format!("http://{}:{RPC_PORT}", self.relayer_hostname())
    }

    fn grpc_address(&self) -> String {
        format!("{}:{GRPC_PORT}", self.relayer_hostname())
    }

    fn host_rpc_address(&self) -> String {
        format!("http://{}", self.relayer_host_port(RPC_PORT))
    }

    fn host_grpc_address(&self) -> String {
        self.relayer_host_port(GRPC_PORT)
    }

    async fn create_key(&self, key_name: &str) -> anyhow::Result<()> {
        self.runtime().create_key(self.relayer()?, key_name).await
    }

    async fn get_address(&self, key_name: &str) -> anyhow::Result<Vec<u8>> {
        self.runtime().key_address(self.relayer()?, key_name).await
    }

    async fn send_funds(&self, key_name: &str, amount: &WalletAmount) -> anyhow::Result<()> {
        self.runtime()
            .send_funds(self.relayer()?, key_name, amount)
            .await
    }

    async fn send_ibc_transfer(
        &self,
        channel_id: &str,
        key_name: &str,
        amount: &WalletAmount,
        timeout: Option<IbcTimeout>,
    ) -> anyhow::Result<String> {
        self.runtime()
            .send_ibc_transfer(self.relayer()?, channel_id, key_name, amount, timeout)
            .await
    }

    async fn instantiate_contract(
        &self,
        key_name: &str,
        amount: &WalletAmount,
        file_path: &Path,
        init_message: &str,
        need_admin: bool,
    ) -> anyhow::Result<String> {
        self.runtime()
            .instantiate_contract(
                self.relayer()?,
                key_name,
                amount,
                file_path,
                init_message,
                need_admin,
            )
            .await
    }

    async fn execute_contract(
        &self,
        key_name: &str,
        contract_address: &str,
        message: &str,
    ) -> anyhow::Result<()> {
        self.runtime()
            .execute_contract(self.relayer()?, key_name, contract_address, message)
            .await
    }

    async fn dump_contract_state(
        &self,
        contract_address: &str,
        height: u64,
    ) -> anyhow::Result<DumpContractStateResponse> {
        self.runtime()
            .dump_contract_state(self.relayer()?, contract_address, height)
            .await
    }

    async fn export_state(&self, height: u64) -> anyhow::Result<String> {
        self.runtime().export_state(self.relayer()?, height).await
    }

    async fn create_pool(&self, key_name: &str, pool_file: &Path) -> anyhow::Result<()> {
        self.runtime()
            .create_pool(self.relayer()?, key_name, pool_file)
            .await
    }

    async fn register_interchain_account(
        &self,
        address: &str,
        connection_id: &str,
    ) -> anyhow::Result<String> {
        self.runtime()
            .register_interchain_account(self.relayer()?, address, connection_id)
            .await
    }

    async fn query_interchain_account(
        &self,
        connection_id: &str,
        address: &str,
    ) -> anyhow::Result<String> {
        self.runtime()
            .query_interchain_account(self.relayer()?, connection_id, address)
            .await
    }

    async fn send_ica_bank_transfer(
        &self,
        connection_id: &str,
        from_address: &str,
        to_address: &str,
        denom: &str,
        amount: i64,
    ) -> anyhow::Result<()> {
        self.runtime()
            .send_ica_bank_transfer(
                self.relayer()?,
                connection_id,
                from_address,
                to_address,
                denom,
                amount,
            )
            .await
    }

    async fn wait_for_blocks(&self, blocks: u64) -> anyhow::Result<u64> {
        Ok(self
            .orchestrator
            .wait_liveness(self.node_set()?, blocks)
            .await?)
    }

    async fn height(&self) -> anyhow::Result<u64> {
        self.runtime().height(self.relayer()?).await
    }

    async fn get_balance(&self, address: &str, denom: &str) -> anyhow::Result<i64> {
        self.runtime()
            .get_balance(self.relayer()?, address, denom)
            .await
    }

    async fn get_transaction(&self, tx_hash: &str) -> anyhow::Result<TxResponse> {
        self.runtime()
            .get_transaction(self.relayer()?, tx_hash)
            .await
    }
}
