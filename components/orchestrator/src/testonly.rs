//! In-memory node runtime for tests.
use crate::{Container, NodeHandle, NodeRuntime, GRPC_PORT, RPC_PORT};
use anyhow::Context as _;
use ibc_testnet_crypto::{bech32, sha256::Sha256};
use ibc_testnet_roles::{
    ChainConfig, Coin, DockerImage, DumpContractStateResponse, IbcTimeout, PrivValidatorKeyFile,
    TxResponse, TypedKey, WalletAmount,
};
use serde_json::json;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::Path,
    sync::Mutex,
    time::Duration,
};

/// Gas reported for every transaction of the fake runtime.
pub const FAKE_GAS_WANTED: i64 = 80_000;

#[derive(Debug, Default)]
struct State {
    fail_pull: bool,
    fail_create: HashSet<usize>,
    create_delay: Duration,
    stalled: bool,
    failing_height_queries: usize,
    pulled: Vec<String>,
    created: Vec<usize>,
    started: Vec<usize>,
    peers: HashMap<usize, String>,
    genesis_accounts: HashMap<usize, Vec<(String, Vec<Coin>)>>,
    height: u64,
    keys: HashSet<String>,
    balances: HashMap<(String, String), i64>,
    txs: HashMap<String, TxResponse>,
}

/// Runtime which keeps containers and the ledger in memory and writes node files the way
/// the node binary would. Blocks are produced whenever the height is queried.
#[derive(Debug)]
pub struct FakeRuntime {
    chain: ChainConfig,
    state: Mutex<State>,
}

/// Consensus key the fake runtime generates for a node.
pub fn fake_key_file(node_name: &str) -> PrivValidatorKeyFile {
    let address = Sha256::new(format!("address:{node_name}").as_bytes()).to_hex_upper();
    PrivValidatorKeyFile {
        address: address[..40].to_owned(),
        pub_key: TypedKey {
            key_type: "tendermint/PubKeyEd25519".to_owned(),
            value: format!(
                "pub{}=",
                &Sha256::new(format!("pub:{node_name}").as_bytes()).to_string()[..40]
            ),
        },
        priv_key: TypedKey {
            key_type: "tendermint/PrivKeyEd25519".to_owned(),
            value: Sha256::new(format!("priv:{node_name}").as_bytes()).to_string(),
        },
    }
}

/// P2P id the fake runtime reports for a node.
pub fn fake_node_id(node_name: &str) -> String {
    Sha256::new(format!("node_key:{node_name}").as_bytes()).to_string()[..40].to_owned()
}

/// Raw address of a key in the fake keyring of a node.
pub fn fake_key_address(node_name: &str, key_name: &str) -> Vec<u8> {
    Sha256::new(format!("key:{node_name}/{key_name}").as_bytes()).as_bytes()[..20].to_vec()
}

impl FakeRuntime {
    /// Constructs a runtime for nodes of `chain`.
    pub fn new(chain: ChainConfig) -> Self {
        Self {
            chain,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Makes every image pull fail.
    pub fn fail_pull(self) -> Self {
        self.state().fail_pull = true;
        self
    }

    /// Makes creation of the container of the node at `index` fail.
    pub fn fail_create(self, index: usize) -> Self {
        self.state().fail_create.insert(index);
        self
    }

    /// Makes every container creation take `delay`.
    pub fn slow_create(self, delay: Duration) -> Self {
        self.state().create_delay = delay;
        self
    }

    /// Makes the next `count` height queries fail. Blocks are still produced meanwhile.
    pub fn fail_height_queries(&self, count: usize) {
        self.state().failing_height_queries = count;
    }

    /// Stops block production.
    pub fn stall(&self) {
        self.state().stalled = true;
    }

    /// Sets a balance in the ledger.
    pub fn set_balance(&self, address: &str, denom: &str, amount: i64) {
        self.state()
            .balances
            .insert((address.to_owned(), denom.to_owned()), amount);
    }

    /// Images pulled successfully.
    pub fn pulled(&self) -> Vec<String> {
        self.state().pulled.clone()
    }

    /// Indices of the nodes with a container, in creation order.
    pub fn created(&self) -> Vec<usize> {
        self.state().created.clone()
    }

    /// Indices of the started nodes, in start order.
    pub fn started(&self) -> Vec<usize> {
        self.state().started.clone()
    }

    /// Peer list configured for the node at `index`.
    pub fn peers(&self, index: usize) -> Option<String> {
        self.state().peers.get(&index).cloned()
    }

    /// Accounts added to the genesis document of the node at `index`.
    pub fn genesis_accounts(&self, index: usize) -> Vec<(String, Vec<Coin>)> {
        self.state()
            .genesis_accounts
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a key was created in the keyring of a node.
    pub fn has_key(&self, node: &NodeHandle, key_name: &str) -> bool {
        self.state().keys.contains(&format!("{}/{key_name}", node.name))
    }

    /// Bech32 address of a key of a node.
    pub fn address(&self, node: &NodeHandle, key_name: &str) -> String {
        bech32::account_address(
            &self.chain.bech32_prefix,
            &fake_key_address(&node.name, key_name),
        )
        .unwrap()
    }

    fn transfer(&self, from: &str, to: &str, denom: &str, amount: i64) -> anyhow::Result<()> {
        let mut state = self.state();
        let from_key = (from.to_owned(), denom.to_owned());
        let balance = state.balances.get(&from_key).copied().unwrap_or(0);
        anyhow::ensure!(
            balance >= amount,
            "insufficient funds: {balance}{denom} < {amount}{denom}"
        );
        state.balances.insert(from_key, balance - amount);
        if !to.is_empty() {
            *state
                .balances
                .entry((to.to_owned(), denom.to_owned()))
                .or_default() += amount;
        }
        Ok(())
    }

    fn record_tx(&self) -> anyhow::Result<String> {
        let fees = self.chain.gas_fees(FAKE_GAS_WANTED)?;
        let mut state = self.state();
        let tx_hash = Sha256::new(format!("tx:{}", state.txs.len()).as_bytes()).to_hex_upper();
        let height = state.height;
        state.txs.insert(
            tx_hash.clone(),
            TxResponse {
                tx_hash: tx_hash.clone(),
                height,
                gas_wanted: FAKE_GAS_WANTED,
                gas_used: FAKE_GAS_WANTED / 2,
                raw: json!({ "fees": fees }).to_string(),
            },
        );
        Ok(tx_hash)
    }

    async fn write_home(&self, node: &NodeHandle) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(node.config_dir()).await?;
        let key = fake_key_file(&node.name).encode()?;
        tokio::fs::write(node.priv_validator_key_path(), key).await?;
        let template = json!({ "chain_id": self.chain.chain_id, "validators": [] });
        tokio::fs::write(node.genesis_path(), template.to_string()).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl NodeRuntime for FakeRuntime {
    async fn pull_image(&self, image: &DockerImage) -> anyhow::Result<()> {
        let mut state = self.state();
        anyhow::ensure!(!state.fail_pull, "registry unreachable");
        state.pulled.push(image.reference());
        Ok(())
    }

    async fn init_home(&self, _chain: &ChainConfig, node: &NodeHandle) -> anyhow::Result<()> {
        self.write_home(node).await
    }

    async fn init_validator_files(
        &self,
        _chain: &ChainConfig,
        node: &NodeHandle,
        genesis_amounts: &[Coin],
        self_delegation: &Coin,
    ) -> anyhow::Result<()> {
        self.write_home(node).await?;
        tokio::fs::create_dir_all(node.gentx_dir()).await?;
        let gentx = json!({ "validator": node.name, "delegation": self_delegation.to_string() });
        tokio::fs::write(node.gentx_path(&fake_node_id(&node.name)), gentx.to_string()).await?;
        let address = self.address(node, crate::VALIDATOR_KEY);
        self.state()
            .genesis_accounts
            .entry(node.index)
            .or_default()
            .push((address, genesis_amounts.to_vec()));
        Ok(())
    }

    async fn init_full_node_files(
        &self,
        _chain: &ChainConfig,
        node: &NodeHandle,
    ) -> anyhow::Result<()> {
        self.write_home(node).await
    }

    async fn node_id(&self, node: &NodeHandle) -> anyhow::Result<String> {
        Ok(fake_node_id(&node.name))
    }

    async fn key_address(&self, node: &NodeHandle, key_name: &str) -> anyhow::Result<Vec<u8>> {
        Ok(fake_key_address(&node.name, key_name))
    }

    async fn add_genesis_account(
        &self,
        node: &NodeHandle,
        address: &str,
        amounts: &[Coin],
    ) -> anyhow::Result<()> {
        self.state()
            .genesis_accounts
            .entry(node.index)
            .or_default()
            .push((address.to_owned(), amounts.to_vec()));
        Ok(())
    }

    async fn collect_gentxs(&self, node: &NodeHandle) -> anyhow::Result<()> {
        let mut gentxs = vec![];
        let mut dir = tokio::fs::read_dir(node.gentx_dir()).await?;
        while let Some(entry) = dir.next_entry().await? {
            gentxs.push(entry.file_name().to_string_lossy().into_owned());
        }
        gentxs.sort();
        let accounts: Vec<_> = self
            .genesis_accounts(node.index)
            .into_iter()
            .map(|(address, coins)| {
                let coins: Vec<_> = coins.iter().map(Coin::to_string).collect();
                json!({ "address": address, "coins": coins })
            })
            .collect();
        let genesis = json!({
            "chain_id": self.chain.chain_id,
            "accounts": accounts,
            "gentxs": gentxs,
        });
        tokio::fs::write(node.genesis_path(), serde_json::to_vec_pretty(&genesis)?).await?;
        Ok(())
    }

    async fn create_container(
        &self,
        _chain: &ChainConfig,
        node: &NodeHandle,
    ) -> anyhow::Result<Container> {
        // Yield, so that creations actually interleave.
        tokio::task::yield_now().await;
        let delay = self.state().create_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        anyhow::ensure!(
            !state.fail_create.contains(&node.index),
            "injected failure creating {}",
            node.name
        );
        state.created.push(node.index);
        let port = 30_000 + 10 * u16::try_from(node.index)?;
        Ok(Container {
            id: format!("container-{}", node.name),
            hostname: node.name.clone(),
            host_ports: BTreeMap::from([
                (RPC_PORT, format!("127.0.0.1:{}", port + 1)),
                (GRPC_PORT, format!("127.0.0.1:{}", port + 2)),
            ]),
        })
    }

    async fn set_validator_config_and_peers(
        &self,
        node: &NodeHandle,
        peers: &str,
    ) -> anyhow::Result<()> {
        self.state().peers.insert(node.index, peers.to_owned());
        Ok(())
    }

    async fn start_container(&self, node: &NodeHandle) -> anyhow::Result<()> {
        let mut state = self.state();
        anyhow::ensure!(
            state.created.contains(&node.index),
            "no container for {}",
            node.name
        );
        state.started.push(node.index);
        Ok(())
    }

    async fn height(&self, node: &NodeHandle) -> anyhow::Result<u64> {
        let mut state = self.state();
        anyhow::ensure!(
            state.started.contains(&node.index),
            "{}: connection refused",
            node.name
        );
        if !state.stalled {
            state.height += 1;
        }
        if state.failing_height_queries > 0 {
            state.failing_height_queries -= 1;
            anyhow::bail!("{}: request timed out", node.name);
        }
        Ok(state.height)
    }

    async fn create_key(&self, node: &NodeHandle, key_name: &str) -> anyhow::Result<()> {
        self.state().keys.insert(format!("{}/{key_name}", node.name));
        Ok(())
    }

    async fn send_funds(
        &self,
        node: &NodeHandle,
        key_name: &str,
        amount: &WalletAmount,
    ) -> anyhow::Result<()> {
        let from = self.address(node, key_name);
        self.transfer(&from, &amount.address, &amount.denom, amount.amount)
    }

    async fn send_ibc_transfer(
        &self,
        node: &NodeHandle,
        _channel_id: &str,
        key_name: &str,
        amount: &WalletAmount,
        _timeout: Option<IbcTimeout>,
    ) -> anyhow::Result<String> {
        let from = self.address(node, key_name);
        let fees = self.chain.gas_fees(FAKE_GAS_WANTED)?;
        self.transfer(&from, "", &self.chain.denom, fees)?;
        // Escrowed until relayed, which never happens without a counterparty.
        self.transfer(&from, "", &amount.denom, amount.amount)?;
        self.record_tx()
    }

    async fn instantiate_contract(
        &self,
        _node: &NodeHandle,
        _key_name: &str,
        _amount: &WalletAmount,
        _file_path: &Path,
        _init_message: &str,
        _need_admin: bool,
    ) -> anyhow::Result<String> {
        anyhow::bail!("contracts are not supported by FakeRuntime")
    }

    async fn execute_contract(
        &self,
        _node: &NodeHandle,
        _key_name: &str,
        _contract_address: &str,
        _message: &str,
    ) -> anyhow::Result<()> {
        anyhow::bail!("contracts are not supported by FakeRuntime")
    }

    async fn dump_contract_state(
        &self,
        _node: &NodeHandle,
        _contract_address: &str,
        _height: u64,
    ) -> anyhow::Result<DumpContractStateResponse> {
        anyhow::bail!("contracts are not supported by FakeRuntime")
    }

    async fn export_state(&self, node: &NodeHandle, _height: u64) -> anyhow::Result<String> {
        tokio::fs::read_to_string(node.genesis_path())
            .await
            .context("fs::read_to_string()")
    }

    async fn create_pool(
        &self,
        _node: &NodeHandle,
        _key_name: &str,
        _pool_file: &Path,
    ) -> anyhow::Result<()> {
        anyhow::bail!("pools are not supported by FakeRuntime")
    }

    async fn register_interchain_account(
        &self,
        _node: &NodeHandle,
        _address: &str,
        _connection_id: &str,
    ) -> anyhow::Result<String> {
        self.record_tx()
    }

    async fn query_interchain_account(
        &self,
        _node: &NodeHandle,
        connection_id: &str,
        address: &str,
    ) -> anyhow::Result<String> {
        let raw = Sha256::new(format!("ica:{connection_id}/{address}").as_bytes());
        bech32::account_address(&self.chain.bech32_prefix, raw.as_bytes())
    }

    async fn send_ica_bank_transfer(
        &self,
        _node: &NodeHandle,
        _connection_id: &str,
        from_address: &str,
        to_address: &str,
        denom: &str,
        amount: i64,
    ) -> anyhow::Result<()> {
        self.transfer(from_address, to_address, denom, amount)
    }

    async fn get_balance(
        &self,
        _node: &NodeHandle,
        address: &str,
        denom: &str,
    ) -> anyhow::Result<i64> {
        Ok(self
            .state()
            .balances
            .get(&(address.to_owned(), denom.to_owned()))
            .copied()
            .unwrap_or(0))
    }

    async fn get_transaction(
        &self,
        _node: &NodeHandle,
        tx_hash: &str,
    ) -> anyhow::Result<TxResponse> {
        self.state()
            .txs
            .get(tx_hash)
            .cloned()
            .with_context(|| format!("tx {tx_hash} not found"))
    }
}
