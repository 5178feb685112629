//! In-memory chains and relayer for tests.
use crate::Relayer;
use anyhow::Context as _;
use ibc_testnet_crypto::{bech32, denom::ibc_denom, sha256::Sha256};
use ibc_testnet_roles::{
    Chain, ChainConfig, ChannelCounterparty, ChannelOutput, ConnectionOutput,
    DumpContractStateResponse, IbcTimeout, TxResponse, WalletAmount,
};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::time::Instant;

/// Gas reported for every transaction of the fake chains.
pub const FAKE_GAS_WANTED: i64 = 80_000;
/// Port of the transfer channel opened by the fake relayer.
pub const FAKE_PORT: &str = "transfer";
/// Connection opened by the fake relayer on both chains.
pub const FAKE_CONNECTION: &str = "connection-0";

/// Channel id of the end of the fake transfer channel on the chain at `end` of the path
/// (0 for the source chain, 1 for the destination chain).
pub fn fake_channel_id(end: usize) -> String {
    format!("channel-{end}")
}

#[derive(Debug)]
struct Packet {
    src_chain: String,
    dst_chain: String,
    sender: String,
    receiver: String,
    base_denom: String,
    receiver_denom: String,
    amount: i64,
    timeout_height: Option<u64>,
    deadline: Option<Instant>,
}

#[derive(Debug, Default)]
struct Ledger {
    prefixes: HashMap<String, String>,
    heights: HashMap<String, u64>,
    balances: HashMap<(String, String, String), i64>,
    txs: HashMap<String, TxResponse>,
    packets: Vec<Packet>,
    /// Registered with the relayer.
    chains: HashSet<String>,
    path: Option<(String, String)>,
    channel_open: bool,
    connection_open: bool,
    relaying: bool,
    /// Requested interchain accounts: (controller chain, connection, owner).
    ica_requests: Vec<(String, String, String)>,
    /// Interchain accounts by (controller chain, connection, owner).
    icas: HashMap<(String, String, String), String>,
}

impl Ledger {
    fn balance(&self, chain_id: &str, address: &str, denom: &str) -> Option<i64> {
        self.balances
            .get(&(chain_id.to_owned(), address.to_owned(), denom.to_owned()))
            .copied()
    }

    fn credit(&mut self, chain_id: &str, address: &str, denom: &str, amount: i64) {
        *self
            .balances
            .entry((chain_id.to_owned(), address.to_owned(), denom.to_owned()))
            .or_default() += amount;
    }

    fn debit(
        &mut self,
        chain_id: &str,
        address: &str,
        denom: &str,
        amount: i64,
    ) -> anyhow::Result<()> {
        let balance = self.balance(chain_id, address, denom).unwrap_or(0);
        anyhow::ensure!(
            balance >= amount,
            "insufficient funds: {balance}{denom} < {amount}{denom}"
        );
        self.credit(chain_id, address, denom, -amount);
        Ok(())
    }

    fn counterparty(&self, chain_id: &str) -> anyhow::Result<(usize, &str)> {
        let (src, dst) = self.path.as_ref().context("no path")?;
        if chain_id == src {
            Ok((1, dst))
        } else if chain_id == dst {
            Ok((0, src))
        } else {
            anyhow::bail!("chain {chain_id} is not on the path")
        }
    }

    /// Relays everything pending, if the relayer is running.
    fn relay(&mut self) {
        if !self.relaying {
            return;
        }
        for packet in std::mem::take(&mut self.packets) {
            let height = self.heights.get(&packet.dst_chain).copied().unwrap_or(0);
            let expired = packet.timeout_height.is_some_and(|h| height >= h)
                || packet.deadline.is_some_and(|d| Instant::now() >= d);
            if expired {
                self.credit(&packet.src_chain, &packet.sender, &packet.base_denom, packet.amount);
            } else {
                self.credit(
                    &packet.dst_chain,
                    &packet.receiver,
                    &packet.receiver_denom,
                    packet.amount,
                );
            }
        }
        for (chain, connection, owner) in std::mem::take(&mut self.ica_requests) {
            let Ok((_, host)) = self.counterparty(&chain) else {
                continue;
            };
            let prefix = self.prefixes.get(host).cloned().unwrap_or_default();
            let raw = Sha256::new(format!("ica:{chain}/{connection}/{owner}").as_bytes());
            if let Ok(address) = bech32::account_address(&prefix, &raw.as_bytes()[..20]) {
                self.icas.insert((chain, connection, owner), address);
            }
        }
    }
}

/// Ledger shared by fake chains and a fake relayer. Packets are relayed whenever one of
/// the chains produces a block while the relayer is running.
#[derive(Debug, Clone, Default)]
pub struct FakeNetwork(Arc<Mutex<Ledger>>);

impl FakeNetwork {
    /// Constructs an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.0.lock().unwrap()
    }

    /// Adds a chain to the network.
    pub fn chain(&self, cfg: ChainConfig) -> FakeChain {
        self.ledger()
            .prefixes
            .insert(cfg.chain_id.clone(), cfg.bech32_prefix.clone());
        FakeChain {
            cfg,
            net: self.clone(),
            initialized: false,
            started: false,
        }
    }

    /// Relayer which relays packets once started.
    pub fn relayer(&self) -> FakeRelayer {
        FakeRelayer {
            net: self.clone(),
            idle: false,
        }
    }

    /// Relayer which sets everything up but never relays anything.
    pub fn idle_relayer(&self) -> FakeRelayer {
        FakeRelayer {
            net: self.clone(),
            idle: true,
        }
    }

    /// Balance of `address` on `chain_id`. Zero for unknown accounts.
    pub fn balance(&self, chain_id: &str, address: &str, denom: &str) -> i64 {
        self.ledger().balance(chain_id, address, denom).unwrap_or(0)
    }

    /// Number of packets waiting to be relayed.
    pub fn pending_packets(&self) -> usize {
        self.ledger().packets.len()
    }
}

/// Chain kept in the ledger of a `FakeNetwork`.
#[derive(Debug)]
pub struct FakeChain {
    cfg: ChainConfig,
    net: FakeNetwork,
    initialized: bool,
    started: bool,
}

/// Raw address of a key of a fake chain.
pub fn fake_key_address(chain_id: &str, key_name: &str) -> Vec<u8> {
    Sha256::new(format!("key:{chain_id}/{key_name}").as_bytes()).as_bytes()[..20].to_vec()
}

impl FakeChain {
    fn address(&self, key_name: &str) -> anyhow::Result<String> {
        bech32::account_address(
            &self.cfg.bech32_prefix,
            &fake_key_address(&self.cfg.chain_id, key_name),
        )
    }

    fn ensure_started(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.started, "chain {} is not running", self.cfg.chain_id);
        Ok(())
    }

    fn record_tx(&self, ledger: &mut Ledger) -> anyhow::Result<String> {
        let fees = self.cfg.gas_fees(FAKE_GAS_WANTED)?;
        let tx_hash = Sha256::new(format!("tx:{}", ledger.txs.len()).as_bytes()).to_hex_upper();
        let height = ledger.heights.get(&self.cfg.chain_id).copied().unwrap_or(0);
        ledger.txs.insert(
            tx_hash.clone(),
            TxResponse {
                tx_hash: tx_hash.clone(),
                height,
                gas_wanted: FAKE_GAS_WANTED,
                gas_used: FAKE_GAS_WANTED / 2,
                raw: format!("{{\"chain_id\":\"{}\",\"fees\":{fees}}}", self.cfg.chain_id),
            },
        );
        Ok(tx_hash)
    }
}

#[async_trait::async_trait]
impl Chain for FakeChain {
    fn config(&self) -> &ChainConfig {
        &self.cfg
    }

    async fn initialize(&mut self, _test_name: &str, _home: &Path) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.initialized,
            "chain {} is already initialized",
            self.cfg.chain_id
        );
        self.initialized = true;
        Ok(())
    }

    async fn start(
        &mut self,
        _test_name: &str,
        additional_genesis_wallets: &[WalletAmount],
    ) -> anyhow::Result<()> {
        anyhow::ensure!(self.initialized, "chain {} is not initialized", self.cfg.chain_id);
        let mut ledger = self.net.ledger();
        for wallet in additional_genesis_wallets {
            ledger.credit(&self.cfg.chain_id, &wallet.address, &wallet.denom, wallet.amount);
        }
        ledger.heights.insert(self.cfg.chain_id.clone(), 1);
        self.started = true;
        Ok(())
    }

    fn rpc_address(&self) -> String {
        format!("http://{}-rpc:26657", self.cfg.chain_id)
    }

    fn grpc_address(&self) -> String {
        format!("{}-grpc:9090", self.cfg.chain_id)
    }

    fn host_rpc_address(&self) -> String {
        "http://127.0.0.1:26657".to_owned()
    }

    fn host_grpc_address(&self) -> String {
        "127.0.0.1:9090".to_owned()
    }

    async fn create_key(&self, _key_name: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn get_address(&self, key_name: &str) -> anyhow::Result<Vec<u8>> {
        Ok(fake_key_address(&self.cfg.chain_id, key_name))
    }

    async fn send_funds(&self, key_name: &str, amount: &WalletAmount) -> anyhow::Result<()> {
        self.ensure_started()?;
        let from = self.address(key_name)?;
        let mut ledger = self.net.ledger();
        ledger.debit(&self.cfg.chain_id, &from, &amount.denom, amount.amount)?;
        ledger.credit(&self.cfg.chain_id, &amount.address, &amount.denom, amount.amount);
        Ok(())
    }

    async fn send_ibc_transfer(
        &self,
        channel_id: &str,
        key_name: &str,
        amount: &WalletAmount,
        timeout: Option<IbcTimeout>,
    ) -> anyhow::Result<String> {
        self.ensure_started()?;
        let from = self.address(key_name)?;
        let fees = self.cfg.gas_fees(FAKE_GAS_WANTED)?;
        let chain_id = &self.cfg.chain_id;
        let mut ledger = self.net.ledger();
        anyhow::ensure!(ledger.channel_open, "no open channel");
        let (end, counterparty) = ledger.counterparty(chain_id)?;
        let counterparty = counterparty.to_owned();
        anyhow::ensure!(
            channel_id == fake_channel_id(1 - end),
            "unknown channel {channel_id}"
        );
        ledger.debit(chain_id, &from, &self.cfg.denom, fees)?;
        ledger.debit(chain_id, &from, &amount.denom, amount.amount)?;
        let timeout = timeout.unwrap_or_default();
        let counterparty_height = ledger.heights.get(&counterparty).copied().unwrap_or(0);
        ledger.packets.push(Packet {
            src_chain: chain_id.clone(),
            dst_chain: counterparty,
            sender: from,
            receiver: amount.address.clone(),
            base_denom: amount.denom.clone(),
            receiver_denom: ibc_denom(FAKE_PORT, &fake_channel_id(end), &amount.denom),
            amount: amount.amount,
            timeout_height: (timeout.height > 0).then(|| counterparty_height + timeout.height),
            deadline: (timeout.nano_seconds > 0)
                .then(|| Instant::now() + Duration::from_nanos(timeout.nano_seconds)),
        });
        self.record_tx(&mut ledger)
    }

    async fn instantiate_contract(
        &self,
        _key_name: &str,
        _amount: &WalletAmount,
        _file_path: &Path,
        _init_message: &str,
        _need_admin: bool,
    ) -> anyhow::Result<String> {
        anyhow::bail!("contracts are not supported by FakeChain")
    }

    async fn execute_contract(
        &self,
        _key_name: &str,
        _contract_address: &str,
        _message: &str,
    ) -> anyhow::Result<()> {
        anyhow::bail!("contracts are not supported by FakeChain")
    }

    async fn dump_contract_state(
        &self,
        _contract_address: &str,
        _height: u64,
    ) -> anyhow::Result<DumpContractStateResponse> {
        anyhow::bail!("contracts are not supported by FakeChain")
    }

    async fn export_state(&self, _height: u64) -> anyhow::Result<String> {
        anyhow::bail!("state export is not supported by FakeChain")
    }

    async fn create_pool(&self, _key_name: &str, _pool_file: &Path) -> anyhow::Result<()> {
        anyhow::bail!("pools are not supported by FakeChain")
    }

    async fn register_interchain_account(
        &self,
        address: &str,
        connection_id: &str,
    ) -> anyhow::Result<String> {
        self.ensure_started()?;
        let mut ledger = self.net.ledger();
        anyhow::ensure!(
            ledger.connection_open && connection_id == FAKE_CONNECTION,
            "unknown connection {connection_id}"
        );
        ledger.ica_requests.push((
            self.cfg.chain_id.clone(),
            connection_id.to_owned(),
            address.to_owned(),
        ));
        self.record_tx(&mut ledger)
    }

    async fn query_interchain_account(
        &self,
        connection_id: &str,
        address: &str,
    ) -> anyhow::Result<String> {
        let key = (
            self.cfg.chain_id.clone(),
            connection_id.to_owned(),
            address.to_owned(),
        );
        self.net
            .ledger()
            .icas
            .get(&key)
            .cloned()
            .with_context(|| format!("no interchain account for {address} on {connection_id}"))
    }

    async fn send_ica_bank_transfer(
        &self,
        connection_id: &str,
        from_address: &str,
        to_address: &str,
        denom: &str,
        amount: i64,
    ) -> anyhow::Result<()> {
        let chain_id = &self.cfg.chain_id;
        let mut ledger = self.net.ledger();
        let key = (chain_id.clone(), connection_id.to_owned(), from_address.to_owned());
        anyhow::ensure!(
            ledger.icas.get(&key).is_some_and(|ica| ica == to_address),
            "{to_address} is not the interchain account of {from_address}"
        );
        let (_, host) = ledger.counterparty(chain_id)?;
        let host = host.to_owned();
        ledger.debit(chain_id, from_address, denom, amount)?;
        ledger.credit(&host, to_address, denom, amount);
        Ok(())
    }

    async fn wait_for_blocks(&self, blocks: u64) -> anyhow::Result<u64> {
        self.ensure_started()?;
        let mut height = 0;
        for _ in 0..blocks {
            let mut ledger = self.net.ledger();
            let h = ledger.heights.entry(self.cfg.chain_id.clone()).or_default();
            *h += 1;
            height = *h;
            ledger.relay();
        }
        if blocks == 0 {
            height = self.height().await?;
        }
        Ok(height)
    }

    async fn height(&self) -> anyhow::Result<u64> {
        self.ensure_started()?;
        Ok(self
            .net
            .ledger()
            .heights
            .get(&self.cfg.chain_id)
            .copied()
            .unwrap_or(0))
    }

    async fn get_balance(&self, address: &str, denom: &str) -> anyhow::Result<i64> {
        self.ensure_started()?;
        Ok(self
            .net
            .ledger()
            .balance(&self.cfg.chain_id, address, denom)
            .unwrap_or(0))
    }

    async fn get_transaction(&self, tx_hash: &str) -> anyhow::Result<TxResponse> {
        self.net
            .ledger()
            .txs
            .get(tx_hash)
            .cloned()
            .with_context(|| format!("tx {tx_hash} not found"))
    }
}

/// Relayer operating on the ledger of a `FakeNetwork`.
#[derive(Debug, Clone)]
pub struct FakeRelayer {
    net: FakeNetwork,
    idle: bool,
}

impl FakeRelayer {
    fn channel(ledger: &Ledger, chain_id: &str) -> anyhow::Result<ChannelOutput> {
        let (end, _) = ledger.counterparty(chain_id)?;
        Ok(ChannelOutput {
            state: "STATE_OPEN".to_owned(),
            ordering: "ORDER_UNORDERED".to_owned(),
            counterparty: ChannelCounterparty {
                port_id: FAKE_PORT.to_owned(),
                channel_id: fake_channel_id(end),
            },
            connection_hops: vec![FAKE_CONNECTION.to_owned()],
            version: "ics20-1".to_owned(),
            port_id: FAKE_PORT.to_owned(),
            channel_id: fake_channel_id(1 - end),
        })
    }
}

#[async_trait::async_trait]
impl Relayer for FakeRelayer {
    async fn add_chain_configuration(
        &self,
        chain: &ChainConfig,
        _rpc_address: &str,
        _grpc_address: &str,
    ) -> anyhow::Result<()> {
        self.net.ledger().chains.insert(chain.chain_id.clone());
        Ok(())
    }

    async fn add_key(&self, chain_id: &str, key_name: &str) -> anyhow::Result<String> {
        let prefix = self
            .net
            .ledger()
            .prefixes
            .get(chain_id)
            .cloned()
            .with_context(|| format!("unknown chain {chain_id}"))?;
        let raw = fake_key_address(chain_id, &format!("relayer/{key_name}"));
        bech32::account_address(&prefix, &raw)
    }

    async fn generate_path(
        &self,
        src_chain_id: &str,
        dst_chain_id: &str,
        _path_name: &str,
    ) -> anyhow::Result<()> {
        let mut ledger = self.net.ledger();
        for chain_id in [src_chain_id, dst_chain_id] {
            anyhow::ensure!(ledger.chains.contains(chain_id), "chain {chain_id} is not configured");
        }
        ledger.path = Some((src_chain_id.to_owned(), dst_chain_id.to_owned()));
        Ok(())
    }

    async fn link_path(&self, _path_name: &str) -> anyhow::Result<()> {
        let mut ledger = self.net.ledger();
        anyhow::ensure!(ledger.path.is_some(), "no path");
        ledger.connection_open = true;
        ledger.channel_open = true;
        Ok(())
    }

    async fn create_connections(&self, _path_name: &str) -> anyhow::Result<()> {
        let mut ledger = self.net.ledger();
        anyhow::ensure!(ledger.path.is_some(), "no path");
        ledger.connection_open = true;
        Ok(())
    }

    async fn get_channels(&self, chain_id: &str) -> anyhow::Result<Vec<ChannelOutput>> {
        let ledger = self.net.ledger();
        if !ledger.channel_open {
            return Ok(vec![]);
        }
        Ok(vec![Self::channel(&ledger, chain_id)?])
    }

    async fn get_connections(&self, chain_id: &str) -> anyhow::Result<Vec<ConnectionOutput>> {
        let ledger = self.net.ledger();
        if !ledger.connection_open {
            return Ok(vec![]);
        }
        ledger.counterparty(chain_id)?;
        Ok(vec![ConnectionOutput {
            id: FAKE_CONNECTION.to_owned(),
            client_id: "07-tendermint-0".to_owned(),
            state: "STATE_OPEN".to_owned(),
        }])
    }

    async fn start(&self, _path_name: &str) -> anyhow::Result<()> {
        let mut ledger = self.net.ledger();
        anyhow::ensure!(ledger.path.is_some(), "no path");
        ledger.relaying = !self.idle;
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.net.ledger().relaying = false;
        Ok(())
    }
}
