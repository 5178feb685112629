use crate::{Relayer, ScenarioConfig, ScenarioError, TestCase};
use anyhow::Context as _;
use ibc_testnet_crypto::bech32;
use ibc_testnet_roles::{Chain, ChannelOutput, ConnectionOutput, User, WalletAmount};
use std::{fmt, path::Path};

/// Name of the user key created on each chain.
pub const USER_KEY: &str = "user";
/// Name of the relayer path between the two chains.
pub const PATH_NAME: &str = "ibc-test-path";

/// What the relayer establishes between the chains during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    /// Clients, a connection and a transfer channel.
    Channel,
    /// Clients and a connection only.
    Connection,
}

/// Stage of a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Bringing up the chains and the relayer.
    Setup,
    /// Recording baselines and submitting the packet, with the relayer stopped.
    PreRelay,
    /// Letting the relayer act.
    RelayWait,
    /// Comparing balances with the expected ones.
    Assert,
    /// All checks passed.
    Pass,
    /// A check failed.
    Fail,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "SETUP",
            Self::PreRelay => "PRE_RELAY",
            Self::RelayWait => "RELAY_WAIT",
            Self::Assert => "ASSERT",
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        })
    }
}

/// Everything a scenario gets to work with once the chains are up.
pub struct Context<'a> {
    /// Configuration of the run.
    pub cfg: &'a ScenarioConfig,
    /// Chain the packets under test originate from.
    pub src: &'a dyn Chain,
    /// Counterparty chain.
    pub dst: &'a dyn Chain,
    /// Channels of the source chain. Empty for `Wiring::Connection`.
    pub channels: Vec<ChannelOutput>,
    /// Connections of the source chain. Empty for `Wiring::Channel`.
    pub connections: Vec<ConnectionOutput>,
    /// User whose key lives on the source chain, funded there.
    pub src_user: User,
    /// User whose key lives on the destination chain, funded there.
    pub dst_user: User,
}

impl Context<'_> {
    /// The channel under test.
    pub fn channel(&self) -> anyhow::Result<&ChannelOutput> {
        self.channels.first().context("no channel between the chains")
    }

    /// The connection under test.
    pub fn connection(&self) -> anyhow::Result<&ConnectionOutput> {
        self.connections
            .first()
            .context("no connection between the chains")
    }

    /// Waits until both chains have produced `blocks` more blocks.
    pub async fn wait_for_blocks(&self, blocks: u64) -> anyhow::Result<()> {
        let (src, dst) = tokio::join!(
            self.src.wait_for_blocks(blocks),
            self.dst.wait_for_blocks(blocks)
        );
        src?;
        dst?;
        Ok(())
    }
}

/// A relay test: which packet is sent, how long the relayer gets, and what the balances
/// have to look like afterwards.
#[async_trait::async_trait]
pub trait Scenario: Send {
    /// Name, for logs.
    fn name(&self) -> &str;

    /// What to establish between the chains.
    fn wiring(&self) -> Wiring {
        Wiring::Channel
    }

    /// Records baselines and submits the packet under test. The relayer is not running yet.
    async fn pre_relay(&mut self, ctx: &Context<'_>) -> anyhow::Result<()>;

    /// Waits for the relayer to act. The relayer is running.
    async fn relay_wait(&mut self, ctx: &Context<'_>) -> anyhow::Result<()>;

    /// Compares the balances with the expected ones.
    async fn assert(&mut self, ctx: &Context<'_>) -> Result<(), ScenarioError>;
}

/// Runs scenarios, one attempt each.
#[derive(Debug, Clone, Default)]
pub struct ScenarioEngine {
    cfg: ScenarioConfig,
}

impl ScenarioEngine {
    /// Constructs an engine.
    pub fn new(cfg: ScenarioConfig) -> Self {
        Self { cfg }
    }

    /// Configuration of the engine.
    pub fn config(&self) -> &ScenarioConfig {
        &self.cfg
    }

    /// Runs a registered test case.
    pub async fn run_test_case(
        &self,
        test_case: TestCase,
        test_name: &str,
        home: &Path,
        src: &mut dyn Chain,
        dst: &mut dyn Chain,
        relayer: &dyn Relayer,
    ) -> Result<(), ScenarioError> {
        let mut scenario = test_case.scenario(&self.cfg);
        self.run(scenario.as_mut(), test_name, home, src, dst, relayer)
            .await
    }

    /// Brings up `src`, `dst` and the relayer between them, and runs `scenario` on top.
    /// Nothing is torn down afterwards, whatever the outcome.
    pub async fn run(
        &self,
        scenario: &mut dyn Scenario,
        test_name: &str,
        home: &Path,
        src: &mut dyn Chain,
        dst: &mut dyn Chain,
        relayer: &dyn Relayer,
    ) -> Result<(), ScenarioError> {
        let name = scenario.name().to_owned();
        let enter = |state: State| tracing::info!(scenario = %name, %state, "scenario state");

        enter(State::Setup);
        let ctx = self
            .setup(scenario.wiring(), test_name, home, src, dst, relayer)
            .await
            .map_err(ScenarioError::Setup)?;

        enter(State::PreRelay);
        scenario.pre_relay(&ctx).await?;
        relayer
            .start(PATH_NAME)
            .await
            .context("relayer.start()")?;

        enter(State::RelayWait);
        scenario.relay_wait(&ctx).await?;

        enter(State::Assert);
        match scenario.assert(&ctx).await {
            Ok(()) => {
                enter(State::Pass);
                Ok(())
            }
            Err(err) => {
                enter(State::Fail);
                tracing::warn!(scenario = %name, "{err}");
                Err(err)
            }
        }
    }

    async fn setup<'a>(
        &'a self,
        wiring: Wiring,
        test_name: &str,
        home: &Path,
        src: &'a mut dyn Chain,
        dst: &'a mut dyn Chain,
        relayer: &dyn Relayer,
    ) -> anyhow::Result<Context<'a>> {
        // Both chains run to completion even if one fails, so that neither is left half
        // initialized.
        let (src_res, dst_res) = tokio::join!(
            src.initialize(test_name, home),
            dst.initialize(test_name, home)
        );
        src_res.context("src.initialize()")?;
        dst_res.context("dst.initialize()")?;
        let (src_id, dst_id) = (
            src.config().chain_id.clone(),
            dst.config().chain_id.clone(),
        );

        let src_relayer = relayer
            .add_key(&src_id, &src_id)
            .await
            .context("relayer.add_key()")?;
        let dst_relayer = relayer
            .add_key(&dst_id, &dst_id)
            .await
            .context("relayer.add_key()")?;
        let src_user = create_user(&*src, &*src, &*dst).await?;
        let dst_user = create_user(&*dst, &*src, &*dst).await?;

        let funds = |chain: &dyn Chain, addresses: [&str; 2]| {
            addresses.map(|address| WalletAmount {
                address: address.to_owned(),
                denom: chain.config().denom.clone(),
                amount: self.cfg.user_funds,
            })
        };
        let src_wallets = funds(&*src, [&src_relayer, &src_user.src_chain_address]);
        let dst_wallets = funds(&*dst, [&dst_relayer, &dst_user.dst_chain_address]);
        let (src_res, dst_res) = tokio::join!(
            src.start(test_name, &src_wallets),
            dst.start(test_name, &dst_wallets)
        );
        src_res.context("src.start()")?;
        dst_res.context("dst.start()")?;

        let src: &'a dyn Chain = src;
        let dst: &'a dyn Chain = dst;
        for chain in [src, dst] {
            relayer
                .add_chain_configuration(
                    chain.config(),
                    &chain.rpc_address(),
                    &chain.grpc_address(),
                )
                .await
                .context("relayer.add_chain_configuration()")?;
        }
        relayer
            .generate_path(&src_id, &dst_id, PATH_NAME)
            .await
            .context("relayer.generate_path()")?;
        let (channels, connections) = match wiring {
            Wiring::Channel => {
                relayer
                    .link_path(PATH_NAME)
                    .await
                    .context("relayer.link_path()")?;
                let channels = relayer
                    .get_channels(&src_id)
                    .await
                    .context("relayer.get_channels()")?;
                anyhow::ensure!(!channels.is_empty(), "no channel was created");
                (channels, vec![])
            }
            Wiring::Connection => {
                relayer
                    .create_connections(PATH_NAME)
                    .await
                    .context("relayer.create_connections()")?;
                let connections = relayer
                    .get_connections(&src_id)
                    .await
                    .context("relayer.get_connections()")?;
                anyhow::ensure!(!connections.is_empty(), "no connection was created");
                (vec![], connections)
            }
        };
        Ok(Context {
            cfg: &self.cfg,
            src,
            dst,
            channels,
            connections,
            src_user,
            dst_user,
        })
    }
}

/// Creates the user key on `home_chain` and derives its addresses on both chains.
async fn create_user(
    home_chain: &dyn Chain,
    src: &dyn Chain,
    dst: &dyn Chain,
) -> anyhow::Result<User> {
    home_chain
        .create_key(USER_KEY)
        .await
        .context("create_key()")?;
    let raw = home_chain
        .get_address(USER_KEY)
        .await
        .context("get_address()")?;
    Ok(User {
        key_name: USER_KEY.to_owned(),
        src_chain_address: bech32::account_address(&src.config().bech32_prefix, &raw)?,
        dst_chain_address: bech32::account_address(&dst.config().bech32_prefix, &raw)?,
    })
}
