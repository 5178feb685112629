//! Bootstrapping a chain out of the orchestrator steps.
use crate::{error::Wrap as _, BootstrapError, NodeSet, Orchestrator, StartOrder};
use anyhow::Context as _;
use ibc_testnet_concurrency::Group;
use ibc_testnet_crypto::bech32;
use ibc_testnet_genesis::GenesisDocument;
use ibc_testnet_roles::{Coin, PrivValidatorKeyFile, WalletAmount};

/// Name of the validator key in the keyring of every validator node.
pub const VALIDATOR_KEY: &str = "validator";
/// Denomination of the staking token of chains built from scratch.
pub const STAKE_DENOM: &str = "stake";
/// Native tokens given to every validator account in genesis.
pub const GENESIS_ACCOUNT_NATIVE_AMOUNT: i64 = 1_000_000_000_000;
/// Staking tokens given to every validator account in genesis.
pub const GENESIS_ACCOUNT_STAKE_AMOUNT: i64 = 1_000_000_000_000;
/// Staking tokens every validator delegates to itself in its gentx.
pub const SELF_DELEGATION_AMOUNT: i64 = 100_000_000_000;

impl Orchestrator {
    /// Starts `nodes` from a reference genesis document, e.g. one exported from a live network.
    ///
    /// The validators of the document holding more than two thirds of the voting power are
    /// taken over by the validator nodes. Nodes are started one by one, since the remaining
    /// validators of the document never come up.
    pub async fn bootstrap_from_genesis(
        &self,
        nodes: &mut NodeSet,
        reference: Vec<u8>,
    ) -> Result<u64, BootstrapError> {
        let reference = GenesisDocument::parse(reference)?;
        let mut identities = vec![];
        for node in nodes.nodes() {
            self.runtime()
                .init_home(self.chain(), node)
                .await
                .with_context(|| format!("init_home({})", node.name))
                .infra()?;
            let raw = tokio::fs::read(node.priv_validator_key_path())
                .await
                .with_context(|| format!("fs::read({:?})", node.priv_validator_key_path()))
                .infra()?;
            let key = PrivValidatorKeyFile::decode(&raw).infra()?;
            if node.role.is_validator() {
                identities.push(key.identity());
            }
        }
        let genesis = ibc_testnet_genesis::build(
            reference.raw(),
            reference.validators(),
            &identities,
            &self.chain().bech32_prefix,
        )?;
        self.write_genesis(nodes, &genesis).await?;
        self.create_all(nodes).await?;
        let peers = self.compute_peers(nodes).await?;
        self.inject_peers_and_start(nodes, &peers, StartOrder::Sequential)
            .await?;
        self.wait_liveness(nodes, self.config().bootstrap_blocks).await
    }

    /// Starts `nodes` from a fresh genesis document with one gentx per validator node.
    /// `additional_wallets` are funded in genesis.
    pub async fn bootstrap_from_scratch(
        &self,
        nodes: &mut NodeSet,
        additional_wallets: &[WalletAmount],
    ) -> Result<u64, BootstrapError> {
        let genesis_amounts = [
            Coin::new(GENESIS_ACCOUNT_NATIVE_AMOUNT, &self.chain().denom),
            Coin::new(GENESIS_ACCOUNT_STAKE_AMOUNT, STAKE_DENOM),
        ];
        let self_delegation = Coin::new(SELF_DELEGATION_AMOUNT, STAKE_DENOM);

        let mut group = Group::new();
        for node in nodes.nodes() {
            let runtime = self.runtime().clone();
            let chain = self.chain().clone();
            let node = node.clone();
            let genesis_amounts = genesis_amounts.clone();
            let self_delegation = self_delegation.clone();
            group.spawn(async move {
                if node.role.is_validator() {
                    runtime
                        .init_validator_files(&chain, &node, &genesis_amounts, &self_delegation)
                        .await
                        .with_context(|| format!("init_validator_files({})", node.name))
                } else {
                    runtime
                        .init_full_node_files(&chain, &node)
                        .await
                        .with_context(|| format!("init_full_node_files({})", node.name))
                }
            });
        }
        group.wait().await.into_result().infra()?;

        let first = &nodes.validators()[0];
        for node in &nodes.validators()[1..] {
            let raw = self
                .runtime()
                .key_address(node, VALIDATOR_KEY)
                .await
                .with_context(|| format!("key_address({})", node.name))
                .infra()?;
            let address = bech32::account_address(&self.chain().bech32_prefix, &raw).infra()?;
            self.runtime()
                .add_genesis_account(first, &address, &genesis_amounts)
                .await
                .context("add_genesis_account()")
                .infra()?;
            let node_id = self
                .runtime()
                .node_id(node)
                .await
                .with_context(|| format!("node_id({})", node.name))
                .infra()?;
            tokio::fs::create_dir_all(first.gentx_dir())
                .await
                .context("create_dir_all()")
                .infra()?;
            let (from, to) = (node.gentx_path(&node_id), first.gentx_path(&node_id));
            tokio::fs::rename(&from, &to)
                .await
                .with_context(|| format!("fs::rename({from:?}, {to:?})"))
                .infra()?;
        }
        for wallet in additional_wallets {
            self.runtime()
                .add_genesis_account(first, &wallet.address, &[wallet.coin()])
                .await
                .with_context(|| format!("add_genesis_account({})", wallet.address))
                .infra()?;
        }
        self.runtime()
            .collect_gentxs(first)
            .await
            .context("collect_gentxs()")
            .infra()?;
        let genesis = tokio::fs::read(first.genesis_path())
            .await
            .context("fs::read()")
            .infra()?;

        self.write_genesis(nodes, &genesis).await?;
        self.create_all(nodes).await?;
        let peers = self.compute_peers(nodes).await?;
        self.inject_peers_and_start(nodes, &peers, StartOrder::Concurrent)
            .await?;
        self.wait_liveness(nodes, self.config().bootstrap_blocks).await
    }
}
