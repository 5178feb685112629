//! Relay scenarios built into the engine.
use crate::{Context, Delta, Scenario, ScenarioError, Wiring};
use anyhow::Context as _;
use ibc_testnet_crypto::denom::ibc_denom;
use ibc_testnet_roles::{Chain, IbcTimeout, WalletAmount};
use std::time::Duration;

/// Timeout attached to the packets of a `Transfer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Whatever the node binary uses when no timeout is given.
    Default,
    /// Both timeouts disabled.
    Disabled,
    /// Relative height timeout. The counterparty produces `wait_blocks` blocks before
    /// the relayer starts, so that the packet expires.
    Height {
        /// Relative timeout height.
        blocks: u64,
        /// Blocks to wait for on the counterparty.
        wait_blocks: u64,
    },
    /// Relative timestamp timeout. `sleep` passes before the relayer starts,
    /// so that the packet expires.
    Timestamp {
        /// Relative timeout.
        timeout: Duration,
        /// Time to let pass.
        sleep: Duration,
    },
}

impl TimeoutPolicy {
    /// Timeout to submit the packet with.
    pub fn ibc_timeout(&self) -> Option<IbcTimeout> {
        match *self {
            Self::Default => None,
            Self::Disabled => Some(IbcTimeout::DISABLED),
            Self::Height { blocks, .. } => Some(IbcTimeout {
                height: blocks,
                nano_seconds: 0,
            }),
            Self::Timestamp { timeout, .. } => Some(IbcTimeout {
                height: 0,
                nano_seconds: u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Whether the packet is expected to expire before it is relayed.
    pub fn expires(&self) -> bool {
        matches!(self, Self::Height { .. } | Self::Timestamp { .. })
    }

    /// Lets the timeout of a packet received by `dst` expire.
    async fn expire(&self, dst: &dyn Chain) -> anyhow::Result<()> {
        match *self {
            Self::Height { wait_blocks, .. } => {
                let height = dst.wait_for_blocks(wait_blocks).await?;
                tracing::info!(height, "height timeout expired");
            }
            Self::Timestamp { sleep, .. } => {
                tokio::time::sleep(sleep).await;
                tracing::info!(?sleep, "timestamp timeout expired");
            }
            Self::Default | Self::Disabled => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// From the source chain to the destination chain.
    Forward,
    /// From the destination chain back to the source chain.
    Reverse,
}

/// Transfer submitted, with everything needed to check its outcome.
#[derive(Debug)]
struct PendingTransfer {
    direction: Direction,
    tx_hash: String,
    amount: i64,
    sender: String,
    sender_denom: String,
    sender_initial: i64,
    receiver: String,
    receiver_denom: String,
    receiver_initial: i64,
}

impl PendingTransfer {
    /// Records the balances of both ends and submits the transfer.
    async fn send(
        ctx: &Context<'_>,
        direction: Direction,
        amount: i64,
        timeout: Option<IbcTimeout>,
    ) -> anyhow::Result<Self> {
        let channel = ctx.channel()?;
        let (sending, receiving) = ends(ctx, direction);
        let sender_denom = sending.config().denom.clone();
        let (user, sender, receiver, channel_id, receiver_denom) = match direction {
            Direction::Forward => (
                &ctx.src_user,
                &ctx.src_user.src_chain_address,
                &ctx.src_user.dst_chain_address,
                &channel.channel_id,
                ibc_denom(
                    &channel.counterparty.port_id,
                    &channel.counterparty.channel_id,
                    &sender_denom,
                ),
            ),
            Direction::Reverse => (
                &ctx.dst_user,
                &ctx.dst_user.dst_chain_address,
                &ctx.dst_user.src_chain_address,
                &channel.counterparty.channel_id,
                ibc_denom(&channel.port_id, &channel.channel_id, &sender_denom),
            ),
        };

        let sender_initial = sending
            .get_balance(sender, &sender_denom)
            .await
            .context("get_balance()")?;
        // The receiver has no account before its first transfer.
        let receiver_initial = match receiving.get_balance(receiver, &receiver_denom).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::debug!(%receiver, "get_balance(): {err:#}");
                0
            }
        };

        let tx_hash = sending
            .send_ibc_transfer(
                channel_id,
                &user.key_name,
                &WalletAmount {
                    address: receiver.clone(),
                    denom: sender_denom.clone(),
                    amount,
                },
                timeout,
            )
            .await
            .context("send_ibc_transfer()")?;
        tracing::info!(?direction, %tx_hash, %channel_id, amount, "sent transfer");
        Ok(Self {
            direction,
            tx_hash,
            amount,
            sender: sender.clone(),
            sender_denom,
            sender_initial,
            receiver: receiver.clone(),
            receiver_denom,
            receiver_initial,
        })
    }

    /// Checks the balances of both ends against the expected outcome.
    async fn check(&self, ctx: &Context<'_>, expired: bool) -> Result<(), ScenarioError> {
        let (sending, receiving) = ends(ctx, self.direction);
        let tx = sending
            .get_transaction(&self.tx_hash)
            .await
            .context("get_transaction()")?;
        let fees = sending.gas_fees_in_native_denom(tx.gas_wanted)?;
        let delta = if expired {
            Delta::timed_out(fees)
        } else {
            Delta::relayed(self.amount, fees)
        };
        let sender_final = sending
            .get_balance(&self.sender, &self.sender_denom)
            .await
            .context("get_balance()")?;
        let receiver_final = receiving
            .get_balance(&self.receiver, &self.receiver_denom)
            .await
            .context("get_balance()")?;
        tracing::info!(
            direction = ?self.direction,
            fees,
            sender_final,
            receiver_final,
            "transfer outcome"
        );
        delta.check(
            (self.sender_initial, sender_final),
            (self.receiver_initial, receiver_final),
        )?;
        Ok(())
    }
}

fn ends<'a>(ctx: &Context<'a>, direction: Direction) -> (&'a dyn Chain, &'a dyn Chain) {
    match direction {
        Direction::Forward => (ctx.src, ctx.dst),
        Direction::Reverse => (ctx.dst, ctx.src),
    }
}

/// Single transfer from the source chain to the destination chain.
#[derive(Debug)]
pub struct Transfer {
    name: String,
    policy: TimeoutPolicy,
    amount: i64,
    relay_wait_blocks: u64,
    pending: Option<PendingTransfer>,
}

impl Transfer {
    /// Transfer of `amount` with the given timeout, checked after the chains produced
    /// `relay_wait_blocks` blocks with the relayer running.
    pub fn new(name: &str, policy: TimeoutPolicy, amount: i64, relay_wait_blocks: u64) -> Self {
        Self {
            name: name.to_owned(),
            policy,
            amount,
            relay_wait_blocks,
            pending: None,
        }
    }
}

#[async_trait::async_trait]
impl Scenario for Transfer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pre_relay(&mut self, ctx: &Context<'_>) -> anyhow::Result<()> {
        self.pending = Some(
            PendingTransfer::send(ctx, Direction::Forward, self.amount, self.policy.ibc_timeout())
                .await?,
        );
        self.policy.expire(ctx.dst).await
    }

    async fn relay_wait(&mut self, ctx: &Context<'_>) -> anyhow::Result<()> {
        ctx.wait_for_blocks(self.relay_wait_blocks).await
    }

    async fn assert(&mut self, ctx: &Context<'_>) -> Result<(), ScenarioError> {
        let pending = self.pending.as_ref().context("no transfer was sent")?;
        pending.check(ctx, self.policy.expires()).await
    }
}

/// Transfer from the source chain, relayed, followed by a transfer back from the
/// destination chain, relayed as well.
#[derive(Debug)]
pub struct BidirectionalTransfer {
    amount: i64,
    relay_wait_blocks: u64,
    forward: Option<PendingTransfer>,
    reverse: Option<PendingTransfer>,
}

impl BidirectionalTransfer {
    /// Transfers of `amount` in both directions, each given `relay_wait_blocks` blocks.
    pub fn new(amount: i64, relay_wait_blocks: u64) -> Self {
        Self {
            amount,
            relay_wait_blocks,
            forward: None,
            reverse: None,
        }
    }
}

#[async_trait::async_trait]
impl Scenario for BidirectionalTransfer {
    fn name(&self) -> &str {
        "bidirectional transfer"
    }

    async fn pre_relay(&mut self, ctx: &Context<'_>) -> anyhow::Result<()> {
        let forward = PendingTransfer::send(ctx, Direction::Forward, self.amount, None).await?;
        self.forward = Some(forward);
        Ok(())
    }

    async fn relay_wait(&mut self, ctx: &Context<'_>) -> anyhow::Result<()> {
        ctx.wait_for_blocks(self.relay_wait_blocks).await?;
        let reverse = PendingTransfer::send(ctx, Direction::Reverse, self.amount, None).await?;
        self.reverse = Some(reverse);
        ctx.wait_for_blocks(self.relay_wait_blocks).await
    }

    async fn assert(&mut self, ctx: &Context<'_>) -> Result<(), ScenarioError> {
        for pending in [&self.forward, &self.reverse] {
            let pending = pending.as_ref().context("transfer was not sent")?;
            pending.check(ctx, false).await?;
        }
        Ok(())
    }
}

/// Registers an interchain account of the source user on the destination chain and
/// moves funds to it.
#[derive(Debug)]
pub struct InterchainAccountTransfer {
    amount: i64,
    wait_blocks: u64,
    initial: Option<(i64, i64)>,
}

impl InterchainAccountTransfer {
    /// Transfer of `amount`, with `wait_blocks` blocks for the registration and
    /// for the transfer to complete.
    pub fn new(amount: i64, wait_blocks: u64) -> Self {
        Self {
            amount,
            wait_blocks,
            initial: None,
        }
    }

    /// Balances of the source user on both chains, in the source denomination.
    async fn balances(ctx: &Context<'_>) -> anyhow::Result<(i64, i64)> {
        let denom = &ctx.src.config().denom;
        let src = ctx
            .src
            .get_balance(&ctx.src_user.src_chain_address, denom)
            .await
            .context("get_balance()")?;
        let dst = match ctx.dst.get_balance(&ctx.src_user.dst_chain_address, denom).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::debug!("get_balance(): {err:#}");
                0
            }
        };
        Ok((src, dst))
    }
}

#[async_trait::async_trait]
impl Scenario for InterchainAccountTransfer {
    fn name(&self) -> &str {
        "interchain account transfer"
    }

    fn wiring(&self) -> Wiring {
        Wiring::Connection
    }

    async fn pre_relay(&mut self, ctx: &Context<'_>) -> anyhow::Result<()> {
        self.initial = Some(Self::balances(ctx).await?);
        let connection = ctx.connection()?;
        let tx_hash = ctx
            .src
            .register_interchain_account(&ctx.src_user.src_chain_address, &connection.id)
            .await
            .context("register_interchain_account()")?;
        tracing::info!(%tx_hash, connection = %connection.id, "registering interchain account");
        Ok(())
    }

    async fn relay_wait(&mut self, ctx: &Context<'_>) -> anyhow::Result<()> {
        let connection = ctx.connection()?;
        let owner = &ctx.src_user.src_chain_address;
        ctx.wait_for_blocks(self.wait_blocks).await?;
        let ica = ctx
            .src
            .query_interchain_account(&connection.id, owner)
            .await
            .context("query_interchain_account()")?;
        tracing::info!(%ica, "interchain account registered");
        ctx.src
            .send_ica_bank_transfer(
                &connection.id,
                owner,
                &ica,
                &ctx.src.config().denom,
                self.amount,
            )
            .await
            .context("send_ica_bank_transfer()")?;
        ctx.wait_for_blocks(self.wait_blocks).await
    }

    async fn assert(&mut self, ctx: &Context<'_>) -> Result<(), ScenarioError> {
        let (src_initial, dst_initial) = self.initial.context("balances were not recorded")?;
        let (src_final, dst_final) = Self::balances(ctx).await?;
        Delta::interchain_account(self.amount).check(
            (src_initial, src_final),
            (dst_initial, dst_final),
        )?;
        Ok(())
    }
}
