use crate::{
    error::Wrap as _, BootstrapError, NodeHandle, NodeRuntime, NodeSet, OrchestratorConfig, Peer,
    Peers,
};
use anyhow::Context as _;
use ibc_testnet_concurrency::{poll, Group};
use ibc_testnet_crypto::sha256::Sha256;
use ibc_testnet_roles::ChainConfig;
use std::{
    path::Path,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, OnceLock,
    },
};

/// Order in which node containers are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOrder {
    /// One node after another, each fully started before the next one.
    Sequential,
    /// All nodes at once, joined like `Orchestrator::create_all`.
    Concurrent,
}

/// Drives the nodes of a single chain through their lifecycle.
#[derive(Clone)]
pub struct Orchestrator {
    runtime: Arc<dyn NodeRuntime>,
    chain: Arc<ChainConfig>,
    cfg: OrchestratorConfig,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("chain_id", &self.chain.chain_id)
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Constructs an orchestrator for `chain`.
    pub fn new(
        runtime: Arc<dyn NodeRuntime>,
        chain: ChainConfig,
        cfg: OrchestratorConfig,
    ) -> Self {
        Self {
            runtime,
            chain: Arc::new(chain),
            cfg,
        }
    }

    /// Chain the nodes belong to.
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.cfg
    }

    /// Runtime the nodes are run by.
    pub fn runtime(&self) -> &Arc<dyn NodeRuntime> {
        &self.runtime
    }

    /// Creates the home directories of `num_validators + num_full_nodes` nodes under `home`
    /// and pulls the images of the chain.
    ///
    /// Pull failures are only logged: the image may be present locally already, and if it
    /// is not, container creation fails later on anyway.
    pub async fn allocate(
        &self,
        home: &Path,
        test_name: &str,
        num_validators: usize,
        num_full_nodes: usize,
    ) -> Result<NodeSet, BootstrapError> {
        let nodes = NodeSet::new(
            home,
            &self.chain.chain_id,
            test_name,
            num_validators,
            num_full_nodes,
        )?;
        for node in nodes.nodes() {
            tokio::fs::create_dir_all(&node.home)
                .await
                .with_context(|| format!("create_dir_all({:?})", node.home))
                .infra()?;
        }
        for image in &self.chain.images {
            if let Err(err) = self.runtime.pull_image(image).await {
                tracing::error!(image = %image.reference(), "pull_image(): {err:#}");
            }
        }
        tracing::info!(
            chain_id = %self.chain.chain_id,
            validators = num_validators,
            full_nodes = num_full_nodes,
            "allocated nodes"
        );
        Ok(nodes)
    }

    /// Writes `genesis` to every node and logs the hash of every copy.
    /// Must be called before any container is created.
    pub async fn write_genesis(
        &self,
        nodes: &NodeSet,
        genesis: &[u8],
    ) -> Result<(), BootstrapError> {
        for node in nodes.nodes() {
            let path = node.genesis_path();
            tokio::fs::create_dir_all(node.config_dir())
                .await
                .context("create_dir_all()")
                .infra()?;
            tokio::fs::write(&path, genesis)
                .await
                .with_context(|| format!("fs::write({path:?})"))
                .infra()?;
        }
        for node in nodes.nodes() {
            let raw = tokio::fs::read(node.genesis_path())
                .await
                .context("fs::read()")
                .infra()?;
            tracing::info!(node = %node.name, hash = %Sha256::new(&raw), "genesis");
        }
        Ok(())
    }

    /// Creates the containers of all nodes concurrently.
    ///
    /// Waits for all creations to finish, even if some of them fail, and returns the
    /// error of the first one that failed. Containers which were created are kept and
    /// recorded in `nodes`.
    pub async fn create_all(&self, nodes: &mut NodeSet) -> Result<(), BootstrapError> {
        let mut group = Group::new();
        for node in nodes.nodes() {
            let runtime = self.runtime.clone();
            let chain = self.chain.clone();
            let node = node.clone();
            group.spawn(async move {
                runtime
                    .create_container(&chain, &node)
                    .await
                    .with_context(|| format!("create_container({})", node.name))
            });
        }
        let (containers, err) = group.wait().await.into_parts();
        for (index, container) in containers.into_iter().enumerate() {
            if let (Some(container), Some(node)) = (container, nodes.get_mut(index)) {
                tracing::debug!(node = %node.name, container = %container.id, "created container");
                node.container = Some(container);
            }
        }
        match err {
            Some(err) => Err(BootstrapError::Infrastructure(err)),
            None => Ok(()),
        }
    }

    /// Peer addresses of all nodes. Requires all containers to be created.
    pub async fn compute_peers(&self, nodes: &NodeSet) -> Result<Peers, BootstrapError> {
        let mut peers = vec![];
        for node in nodes.nodes() {
            if node.container.is_none() {
                return Err(BootstrapError::Infrastructure(anyhow::format_err!(
                    "node {} has no container",
                    node.name
                )));
            }
            let node_id = self
                .runtime
                .node_id(node)
                .await
                .with_context(|| format!("node_id({})", node.name))
                .infra()?;
            peers.push(Peer {
                index: node.index,
                node_id,
                host: node.hostname().to_owned(),
                port: self.cfg.p2p_port,
            });
        }
        Ok(Peers(peers))
    }

    /// Configures the peers of every node and starts its container.
    /// Every node gets the peer list without its own entry.
    pub async fn inject_peers_and_start(
        &self,
        nodes: &NodeSet,
        peers: &Peers,
        order: StartOrder,
    ) -> Result<(), BootstrapError> {
        match order {
            StartOrder::Sequential => {
                for node in nodes.nodes() {
                    start_node(self.runtime.as_ref(), node, &peers.excluding(node.index))
                        .await
                        .infra()?;
                }
                Ok(())
            }
            StartOrder::Concurrent => {
                let mut group = Group::new();
                for node in nodes.nodes() {
                    let runtime = self.runtime.clone();
                    let node = node.clone();
                    let peers = peers.excluding(node.index);
                    group.spawn(async move { start_node(runtime.as_ref(), &node, &peers).await });
                }
                group.wait().await.into_result().infra()?;
                Ok(())
            }
        }
    }

    /// Waits until the relayer node has advanced `blocks` blocks past the height it
    /// reports when this method is called. Returns the height reached.
    ///
    /// If the node does not answer that first query, the first height it reports while
    /// polling becomes the baseline instead.
    pub async fn wait_liveness(
        &self,
        nodes: &NodeSet,
        blocks: u64,
    ) -> Result<u64, BootstrapError> {
        let node = nodes.relayer_node();
        let runtime = self.runtime.as_ref();
        let start = &OnceLock::new();
        match runtime.height(node).await {
            Ok(height) => {
                let _ = start.set(height);
            }
            Err(err) => tracing::debug!(node = %node.name, "height(): {err:#}"),
        }
        let observed = &AtomicU64::new(0);
        let timeout = self.cfg.liveness_timeout();
        let res = poll(self.cfg.liveness_poll_interval(), timeout, move || async move {
            let height = runtime.height(node).await?;
            let start = *start.get_or_init(|| height);
            let advanced = height.saturating_sub(start);
            observed.store(advanced, Ordering::Relaxed);
            Ok((advanced >= blocks).then_some(height))
        })
        .await;
        match res {
            Ok(height) => {
                tracing::info!(chain_id = %self.chain.chain_id, height, "chain is live");
                Ok(height)
            }
            Err(source) => Err(BootstrapError::LivenessTimeout {
                blocks,
                observed: observed.load(Ordering::Relaxed),
                timeout,
                source,
            }),
        }
    }
}

async fn start_node(
    runtime: &dyn NodeRuntime,
    node: &NodeHandle,
    peers: &str,
) -> anyhow::Result<()> {
    runtime
        .set_validator_config_and_peers(node, peers)
        .await
        .with_context(|| format!("set_validator_config_and_peers({})", node.name))?;
    tracing::info!(node = %node.name, "starting container");
    runtime
        .start_container(node)
        .await
        .with_context(|| format!("start_container({})", node.name))
}
