//! Nodes of a chain under test.
use crate::BootstrapError;
use ibc_testnet_roles::NodeRole;
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

/// P2P port of a node inside the container network.
pub const P2P_PORT: u16 = 26656;
/// RPC port of a node inside the container network.
pub const RPC_PORT: u16 = 26657;
/// gRPC port of a node inside the container network.
pub const GRPC_PORT: u16 = 9090;

/// Container running a node, as reported by the runtime on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Runtime identifier of the container.
    pub id: String,
    /// Hostname of the container in the container network.
    pub hostname: String,
    /// Host addresses (`host:port`) the container ports are published on.
    pub host_ports: BTreeMap<u16, String>,
}

/// Single node of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeHandle {
    /// Position within the `NodeSet`.
    pub index: usize,
    /// Role, derived from the position.
    pub role: NodeRole,
    /// Name of the node, also used as the container name.
    pub name: String,
    /// Home directory of the node binary, mounted into the container.
    pub home: PathBuf,
    /// Set once the container is created.
    pub container: Option<Container>,
}

impl NodeHandle {
    /// `node-<index>-<chain_id>-<test_name>`.
    pub fn name(index: usize, chain_id: &str, test_name: &str) -> String {
        format!("node-{index}-{chain_id}-{test_name}")
    }

    /// Directory with the configuration files of the node.
    pub fn config_dir(&self) -> PathBuf {
        self.home.join("config")
    }

    /// Path of the genesis document.
    pub fn genesis_path(&self) -> PathBuf {
        self.config_dir().join("genesis.json")
    }

    /// Path of the consensus key of the node.
    pub fn priv_validator_key_path(&self) -> PathBuf {
        self.config_dir().join("priv_validator_key.json")
    }

    /// Directory with the genesis transactions collected into genesis.
    pub fn gentx_dir(&self) -> PathBuf {
        self.config_dir().join("gentx")
    }

    /// Path of the genesis transaction of the node with the given p2p id.
    pub fn gentx_path(&self, node_id: &str) -> PathBuf {
        self.gentx_dir().join(format!("gentx-{node_id}.json"))
    }

    /// Hostname of the node in the container network.
    pub fn hostname(&self) -> &str {
        self.container
            .as_ref()
            .map_or(self.name.as_str(), |c| c.hostname.as_str())
    }

    /// Host address a container port is published on, if any.
    pub fn host_port(&self, port: u16) -> Option<&str> {
        self.container
            .as_ref()
            .and_then(|c| c.host_ports.get(&port))
            .map(String::as_str)
    }
}

/// Nodes of a chain. The first `num_validators` nodes are validators, the rest are full nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet {
    nodes: Vec<NodeHandle>,
    num_validators: usize,
}

impl NodeSet {
    /// Lays out `num_validators + num_full_nodes` nodes with their homes under `home`.
    /// Nothing is created on disk.
    pub fn new(
        home: &Path,
        chain_id: &str,
        test_name: &str,
        num_validators: usize,
        num_full_nodes: usize,
    ) -> Result<Self, BootstrapError> {
        if num_validators == 0 {
            return Err(BootstrapError::Config(anyhow::format_err!(
                "chain {chain_id} needs at least one validator"
            )));
        }
        let nodes = (0..num_validators + num_full_nodes)
            .map(|index| {
                let name = NodeHandle::name(index, chain_id, test_name);
                NodeHandle {
                    index,
                    role: NodeRole::at(index, num_validators),
                    home: home.join(&name),
                    name,
                    container: None,
                }
            })
            .collect();
        Ok(Self {
            nodes,
            num_validators,
        })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false, a `NodeSet` has at least one validator.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, by index.
    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// Node at `index`.
    pub fn get(&self, index: usize) -> Option<&NodeHandle> {
        self.nodes.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut NodeHandle> {
        self.nodes.get_mut(index)
    }

    /// Validators, by index.
    pub fn validators(&self) -> &[NodeHandle] {
        &self.nodes[..self.num_validators]
    }

    /// Full nodes, by index.
    pub fn full_nodes(&self) -> &[NodeHandle] {
        &self.nodes[self.num_validators..]
    }

    /// Node the relayer and the tests talk to: the first full node if there is one,
    /// the first validator otherwise.
    pub fn relayer_node(&self) -> &NodeHandle {
        self.full_nodes().first().unwrap_or(&self.nodes[0])
    }

    /// Number of nodes with a container.
    pub fn containers(&self) -> usize {
        self.nodes.iter().filter(|n| n.container.is_some()).count()
    }
}

/// Address of a node in the p2p network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// Index of the node in its `NodeSet`.
    pub index: usize,
    /// P2P id of the node.
    pub node_id: String,
    /// Hostname of the node.
    pub host: String,
    /// P2P port.
    pub port: u16,
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.node_id, self.host, self.port)
    }
}

/// All nodes of a chain as p2p peers. Renders as the comma separated `id@host:port` list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Peers(pub Vec<Peer>);

impl Peers {
    /// The peer list as seen by the node at `index`, i.e. without its own entry.
    pub fn excluding(&self, index: usize) -> String {
        join(self.0.iter().filter(|p| p.index != index))
    }
}

impl fmt::Display for Peers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(self.0.iter()))
    }
}

fn join<'a>(peers: impl Iterator<Item = &'a Peer>) -> String {
    peers.map(Peer::to_string).collect::<Vec<_>>().join(",")
}
