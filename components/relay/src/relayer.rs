use ibc_testnet_roles::{ChainConfig, ChannelOutput, ConnectionOutput};

/// IBC relayer process, as seen by the scenario engine.
#[async_trait::async_trait]
pub trait Relayer: Send + Sync {
    /// Registers a chain and the node endpoints to reach it by.
    async fn add_chain_configuration(
        &self,
        chain: &ChainConfig,
        rpc_address: &str,
        grpc_address: &str,
    ) -> anyhow::Result<()>;

    /// Creates a key for a chain in the relayer keyring. Returns its bech32 address.
    async fn add_key(&self, chain_id: &str, key_name: &str) -> anyhow::Result<String>;

    /// Declares a path between two registered chains.
    async fn generate_path(
        &self,
        src_chain_id: &str,
        dst_chain_id: &str,
        path_name: &str,
    ) -> anyhow::Result<()>;

    /// Creates clients, a connection and a transfer channel along a path.
    async fn link_path(&self, path_name: &str) -> anyhow::Result<()>;

    /// Creates clients and a connection along a path, without channels.
    async fn create_connections(&self, path_name: &str) -> anyhow::Result<()>;

    /// Channels of a chain.
    async fn get_channels(&self, chain_id: &str) -> anyhow::Result<Vec<ChannelOutput>>;

    /// Connections of a chain.
    async fn get_connections(&self, chain_id: &str) -> anyhow::Result<Vec<ConnectionOutput>>;

    /// Starts relaying packets along a path.
    async fn start(&self, path_name: &str) -> anyhow::Result<()>;

    /// Stops relaying.
    async fn stop(&self) -> anyhow::Result<()>;
}
