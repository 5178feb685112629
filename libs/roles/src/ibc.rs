//! Wallets, transactions and IBC objects exchanged with the chains and the relayer.
use serde::{Deserialize, Serialize};

/// Amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination.
    pub denom: String,
    /// Amount.
    pub amount: i64,
}

impl Coin {
    /// Constructs a coin.
    pub fn new(amount: i64, denom: &str) -> Self {
        Self {
            denom: denom.to_owned(),
            amount,
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Amount of a denomination held by, or to be sent to, an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAmount {
    /// Bech32 address of the wallet.
    pub address: String,
    /// Denomination.
    pub denom: String,
    /// Amount.
    pub amount: i64,
}

impl WalletAmount {
    /// The amount as a coin, without the address.
    pub fn coin(&self) -> Coin {
        Coin::new(self.amount, &self.denom)
    }
}

/// Timeout of an IBC packet. Zero disables the respective timeout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcTimeout {
    /// Number of blocks, relative to the latest height of the counterparty chain.
    pub height: u64,
    /// Nanoseconds, relative to the latest block time of the counterparty chain.
    pub nano_seconds: u64,
}

impl IbcTimeout {
    /// Timeout which never expires.
    pub const DISABLED: Self = Self {
        height: 0,
        nano_seconds: 0,
    };
}

/// User with a key on one chain and addresses derived from it on both chains of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Name of the key in the keyring of the chain it was created on.
    pub key_name: String,
    /// Address on the source chain.
    pub src_chain_address: String,
    /// Address on the destination chain.
    pub dst_chain_address: String,
}

/// Remote end of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCounterparty {
    /// Port identifier, e.g. `transfer`.
    pub port_id: String,
    /// Channel identifier, e.g. `channel-0`.
    pub channel_id: String,
}

/// Channel as reported by the relayer for one of the chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOutput {
    /// Channel state, e.g. `STATE_OPEN`.
    pub state: String,
    /// Channel ordering, e.g. `ORDER_UNORDERED`.
    pub ordering: String,
    /// Remote end of the channel.
    pub counterparty: ChannelCounterparty,
    /// Connections the channel is built on.
    pub connection_hops: Vec<String>,
    /// Application version.
    pub version: String,
    /// Local port identifier.
    pub port_id: String,
    /// Local channel identifier.
    pub channel_id: String,
}

/// Connection as reported by the relayer for one of the chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOutput {
    /// Connection identifier, e.g. `connection-0`.
    pub id: String,
    /// Client the connection is built on.
    pub client_id: String,
    /// Connection state, e.g. `STATE_OPEN`.
    pub state: String,
}

/// Transaction as returned by a transaction-by-hash lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    /// Transaction hash.
    pub tx_hash: String,
    /// Height of the block the transaction was included in.
    pub height: u64,
    /// Gas limit of the transaction. Fees are charged on this amount.
    pub gas_wanted: i64,
    /// Gas actually consumed.
    pub gas_used: i64,
    /// Raw response of the node, for diagnostics.
    pub raw: String,
}

/// Raw key-value state of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpContractStateResponse {
    /// Entries of the contract store.
    pub models: Vec<ContractStateModel>,
}

/// Single entry of a contract store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStateModel {
    /// Hex encoded key.
    pub key: String,
    /// Base64 encoded value.
    pub value: String,
}
