//! Consensus identities of nodes, as generated by the node binary.
//! The identity of a node is the key in its `priv_validator_key.json`.
use anyhow::Context as _;
use serde::{Deserialize, Serialize};

/// Public consensus identity of a node, in the literal encoding used by genesis documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    /// Uppercase hex address, i.e. the truncated hash of the public key.
    pub address: String,
    /// Base64 encoded public key.
    pub pub_key: String,
}

/// Typed public key, e.g. `{"type": "tendermint/PubKeyEd25519", "value": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedKey {
    /// Amino type name of the key.
    #[serde(rename = "type")]
    pub key_type: String,
    /// Base64 encoded key.
    pub value: String,
}

/// Contents of `config/priv_validator_key.json`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivValidatorKeyFile {
    /// Uppercase hex address.
    pub address: String,
    /// Public key.
    pub pub_key: TypedKey,
    /// Private key.
    pub priv_key: TypedKey,
}

impl std::fmt::Debug for PrivValidatorKeyFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivValidatorKeyFile")
            .field("address", &self.address)
            .field("pub_key", &self.pub_key)
            .finish_non_exhaustive()
    }
}

impl PrivValidatorKeyFile {
    /// Parses the key file.
    pub fn decode(raw: &[u8]) -> anyhow::Result<Self> {
        serde_json::from_slice(raw).context("priv_validator_key.json")
    }

    /// Serializes the key file the way the node binary writes it.
    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).context("priv_validator_key.json")
    }

    /// Public identity of the key.
    pub fn identity(&self) -> NodeIdentity {
        NodeIdentity {
            address: self.address.clone(),
            pub_key: self.pub_key.value.clone(),
        }
    }
}
