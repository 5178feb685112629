//! Structural view of a genesis document. Only used for reading.
use crate::GenesisError;
use ibc_testnet_crypto::sha256::Sha256;
use ibc_testnet_roles::{TypedKey, ValidatorRecord};
use serde::Deserialize;

#[derive(Deserialize)]
struct Validator {
    address: String,
    power: serde_json::Value,
    pub_key: TypedKey,
}

#[derive(Deserialize)]
struct Consensus {
    #[serde(default)]
    validators: Option<Vec<Validator>>,
}

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    validators: Option<Vec<Validator>>,
    #[serde(default)]
    consensus: Option<Consensus>,
}

/// Parses the validator list of a genesis document, in document order.
///
/// The list is read from the top-level `validators` field, or from
/// `consensus.validators` for documents exported by newer SDK versions.
pub fn parse_validators(raw: &[u8]) -> Result<Vec<ValidatorRecord>, GenesisError> {
    let doc: Document =
        serde_json::from_slice(raw).map_err(|err| GenesisError::InvalidDocument(err.to_string()))?;
    let validators = doc
        .validators
        .or_else(|| doc.consensus.and_then(|c| c.validators))
        .ok_or_else(|| GenesisError::InvalidDocument("missing validators".to_owned()))?;
    validators
        .into_iter()
        .map(|v| {
            let power = match &v.power {
                serde_json::Value::String(s) => s.parse().ok(),
                serde_json::Value::Number(n) => n.as_u64(),
                _ => None,
            }
            .ok_or_else(|| GenesisError::InvalidPower {
                address: v.address.clone(),
                power: match &v.power {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })?;
            Ok(ValidatorRecord {
                address: v.address,
                power,
                pub_key: v.pub_key.value,
            })
        })
        .collect()
}

/// Raw genesis bytes together with the validators parsed out of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisDocument {
    raw: Vec<u8>,
    validators: Vec<ValidatorRecord>,
}

impl GenesisDocument {
    /// Parses a document, keeping its bytes untouched.
    pub fn parse(raw: Vec<u8>) -> Result<Self, GenesisError> {
        let validators = parse_validators(&raw)?;
        Ok(Self { raw, validators })
    }

    /// The document bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Validators, in document order.
    pub fn validators(&self) -> &[ValidatorRecord] {
        &self.validators
    }

    /// Hash of the document bytes, as logged for every node copy.
    pub fn hash(&self) -> Sha256 {
        Sha256::new(&self.raw)
    }
}
