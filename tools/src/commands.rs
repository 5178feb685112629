//! Offline operations exposed by the command line.
use anyhow::Context as _;
use ibc_testnet_genesis::{GenesisDocument, Quorum};
use ibc_testnet_roles::{NodeIdentity, PrivValidatorKeyFile};
use serde::Serialize;
use std::{fs, path::Path};

/// Reads consensus key files, as written by the node binary, in the given order.
pub fn read_identities(paths: &[impl AsRef<Path>]) -> anyhow::Result<Vec<NodeIdentity>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let raw = fs::read(path).with_context(|| format!("fs::read({path:?})"))?;
            let key = PrivValidatorKeyFile::decode(&raw).with_context(|| format!("{path:?}"))?;
            Ok(key.identity())
        })
        .collect()
}

/// Hands the quorum of `reference` over to the consensus keys at `key_files`.
pub fn patch_genesis(
    reference: Vec<u8>,
    key_files: &[impl AsRef<Path>],
    bech32_prefix: &str,
) -> anyhow::Result<Vec<u8>> {
    let doc = GenesisDocument::parse(reference)?;
    let identities = read_identities(key_files)?;
    let patched =
        ibc_testnet_genesis::build(doc.raw(), doc.validators(), &identities, bech32_prefix)?;
    tracing::info!(reference = %doc.hash(), validators = identities.len(), "patched genesis");
    Ok(patched)
}

/// Quorum of a genesis document, as printed by the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuorumReport {
    /// Number of validators in the document.
    pub validators: usize,
    /// Total voting power, as a decimal string.
    pub total_power: String,
    /// Power the quorum has to exceed, as a decimal string.
    pub threshold: String,
    /// Validators to take over, by descending power.
    pub selected: Vec<SelectedValidator>,
}

/// Validator of a `QuorumReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedValidator {
    /// Hex address.
    pub address: String,
    /// Voting power.
    pub power: u64,
}

impl QuorumReport {
    /// Computes the report for a genesis document.
    pub fn new(genesis: &[u8]) -> anyhow::Result<Self> {
        let validators = ibc_testnet_genesis::parse_validators(genesis)?;
        let quorum = Quorum::new(&validators)?;
        Ok(Self {
            validators: validators.len(),
            total_power: quorum.total_power.to_string(),
            threshold: quorum.threshold.to_string(),
            selected: quorum
                .selected()
                .iter()
                .map(|v| SelectedValidator {
                    address: v.address.clone(),
                    power: v.power,
                })
                .collect(),
        })
    }
}
