//! Configuration of a test network.
use anyhow::Context as _;
use ibc_testnet_orchestrator::OrchestratorConfig;
use ibc_testnet_relay::ScenarioConfig;
use ibc_testnet_roles::ChainConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Decodes a value from json, rejecting trailing data.
pub fn decode_json<T: serde::de::DeserializeOwned>(json: &str) -> anyhow::Result<T> {
    let mut d = serde_json::Deserializer::from_str(json);
    let p = T::deserialize(&mut d)?;
    d.end()?;
    Ok(p)
}

/// Encodes a value as pretty-printed json.
pub fn encode_json<T: Serialize>(x: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(x)?)
}

fn default_num_validators() -> usize {
    1
}

/// Two chains to connect and how to run them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chain the packets under test originate from.
    pub src: ChainConfig,
    /// Counterparty chain.
    pub dst: ChainConfig,
    /// Validators per chain.
    #[serde(default = "default_num_validators")]
    pub num_validators: usize,
    /// Full nodes per chain.
    #[serde(default)]
    pub num_full_nodes: usize,
    /// Node lifecycle settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    /// Relay scenario settings.
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl AppConfig {
    /// Configuration connecting `src` and `dst` with a single validator each.
    pub fn default_for(src: ChainConfig, dst: ChainConfig) -> Self {
        Self {
            src,
            dst,
            num_validators: default_num_validators(),
            num_full_nodes: 0,
            orchestrator: OrchestratorConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.num_validators > 0, "at least one validator is required");
        anyhow::ensure!(
            self.src.chain_id != self.dst.chain_id,
            "both chains have chain id {:?}",
            self.src.chain_id
        );
        for chain in [&self.src, &self.dst] {
            anyhow::ensure!(
                chain.chain_type == "cosmos",
                "chain {}: unsupported type {:?}",
                chain.chain_id,
                chain.chain_type
            );
            anyhow::ensure!(!chain.images.is_empty(), "chain {}: no image", chain.chain_id);
            chain
                .gas_price()
                .with_context(|| format!("chain {}", chain.chain_id))?;
        }
        anyhow::ensure!(
            self.scenario.transfer_amount > 0 && self.scenario.ica_transfer_amount > 0,
            "transfer amounts have to be positive"
        );
        Ok(())
    }
}

/// Paths of the files the tools read.
#[derive(Debug)]
pub struct ConfigPaths<'a> {
    /// Json file with the `AppConfig`.
    pub config: &'a Path,
}

impl ConfigPaths<'_> {
    /// Reads and validates the configuration.
    #[tracing::instrument(level = "trace", ret)]
    pub fn read(&self) -> anyhow::Result<AppConfig> {
        let raw = fs::read_to_string(self.config)
            .with_context(|| format!("fs::read_to_string({:?})", self.config))?;
        let cfg: AppConfig = decode_json(&raw).context("decode_json()")?;
        cfg.validate()?;
        Ok(cfg)
    }
}
