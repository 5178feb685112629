use ibc_testnet_concurrency::Timeout;
use ibc_testnet_genesis::GenesisError;
use std::time::Duration;

/// Errors returned while bootstrapping a chain.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Malformed chain or genesis input.
    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),
    /// The requested nodes cannot control two thirds of the voting power.
    #[error(transparent)]
    ConsensusBootstrap(GenesisError),
    /// Container runtime, filesystem or network failure.
    #[error("infrastructure failure: {0:#}")]
    Infrastructure(anyhow::Error),
    /// The chain didn't produce the expected number of blocks in time.
    #[error("chain advanced {observed} of {blocks} blocks within {timeout:?}: {source}")]
    LivenessTimeout {
        /// Blocks to wait for.
        blocks: u64,
        /// Blocks observed before the timeout.
        observed: u64,
        /// Time budget.
        timeout: Duration,
        /// Polling error.
        source: Timeout,
    },
}

impl From<GenesisError> for BootstrapError {
    fn from(err: GenesisError) -> Self {
        if err.is_config_error() {
            Self::Config(err.into())
        } else {
            Self::ConsensusBootstrap(err)
        }
    }
}

/// Wraps errors of collaborators as infrastructure failures.
pub(crate) trait Wrap<T> {
    fn infra(self) -> Result<T, BootstrapError>;
}

impl<T> Wrap<T> for anyhow::Result<T> {
    fn infra(self) -> Result<T, BootstrapError> {
        self.map_err(BootstrapError::Infrastructure)
    }
}
