/// Errors returned while patching a genesis document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GenesisError {
    /// Voting power of a validator is not a non-negative integer.
    #[error("validator {address}: invalid power {power:?}")]
    InvalidPower {
        /// Address of the validator.
        address: String,
        /// Power as found in the document.
        power: String,
    },
    /// The document is not valid JSON or lacks the validator list.
    #[error("invalid genesis document: {0}")]
    InvalidDocument(String),
    /// A validator or node address cannot be turned into a consensus address.
    #[error("invalid validator address {address:?}: {reason}")]
    InvalidAddress {
        /// Offending hex address.
        address: String,
        /// Why decoding failed.
        reason: String,
    },
    /// A substitution with an empty source token.
    #[error("empty token in patch #{index}")]
    EmptyToken {
        /// Position of the patch in its list.
        index: usize,
    },
    /// Not enough node identities to take over two thirds of the voting power.
    #[error("{required} validators are needed to exceed two thirds of the voting power, but only {available} nodes are available")]
    Quorum {
        /// Length of the shortest quorum prefix.
        required: usize,
        /// Number of node identities supplied.
        available: usize,
    },
}

impl GenesisError {
    /// Whether the error is caused by malformed input rather than by the requested node count.
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Self::Quorum { .. })
    }
}
