//! Roles and identities of the nodes of a test network.

mod keys;

pub use keys::*;


/// Role of a node within its chain. Roles are positional: the first
/// `num_validators` nodes are validators, the rest are full nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Node holding a share of the voting power.
    Validator,
    /// Node following the chain without voting.
    FullNode,
}

impl NodeRole {
    /// Role of the node at `index` in a chain with `num_validators` validators.
    pub fn at(index: usize, num_validators: usize) -> Self {
        if index < num_validators {
            Self::Validator
        } else {
            Self::FullNode
        }
    }

    /// Whether the node is a validator.
    pub fn is_validator(self) -> bool {
        self == Self::Validator
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Validator => "validator",
            Self::FullNode => "fullnode",
        })
    }
}
