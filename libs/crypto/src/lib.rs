//! Encodings used to address accounts, validators and assets on Cosmos SDK chains.
//! None of this is cryptography proper: keys and signatures are owned by the nodes
//! under test. We only need to reproduce the derivations that the chains perform,
//! byte for byte, so that the harness queries the same ledger entries.

pub mod bech32;
pub mod denom;
pub mod sha256;

#[cfg(test)]
mod tests;
