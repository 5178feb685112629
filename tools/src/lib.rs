//! Command line tools for IBC test networks.
mod commands;
mod config;

#[cfg(test)]
mod tests;

pub use commands::{patch_genesis, read_identities, QuorumReport, SelectedValidator};
pub use config::{decode_json, encode_json, AppConfig, ConfigPaths};
