//! Bech32 addresses (BIP-173) with Cosmos SDK prefixes.
use anyhow::Context as _;
use ::bech32::{Bech32, Hrp};

/// Suffix appended to the chain prefix to form the consensus-address prefix of validators.
pub const VALCONS_SUFFIX: &str = "valcons";

/// Encodes `data` as a bech32 string with the human readable part `hrp`.
pub fn encode(hrp: &str, data: &[u8]) -> anyhow::Result<String> {
    let hrp = Hrp::parse(hrp).with_context(|| format!("invalid bech32 prefix {hrp:?}"))?;
    Ok(::bech32::encode::<Bech32>(hrp, data)?)
}

/// Encodes an account address with the chain prefix, e.g. `cosmos1...`.
pub fn account_address(prefix: &str, address: &[u8]) -> anyhow::Result<String> {
    encode(prefix, address)
}

/// Derives the consensus address of a validator, e.g. `cosmosvalcons1...`,
/// from its hex encoded address as it appears in genesis and key files.
pub fn valcons_address(prefix: &str, hex_address: &str) -> anyhow::Result<String> {
    let raw = hex::decode(hex_address)
        .with_context(|| format!("validator address {hex_address:?} is not hex"))?;
    encode(&format!("{prefix}{VALCONS_SUFFIX}"), &raw)
}
