use crate::{GenesisError, Patch, PatchList, Quorum};
use ibc_testnet_crypto::bech32;
use ibc_testnet_roles::{NodeIdentity, ValidatorRecord};

fn valcons(prefix: &str, address: &str) -> Result<String, GenesisError> {
    bech32::valcons_address(prefix, address).map_err(|err| GenesisError::InvalidAddress {
        address: address.to_owned(),
        reason: format!("{err:#}"),
    })
}

/// Computes the substitutions handing the keys of the quorum validators over to `identities`.
///
/// The i-th validator by descending power is paired with the i-th identity. For every pair,
/// the hex address, the base64 public key and the consensus address are substituted, in
/// that order. Validators outside of the quorum are left untouched.
pub fn plan(
    validators: &[ValidatorRecord],
    identities: &[NodeIdentity],
    bech32_prefix: &str,
) -> Result<PatchList, GenesisError> {
    let quorum = Quorum::new(validators)?;
    quorum.check(identities.len())?;
    let mut patches = PatchList::default();
    for (v, id) in quorum.selected().iter().zip(identities) {
        patches.push(Patch::new(&v.address, &id.address));
        patches.push(Patch::new(&v.pub_key, &id.pub_key));
        patches.push(Patch::new(
            valcons(bech32_prefix, &v.address)?,
            valcons(bech32_prefix, &id.address)?,
        ));
    }
    tracing::debug!(
        total_power = %quorum.total_power,
        threshold = %quorum.threshold,
        selected = quorum.size,
        "genesis quorum"
    );
    Ok(patches)
}

/// Patches `reference` so that `identities` control more than two thirds of its voting power.
/// See [`plan`].
pub fn build(
    reference: &[u8],
    validators: &[ValidatorRecord],
    identities: &[NodeIdentity],
    bech32_prefix: &str,
) -> Result<Vec<u8>, GenesisError> {
    plan(validators, identities, bech32_prefix)?.apply(reference)
}
