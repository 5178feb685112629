//! Validators of a reference genesis document.

/// Validator listed in the `validators` section of a genesis document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatorRecord {
    /// Uppercase hex address.
    pub address: String,
    /// Voting power.
    pub power: u64,
    /// Base64 encoded public key.
    pub pub_key: String,
}

/// Total voting power of `validators`.
pub fn total_power(validators: &[ValidatorRecord]) -> u128 {
    validators.iter().map(|v| u128::from(v.power)).sum()
}
