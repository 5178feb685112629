//! Selection of the validators whose keys are taken over by the test nodes.
use crate::GenesisError;
use ibc_testnet_roles::ValidatorRecord;

/// `ceil(2 * total / 3)`.
pub fn quorum_threshold(total_power: u128) -> u128 {
    (2 * total_power).div_ceil(3)
}

/// Validators sorted by power, and the prefix of them which controls more than
/// two thirds of the voting power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quorum {
    /// All validators, by descending power. Ties keep document order.
    pub sorted: Vec<ValidatorRecord>,
    /// Total voting power.
    pub total_power: u128,
    /// Power which the selected validators have to exceed.
    pub threshold: u128,
    /// Length of the shortest prefix of `sorted` whose power exceeds `threshold`.
    /// All validators if no prefix does.
    pub size: usize,
}

impl Quorum {
    /// Computes the quorum of `validators`.
    pub fn new(validators: &[ValidatorRecord]) -> Result<Self, GenesisError> {
        let mut sorted = validators.to_vec();
        // `sort_by` is stable.
        sorted.sort_by(|a, b| b.power.cmp(&a.power));
        let total_power = ibc_testnet_roles::validator::total_power(&sorted);
        if total_power == 0 {
            return Err(GenesisError::InvalidDocument(
                "validators have no voting power".to_owned(),
            ));
        }
        let threshold = quorum_threshold(total_power);
        let mut assigned = 0;
        let mut size = sorted.len();
        for (i, v) in sorted.iter().enumerate() {
            assigned += u128::from(v.power);
            if assigned > threshold {
                size = i + 1;
                break;
            }
        }
        Ok(Self {
            sorted,
            total_power,
            threshold,
            size,
        })
    }

    /// The selected validators.
    pub fn selected(&self) -> &[ValidatorRecord] {
        &self.sorted[..self.size]
    }

    /// Power of the selected validators.
    pub fn selected_power(&self) -> u128 {
        ibc_testnet_roles::validator::total_power(self.selected())
    }

    /// Fails unless `available` nodes are enough to run the selected validators.
    pub fn check(&self, available: usize) -> Result<(), GenesisError> {
        if available < self.size {
            return Err(GenesisError::Quorum {
                required: self.size,
                available,
            });
        }
        Ok(())
    }
}
