//! Expected balance changes.
use crate::AssertionFailure;

/// Change of the balances watched by a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    /// Change of the sender balance on the source chain.
    pub src: i64,
    /// Change of the receiver balance on the destination chain.
    pub dst: i64,
}

impl Delta {
    /// The packet was relayed: the sender paid the amount and the fees,
    /// the receiver got the amount.
    pub fn relayed(amount: i64, fees: i64) -> Self {
        Self {
            src: -(amount + fees),
            dst: amount,
        }
    }

    /// The packet timed out: the amount was refunded, the fees were not.
    pub fn timed_out(fees: i64) -> Self {
        Self { src: -fees, dst: 0 }
    }

    /// Funds were moved to an interchain account, away from the watched wallets.
    pub fn interchain_account(amount: i64) -> Self {
        Self {
            src: -amount,
            dst: 0,
        }
    }

    /// Checks final balances against the initial ones.
    pub fn check(
        &self,
        (src_initial, src_final): (i64, i64),
        (dst_initial, dst_final): (i64, i64),
    ) -> Result<(), AssertionFailure> {
        expect("source balance", src_initial + self.src, src_final)?;
        expect("destination balance", dst_initial + self.dst, dst_final)
    }
}

fn expect(check: &str, expected: i64, actual: i64) -> Result<(), AssertionFailure> {
    if expected != actual {
        return Err(AssertionFailure {
            check: check.to_owned(),
            expected,
            actual,
        });
    }
    Ok(())
}
