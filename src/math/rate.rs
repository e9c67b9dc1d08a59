//! Annual yield rate and the linear accrual it drives.

use {
    crate::{error::ProtocolError, math::{common::*, Decimal, TryAdd}},
    odra::casper_types::U256,
    core::fmt,
};

/// Signed annual yield in parts per ten million (`500_000` is 5% a year).
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct YieldRate(pub i64);

impl YieldRate {
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    fn year_millis() -> U256 {
        U256::from(SECONDS_PER_YEAR) * U256::from(MILLIS_PER_SECOND)
    }

    /// Exchange-rate growth earned over `elapsed_ms` at this yield.
    ///
    /// Growth is linear in `initial_rate`, so the result of splitting an
    /// interval at a checkpoint differs from the unsplit interval only by
    /// truncation (at most one scaled unit per split).
    pub fn growth(&self, initial_rate: Decimal, elapsed_ms: u64) -> Result<Decimal, ProtocolError> {
        let numerator = initial_rate
            .scaled_val()
            .checked_mul(U256::from(self.0.unsigned_abs()))
            .ok_or(ProtocolError::MathOverflow)?
            .checked_mul(U256::from(elapsed_ms))
            .ok_or(ProtocolError::MathOverflow)?;
        let denominator = U256::from(YIELD_SCALE) * Self::year_millis();
        Ok(Decimal::from_scaled_val(numerator / denominator))
    }

    /// Rate reached from `checkpoint_rate` after `elapsed_ms` at this yield.
    /// Negative yields bring the rate down, never below zero.
    pub fn accrue(
        &self,
        checkpoint_rate: Decimal,
        initial_rate: Decimal,
        elapsed_ms: u64,
    ) -> Result<Decimal, ProtocolError> {
        let growth = self.growth(initial_rate, elapsed_ms)?;
        if self.is_negative() {
            Ok(Decimal::from_scaled_val(
                checkpoint_rate.scaled_val().saturating_sub(growth.scaled_val()),
            ))
        } else {
            checkpoint_rate.try_add(growth)
        }
    }
}

impl fmt::Display for YieldRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / (YIELD_SCALE / PERCENT) as i64;
        let frac = (self.0 % (YIELD_SCALE / PERCENT) as i64).unsigned_abs();
        let sign = if self.0 < 0 && whole == 0 { "-" } else { "" };
        write!(f, "{}{}.{:05}%", sign, whole, frac)
    }
}
