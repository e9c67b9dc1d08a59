use crate::{
    error::ProtocolError,
    math::{Decimal, YieldRate},
};

/// Exchange rate committed at a point in time.
///
/// The live rate is always derived from the latest checkpoint; it is never
/// recomputed from genesis, so a yield change only affects time after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateCheckpoint {
    /// Committed exchange rate (WAD scaled)
    pub rate: Decimal,
    /// Block time the rate was committed at, in milliseconds
    pub timestamp: u64,
}

impl RateCheckpoint {
    /// Create new checkpoint
    pub fn new(rate: Decimal, timestamp: u64) -> Self {
        Self { rate, timestamp }
    }

    /// Return milliseconds elapsed since the checkpoint. A clock that reads
    /// earlier than the checkpoint counts as zero elapsed time.
    pub fn millis_elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }

    /// Rate at `now` given the yield in force since the checkpoint.
    pub fn rate_at(
        &self,
        yield_rate: YieldRate,
        initial_rate: Decimal,
        now: u64,
    ) -> Result<Decimal, ProtocolError> {
        yield_rate.accrue(self.rate, initial_rate, self.millis_elapsed(now))
    }

    /// Commit the rate accrued up to `now` and move the checkpoint there.
    pub fn advance(
        &mut self,
        yield_rate: YieldRate,
        initial_rate: Decimal,
        now: u64,
    ) -> Result<Decimal, ProtocolError> {
        let rate = self.rate_at(yield_rate, initial_rate, now)?;
        self.rate = rate;
        self.timestamp = now.max(self.timestamp);
        Ok(rate)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::common::{MILLIS_PER_SECOND, SECONDS_PER_YEAR};
    use odra::casper_types::U256;

    const YEAR_MS: u64 = SECONDS_PER_YEAR * MILLIS_PER_SECOND;

    #[test]
    fn advance_commits_accrued_rate() {
        let one = Decimal::one();
        let mut checkpoint = RateCheckpoint::new(one, 0);
        let committed = match checkpoint.advance(YieldRate(500_000), one, YEAR_MS) {
            Ok(rate) => rate,
            Err(e) => panic!("{}", e),
        };
        assert_eq!(committed.scaled_val(), U256::from(1_050_000_000_000_000_000u128));
        assert_eq!(checkpoint.rate, committed);
        assert_eq!(checkpoint.timestamp, YEAR_MS);
    }

    #[test]
    fn clock_behind_checkpoint_accrues_nothing() {
        let one = Decimal::one();
        let checkpoint = RateCheckpoint::new(one, 10_000);
        assert_eq!(checkpoint.millis_elapsed(5_000), 0);
        assert!(matches!(checkpoint.rate_at(YieldRate(500_000), one, 5_000), Ok(rate) if rate == one));
    }
}
