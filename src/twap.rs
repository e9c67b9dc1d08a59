//! Time-weighted average price over consecutive oracle observations.

use odra::casper_types::U256;

use crate::{
    error::ProtocolError,
    math::Decimal,
    oracle::Observation,
};

/// Sum of the per-interval average prices and the number of intervals that
/// contributed. Intervals of zero length carry no price information and are
/// skipped.
fn interval_sum(observations: &[Observation]) -> Result<(U256, u64), ProtocolError> {
    let mut sum = U256::zero();
    let mut intervals = 0u64;

    for pair in observations.windows(2) {
        let (older, newer) = (&pair[0], &pair[1]);
        let elapsed = newer.timestamp.saturating_sub(older.timestamp);
        if elapsed == 0 {
            continue;
        }
        let delta = newer
            .price_cumulative
            .checked_sub(older.price_cumulative)
            .ok_or(ProtocolError::MathOverflow)?;
        sum = sum
            .checked_add(delta / U256::from(elapsed))
            .ok_or(ProtocolError::MathOverflow)?;
        intervals += 1;
    }

    if intervals == 0 {
        return Err(ProtocolError::NoPriceHistory);
    }
    Ok((sum, intervals))
}

/// Value of `amount_in` at the time-weighted average price, truncated toward
/// zero. The average is the mean of the per-interval average prices, so each
/// interval contributes equally regardless of its length. The division by the
/// interval count happens last.
pub fn quote(amount_in: U256, observations: &[Observation]) -> Result<U256, ProtocolError> {
    let (sum, intervals) = interval_sum(observations)?;
    log::trace!("twap over {} intervals", intervals);
    amount_in
        .checked_mul(sum)
        .ok_or(ProtocolError::MathOverflow)?
        .checked_div(Decimal::wad() * U256::from(intervals))
        .ok_or(ProtocolError::MathOverflow)
}
