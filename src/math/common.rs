//! Scalers and the checked-addition trait shared by `Decimal` and `YieldRate`.

use crate::error::ProtocolError;

/// Scale of precision
pub const SCALE: usize = 18;
/// Identity
pub const WAD: u64 = 1_000_000_000_000_000_000;
/// Denominator of a yield rate: `500_000` is 5% per year
pub const YIELD_SCALE: u64 = 10_000_000;
/// 365 days
pub const SECONDS_PER_YEAR: u64 = 31_536_000;
/// Casper block time is reported in milliseconds
pub const MILLIS_PER_SECOND: u64 = 1_000;
/// Denominator for whole-percent values
pub const PERCENT: u64 = 100;

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, ProtocolError>;
}
