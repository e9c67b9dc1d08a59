// Storage types shared by the contracts

pub mod checkpoint;

pub use checkpoint::RateCheckpoint;

/// Largest number of observations a TWAP may aggregate
pub const MAX_TWAP_POINTS: u32 = 50;

/// Upper bound (inclusive) of the option discount, in whole percent
pub const MAX_DISCOUNT: u8 = 100;

/// Option tokens use the same precision as the governance token
pub const OPTION_DECIMALS: u8 = 18;

/// Default ring size for the pair oracle
pub const DEFAULT_OBSERVATION_CAPACITY: u32 = 64;

/// Largest ring the pair oracle accepts
pub const MAX_OBSERVATION_CAPACITY: u32 = 65_536;

/// Intervals averaged by a freshly deployed option token
pub const DEFAULT_TWAP_POINTS: u32 = 4;
