pub mod common;
pub mod decimal;
pub mod rate;

pub use common::TryAdd;
pub use decimal::Decimal;
pub use rate::YieldRate;
