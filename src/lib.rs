#![allow(clippy::arithmetic_side_effects)]
#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

//! Staking receipt minter with a growing exchange rate, and a discounted
//! option on the governance token priced from a pair oracle TWAP.

pub mod access;
pub mod balances;
pub mod error;
pub mod math;
pub mod minter;
pub mod option;
pub mod oracle;
pub mod registry;
pub mod state;
pub mod token;
pub mod twap;

pub use minter::ExchangeRateMinter;
pub use option::OptionToken;
pub use oracle::PairOracle;
pub use registry::RevenueRegistry;
pub use token::RoleToken;

extern crate alloc;
