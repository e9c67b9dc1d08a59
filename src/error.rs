//! Error codes shared by every contract in the crate.

use core::fmt;
use odra::prelude::*;

/// Errors raised by the minter, the option token and their collaborators.
///
/// Codes are stable: off-chain tooling matches on the numeric value carried
/// by the Casper user error.
#[odra::odra_error]
pub enum ProtocolError {
    // 1
    Unauthorized = 1,
    NoAdminRole = 2,
    NoPauserRole = 3,
    OnlyMinter = 4,
    OnlyBurner = 5,

    // 10
    NoDepositSupplied = 10,
    InvalidDiscount = 11,
    InvalidTwapPoints = 12,
    InvalidAmount = 13,
    InvalidCapacity = 14,
    AlreadyInitialized = 15,
    AlreadyRegistered = 16,
    NotInitialized = 17,

    // 20
    SlippageNotMet = 20,
    SlippageTooHigh = 21,
    PastDeadline = 22,
    Paused = 23,

    // 30
    BurnExceedsBalance = 30,
    TransferExceedsBalance = 31,
    InsufficientAllowance = 32,

    // 40
    NoPriceHistory = 40,
    ZeroExchangeRate = 41,
    MathOverflow = 42,
}

impl ProtocolError {
    pub fn message(&self) -> &str {
        match self {
            ProtocolError::Unauthorized => "Caller is not the owner",
            ProtocolError::NoAdminRole => "Caller does not hold the admin role",
            ProtocolError::NoPauserRole => "Caller does not hold the pauser role",
            ProtocolError::OnlyMinter => "only minter",
            ProtocolError::OnlyBurner => "only burner",
            ProtocolError::NoDepositSupplied => "Must supply a deposit",
            ProtocolError::InvalidDiscount => "Discount must be in (0, 100]",
            ProtocolError::InvalidTwapPoints => "TWAP points must be in [1, 50]",
            ProtocolError::InvalidAmount => "Input amount is invalid",
            ProtocolError::InvalidCapacity => "Observation capacity must be at least 2",
            ProtocolError::AlreadyInitialized => "Contract is already initialized",
            ProtocolError::AlreadyRegistered => "Contract is already registered",
            ProtocolError::NotInitialized => "Contract is not initialized",
            ProtocolError::SlippageNotMet => "Minted amount is less than min",
            ProtocolError::SlippageTooHigh => "Payment amount exceeds max payment",
            ProtocolError::PastDeadline => "Deadline has passed",
            ProtocolError::Paused => "Exercising is paused",
            ProtocolError::BurnExceedsBalance => "Burn amount exceeds balance",
            ProtocolError::TransferExceedsBalance => "Transfer amount exceeds balance",
            ProtocolError::InsufficientAllowance => "Insufficient allowance",
            ProtocolError::NoPriceHistory => "Oracle holds fewer than two observations",
            ProtocolError::ZeroExchangeRate => "Exchange rate is zero",
            ProtocolError::MathOverflow => "Math operation overflow",
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
