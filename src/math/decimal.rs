//! WAD-scaled decimal used for exchange rates and prices.

use {
    crate::{error::ProtocolError, math::common::*},
    odra::casper_types::U256,
    core::fmt,
    alloc::{
        format,
        string::ToString,
    }
};

/// Large decimal values, precise to 18 digits
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Decimal(pub U256);

impl odra::casper_types::bytesrepr::ToBytes for Decimal {
    fn to_bytes(&self) -> Result<alloc::vec::Vec<u8>, odra::casper_types::bytesrepr::Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }
}

impl odra::casper_types::bytesrepr::FromBytes for Decimal {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), odra::casper_types::bytesrepr::Error> {
        let (value, remainder) = U256::from_bytes(bytes)?;
        Ok((Decimal(value), remainder))
    }
}

impl odra::casper_types::CLTyped for Decimal {
    fn cl_type() -> odra::casper_types::CLType {
        odra::casper_types::CLType::U256
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl odra::schema::SchemaEvents for Decimal {}

#[cfg(not(target_arch = "wasm32"))]
impl odra::schema::SchemaErrors for Decimal {}

impl Decimal {
    /// One
    #[cfg(test)]
    pub(crate) fn one() -> Self {
        Self(Self::wad())
    }

    pub(crate) fn wad() -> U256 {
        U256::from(WAD)
    }

    /// Create decimal from an already scaled value
    pub fn from_scaled_val(scaled_val: U256) -> Self {
        Self(scaled_val)
    }

    /// Raw scaled value
    pub fn scaled_val(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `amount ÷ self`, truncated toward zero. The result never exceeds the
    /// exact quotient.
    pub fn try_amount_div(&self, amount: U256) -> Result<U256, ProtocolError> {
        if self.is_zero() {
            return Err(ProtocolError::ZeroExchangeRate);
        }
        amount
            .checked_mul(Self::wad())
            .ok_or(ProtocolError::MathOverflow)?
            .checked_div(self.0)
            .ok_or(ProtocolError::MathOverflow)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            let padding = "0".repeat(SCALE - scaled_val.len());
            scaled_val = format!("0.{}{}", padding, scaled_val);
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl TryAdd for Decimal {
    fn try_add(self, rhs: Self) -> Result<Self, ProtocolError> {
        Ok(Self(self.0.checked_add(rhs.0).ok_or(ProtocolError::MathOverflow)?))
    }
}
