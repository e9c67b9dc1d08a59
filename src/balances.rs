//! Fungible balance book shared by the role-gated ledgers and the option token.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::ProtocolError;

/// `from` is `None` on mint, `to` is `None` on burn.
#[odra::event]
pub struct Transfer {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: U256,
}

#[odra::event]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    pub amount: U256,
}

#[odra::module(events = [Transfer, Approval])]
pub struct Balances {
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
    total_supply: Var<U256>,
}

#[odra::module]
impl Balances {
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get_or_default(&owner)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get_or_default(&(owner, spender))
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }
}

impl Balances {
    pub fn mint(&mut self, to: Address, amount: U256) {
        let supply = self.total_supply();
        let new_supply = supply
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(ProtocolError::MathOverflow));
        self.total_supply.set(new_supply);
        self.balances.set(&to, self.balance_of(to) + amount);

        self.env().emit_event(Transfer {
            from: None,
            to: Some(to),
            amount,
        });
    }

    pub fn burn(&mut self, from: Address, amount: U256) {
        let balance = self.balance_of(from);
        if balance < amount {
            self.env().revert(ProtocolError::BurnExceedsBalance);
        }
        self.balances.set(&from, balance - amount);
        self.total_supply.set(self.total_supply() - amount);

        self.env().emit_event(Transfer {
            from: Some(from),
            to: None,
            amount,
        });
    }

    pub fn raw_transfer(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(ProtocolError::TransferExceedsBalance);
        }
        self.balances.set(&from, from_balance - amount);
        self.balances.set(&to, self.balance_of(to) + amount);

        self.env().emit_event(Transfer {
            from: Some(from),
            to: Some(to),
            amount,
        });
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        self.env().emit_event(Approval {
            owner,
            spender,
            amount,
        });
    }

    /// Allowance is checked before the balance, so a spender without approval
    /// always sees `InsufficientAllowance`.
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            self.env().revert(ProtocolError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), allowance - amount);
    }
}
