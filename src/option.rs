//! Discounted call option on the governance token.
//!
//! Option tokens are minted 1:1 against escrowed governance tokens. A holder
//! exercises by burning options and paying the discounted time-weighted price
//! in receipt tokens; the escrowed governance tokens are released to the
//! chosen recipient.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::{
    access::{Role, RoleGranted, RoleRevoked, Roles},
    balances::{Approval, Balances, Transfer},
    error::ProtocolError,
    math::common::PERCENT,
    minter::TreasuryUpdated,
    oracle::PriceObservationsContractRef,
    registry::FeeRegistryContractRef,
    state::{DEFAULT_TWAP_POINTS, MAX_DISCOUNT, MAX_TWAP_POINTS, OPTION_DECIMALS},
    token::RoleTokenContractRef,
    twap,
};

#[odra::event]
pub struct Exercise {
    pub sender: Address,
    pub recipient: Address,
    pub amount: U256,
    pub payment_amount: U256,
}

#[odra::event]
pub struct PairUpdated {
    pub old_pair: Address,
    pub new_pair: Address,
}

#[odra::event]
pub struct DiscountUpdated {
    pub old_discount: u8,
    pub new_discount: u8,
}

#[odra::event]
pub struct TwapPointsUpdated {
    pub old_points: u32,
    pub new_points: u32,
}

#[odra::event]
pub struct Paused {
    pub account: Address,
}

#[odra::event]
pub struct Unpaused {
    pub account: Address,
}

#[odra::module(events = [
    Exercise,
    PairUpdated,
    TreasuryUpdated,
    DiscountUpdated,
    TwapPointsUpdated,
    Paused,
    Unpaused,
    Transfer,
    Approval,
    RoleGranted,
    RoleRevoked
])]
pub struct OptionToken {
    name: Var<String>,
    symbol: Var<String>,
    ledger: SubModule<Balances>,
    roles: SubModule<Roles>,

    payment_token: Var<Address>,
    underlying_token: Var<Address>,
    pair: Var<Address>,
    treasury: Var<Address>,
    discount: Var<u8>,
    twap_points: Var<u32>,
    paused: Var<bool>,
}

#[odra::module]
impl OptionToken {
    /// Initialize the option token and register it with the fee registry
    pub fn init(
        &mut self,
        name: String,
        symbol: String,
        admin: Address,
        payment_token: Address,
        underlying_token: Address,
        pair: Address,
        treasury: Address,
        discount: u8,
        fee_registry: Address,
    ) {
        self.validate_discount(discount);

        self.name.set(name);
        self.symbol.set(symbol);
        self.payment_token.set(payment_token);
        self.underlying_token.set(underlying_token);
        self.pair.set(pair);
        self.treasury.set(treasury);
        self.discount.set(discount);
        self.twap_points.set(DEFAULT_TWAP_POINTS);
        self.paused.set(false);
        self.roles.bootstrap(admin);

        let deployer = self.env().caller();
        FeeRegistryContractRef::new(self.env(), fee_registry).register(deployer);
    }

    // ===========================================================================
    // PRICING
    // ===========================================================================

    /// Value of `amount_in` governance tokens in payment tokens at the
    /// time-weighted average of the last `twap_points` oracle intervals.
    pub fn get_time_weighted_average_price(&self, amount_in: U256) -> U256 {
        let observations = PriceObservationsContractRef::new(self.env(), self.pair())
            .recent_observations(self.twap_points() + 1);
        twap::quote(amount_in, &observations).unwrap_or_else(|err| self.env().revert(err))
    }

    /// Strike price: the TWAP value scaled by the discount percentage.
    pub fn get_discounted_price(&self, amount_in: U256) -> U256 {
        let fair = self.get_time_weighted_average_price(amount_in);
        fair.checked_mul(U256::from(self.discount()))
            .map(|scaled| scaled / U256::from(PERCENT))
            .unwrap_or_else(|| self.env().revert(ProtocolError::MathOverflow))
    }

    // ===========================================================================
    // ESCROW
    // ===========================================================================

    /// Lock `amount` governance tokens from the caller and mint the same
    /// amount of options to `recipient`.
    pub fn mint(&mut self, recipient: Address, amount: U256) {
        self.only_admin();
        let caller = self.env().caller();
        self.underlying().transfer_from(caller, self.env().self_address(), amount);
        self.ledger.mint(recipient, amount);
    }

    /// Burn `amount` of the caller's options and release the escrowed
    /// governance tokens back to the caller.
    pub fn burn(&mut self, amount: U256) {
        self.only_admin();
        let caller = self.env().caller();
        self.ledger.burn(caller, amount);
        self.underlying().transfer(caller, amount);
    }

    // ===========================================================================
    // EXERCISE
    // ===========================================================================

    /// Exercise options with no deadline. Returns the payment taken.
    pub fn exercise(&mut self, amount: U256, max_payment_amount: U256, recipient: Address) -> U256 {
        self.exercise_option(amount, max_payment_amount, recipient, u64::MAX)
    }

    /// Exercise options if the block time (milliseconds) has not passed
    /// `deadline`. Returns the payment taken.
    pub fn exercise_with_deadline(
        &mut self,
        amount: U256,
        max_payment_amount: U256,
        recipient: Address,
        deadline: u64,
    ) -> U256 {
        self.exercise_option(amount, max_payment_amount, recipient, deadline)
    }

    // ===========================================================================
    // ADMIN
    // ===========================================================================

    /// Point the option at another price oracle
    pub fn set_pair(&mut self, new_pair: Address) {
        self.only_admin();
        let old_pair = self.pair();
        self.pair.set(new_pair);
        self.env().emit_event(PairUpdated { old_pair, new_pair });
    }

    /// Send future exercise payments to `new_treasury`
    pub fn set_treasury(&mut self, new_treasury: Address) {
        self.only_admin();
        let old_treasury = self.treasury();
        self.treasury.set(new_treasury);
        self.env().emit_event(TreasuryUpdated {
            old_treasury,
            new_treasury,
        });
    }

    /// Set the strike discount, in whole percent (at most 100)
    pub fn set_discount(&mut self, new_discount: u8) {
        self.only_admin();
        self.validate_discount(new_discount);
        let old_discount = self.discount();
        self.discount.set(new_discount);
        self.env().emit_event(DiscountUpdated {
            old_discount,
            new_discount,
        });
    }

    /// Set how many oracle intervals the TWAP averages, between 1 and 50
    pub fn set_twap_points(&mut self, new_points: u32) {
        self.only_admin();
        if new_points == 0 || new_points > MAX_TWAP_POINTS {
            self.env().revert(ProtocolError::InvalidTwapPoints);
        }
        let old_points = self.twap_points();
        self.twap_points.set(new_points);
        self.env().emit_event(TwapPointsUpdated {
            old_points,
            new_points,
        });
    }

    /// Halt exercising. Pausers pause, only admins unpause.
    pub fn pause(&mut self) {
        self.roles.require(Role::Pauser, ProtocolError::NoPauserRole);
        self.paused.set(true);
        self.env().emit_event(Paused {
            account: self.env().caller(),
        });
    }

    /// Re-enable exercise. Admin only.
    pub fn unpause(&mut self) {
        self.only_admin();
        self.paused.set(false);
        self.env().emit_event(Unpaused {
            account: self.env().caller(),
        });
    }

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.roles.grant(role, account);
    }

    /// Revoke `role` from `account`. Admin only.
    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.roles.revoke(role, account);
    }

    /// Whether `account` holds `role`
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.roles.has_role(role, account)
    }

    // ===========================================================================
    // TOKEN
    // ===========================================================================

    /// Move options from the caller to `recipient`
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let caller = self.env().caller();
        self.ledger.raw_transfer(caller, recipient, amount);
    }

    /// Move options on behalf of `owner`, spending the caller's allowance
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        self.ledger.spend_allowance(owner, spender, amount);
        self.ledger.raw_transfer(owner, recipient, amount);
    }

    /// Let `spender` move up to `amount` of the caller's options
    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.ledger.approve(owner, spender, amount);
    }

    /// Token name
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    /// Same precision as the underlying token
    pub fn decimals(&self) -> u8 {
        OPTION_DECIMALS
    }

    /// Options outstanding, equal to the escrowed underlying
    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    /// Options held by `owner`
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.ledger.balance_of(owner)
    }

    /// Options `spender` may still move out of `owner`
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    // ===========================================================================
    // VIEWS
    // ===========================================================================

    /// Oracle the strike is priced from
    pub fn pair(&self) -> Address {
        self.pair.get_or_revert_with(ProtocolError::NotInitialized)
    }

    /// Receiver of exercise payments
    pub fn treasury(&self) -> Address {
        self.treasury.get_or_revert_with(ProtocolError::NotInitialized)
    }

    /// Token the strike is paid in
    pub fn payment_token(&self) -> Address {
        self.payment_token.get_or_revert_with(ProtocolError::NotInitialized)
    }

    /// Token released on exercise
    pub fn underlying_token(&self) -> Address {
        self.underlying_token.get_or_revert_with(ProtocolError::NotInitialized)
    }

    /// Percentage of the fair price paid on exercise
    pub fn discount(&self) -> u8 {
        self.discount.get_or_default()
    }

    /// Intervals averaged by the TWAP
    pub fn twap_points(&self) -> u32 {
        self.twap_points.get_or_default()
    }

    /// Whether exercise is currently paused
    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }
}

impl OptionToken {
    fn exercise_option(
        &mut self,
        amount: U256,
        max_payment_amount: U256,
        recipient: Address,
        deadline: u64,
    ) -> U256 {
        if self.is_paused() {
            self.env().revert(ProtocolError::Paused);
        }
        if self.env().get_block_time() > deadline {
            self.env().revert(ProtocolError::PastDeadline);
        }
        if amount.is_zero() {
            self.env().revert(ProtocolError::InvalidAmount);
        }

        let payment_amount = self.get_discounted_price(amount);
        if payment_amount > max_payment_amount {
            self.env().revert(ProtocolError::SlippageTooHigh);
        }

        let sender = self.env().caller();
        self.ledger.burn(sender, amount);
        RoleTokenContractRef::new(self.env(), self.payment_token()).transfer_from(
            sender,
            self.treasury(),
            payment_amount,
        );
        self.underlying().transfer(recipient, amount);

        log::debug!("exercised {} options for {}", amount, payment_amount);
        self.env().emit_event(Exercise {
            sender,
            recipient,
            amount,
            payment_amount,
        });
        payment_amount
    }

    fn underlying(&self) -> RoleTokenContractRef {
        RoleTokenContractRef::new(self.env(), self.underlying_token())
    }

    fn validate_discount(&self, discount: u8) {
        if discount == 0 || discount > MAX_DISCOUNT {
            self.env().revert(ProtocolError::InvalidDiscount);
        }
    }

    fn only_admin(&self) {
        self.roles.require(Role::Admin, ProtocolError::NoAdminRole);
    }
}
