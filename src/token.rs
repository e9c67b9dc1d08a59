//! Role-gated fungible ledger, deployed once as the staking receipt token and
//! once as the governance token.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::{
    access::{Role, RoleGranted, RoleRevoked, Roles},
    balances::{Approval, Balances, Transfer},
    error::ProtocolError,
    registry::FeeRegistryContractRef,
};

/// Fungible token whose supply only changes through holders of the `Minter`
/// and `Burner` roles.
#[odra::module(events = [Transfer, Approval, RoleGranted, RoleRevoked])]
pub struct RoleToken {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    ledger: SubModule<Balances>,
    roles: SubModule<Roles>,
}

#[odra::module]
impl RoleToken {
    /// Initialize the ledger, give `admin` the admin role and register the contract
    pub fn init(
        &mut self,
        name: String,
        symbol: String,
        decimals: u8,
        admin: Address,
        fee_registry: Address,
    ) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.roles.bootstrap(admin);

        let deployer = self.env().caller();
        FeeRegistryContractRef::new(self.env(), fee_registry).register(deployer);
    }

    // ===========================================================================
    // SUPPLY
    // ===========================================================================

    /// Mint `amount` to `to`. Requires the minter role.
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.roles.require(Role::Minter, ProtocolError::OnlyMinter);
        self.ledger.mint(to, amount);
    }

    /// Burn `amount` from `from`. Requires the burner role.
    pub fn burn(&mut self, from: Address, amount: U256) {
        self.roles.require(Role::Burner, ProtocolError::OnlyBurner);
        self.ledger.burn(from, amount);
    }

    // ===========================================================================
    // TRANSFERS
    // ===========================================================================

    /// Move tokens from the caller to `recipient`
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let caller = self.env().caller();
        self.ledger.raw_transfer(caller, recipient, amount);
    }

    /// Transfer on behalf of `owner` within the caller's allowance
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        self.ledger.spend_allowance(owner, spender, amount);
        self.ledger.raw_transfer(owner, recipient, amount);
    }

    /// Set the caller's allowance for `spender`
    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.ledger.approve(owner, spender, amount);
    }

    // ===========================================================================
    // ROLES
    // ===========================================================================

    /// Grant a role. Admin only.
    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.roles.grant(role, account);
    }

    /// Revoke a role. Admin only.
    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.roles.revoke(role, account);
    }

    /// Whether `account` holds `role`
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.roles.has_role(role, account)
    }

    // ===========================================================================
    // VIEWS
    // ===========================================================================

    /// Token name
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    /// Decimal places of the token
    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    /// Total tokens in circulation
    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    /// Tokens held by `owner`
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.ledger.balance_of(owner)
    }

    /// Tokens `spender` may still move out of `owner`
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }
}
