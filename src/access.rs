//! Role sets shared by the ledgers, the minter and the option token.

use odra::prelude::*;

use crate::error::ProtocolError;

/// Capability a principal may hold.
#[odra::odra_type]
pub enum Role {
    Admin = 0,
    Minter = 1,
    Burner = 2,
    Pauser = 3,
}

#[odra::event]
pub struct RoleGranted {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
}

#[odra::event]
pub struct RoleRevoked {
    pub role: Role,
    pub account: Address,
    pub sender: Address,
}

/// Membership sets keyed by role. Only `Admin` members may grant or revoke,
/// `Admin` included.
#[odra::module(events = [RoleGranted, RoleRevoked])]
pub struct Roles {
    members: Mapping<(Role, Address), bool>,
    bootstrapped: Var<bool>,
}

#[odra::module]
impl Roles {
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.members.get(&(role, account)).unwrap_or(false)
    }
}

impl Roles {
    /// Seat the first admin. Callable once per contract.
    pub fn bootstrap(&mut self, admin: Address) {
        if self.bootstrapped.get_or_default() {
            self.env().revert(ProtocolError::AlreadyInitialized);
        }
        self.bootstrapped.set(true);
        self.insert(Role::Admin, admin);
    }

    /// Grant `role` to `account`, caller must be an admin.
    pub fn grant(&mut self, role: Role, account: Address) {
        self.require(Role::Admin, ProtocolError::NoAdminRole);
        if !self.has_role(role.clone(), account) {
            self.insert(role, account);
        }
    }

    /// Revoke `role` from `account`, caller must be an admin.
    pub fn revoke(&mut self, role: Role, account: Address) {
        self.require(Role::Admin, ProtocolError::NoAdminRole);
        if self.has_role(role.clone(), account) {
            self.members.set(&(role.clone(), account), false);
            self.env().emit_event(RoleRevoked {
                role,
                account,
                sender: self.env().caller(),
            });
        }
    }

    /// Revert with `error` unless the caller holds `role`.
    pub fn require(&self, role: Role, error: ProtocolError) {
        let caller = self.env().caller();
        if !self.has_role(role, caller) {
            self.env().revert(error);
        }
    }

    fn insert(&mut self, role: Role, account: Address) {
        self.members.set(&(role.clone(), account), true);
        self.env().emit_event(RoleGranted {
            role,
            account,
            sender: self.env().caller(),
        });
    }
}
