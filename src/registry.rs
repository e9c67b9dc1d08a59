//! Revenue-sharing registration hook called once by every contract at deploy.

use odra::prelude::*;

use crate::error::ProtocolError;

/// Interface the contracts use to register with the fee registry.
#[odra::external_contract]
pub trait FeeRegistry {
    /// Register the calling contract; fees accrue to `recipient`.
    fn register(&mut self, recipient: Address) -> u64;
}

#[odra::event]
pub struct Registered {
    pub smart_contract: Address,
    pub recipient: Address,
    pub registration_id: u64,
}

/// Registry that hands out one sequential id per registered contract.
#[odra::module(events = [Registered])]
pub struct RevenueRegistry {
    registrations: Mapping<Address, u64>,
    recipients: Mapping<u64, Address>,
    next_id: Var<u64>,
}

#[odra::module]
impl RevenueRegistry {
    pub fn init(&mut self) {
        self.next_id.set(1);
    }

    /// Register the caller. Each contract can register only once.
    pub fn register(&mut self, recipient: Address) -> u64 {
        let smart_contract = self.env().caller();
        if self.registrations.get(&smart_contract).is_some() {
            self.env().revert(ProtocolError::AlreadyRegistered);
        }

        let registration_id = self.next_id.get_or_default();
        self.next_id.set(registration_id + 1);
        self.registrations.set(&smart_contract, registration_id);
        self.recipients.set(&registration_id, recipient);

        self.env().emit_event(Registered {
            smart_contract,
            recipient,
            registration_id,
        });
        registration_id
    }

    /// Whether `smart_contract` has registered
    pub fn is_registered(&self, smart_contract: Address) -> bool {
        self.registrations.get(&smart_contract).is_some()
    }

    /// Registration id of `smart_contract`, if any
    pub fn registration_of(&self, smart_contract: Address) -> Option<u64> {
        self.registrations.get(&smart_contract)
    }

    /// Fee recipient recorded for a registration id
    pub fn recipient_of(&self, registration_id: u64) -> Option<Address> {
        self.recipients.get(&registration_id)
    }
}
