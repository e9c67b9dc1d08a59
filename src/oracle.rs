//! Pair price oracle for Odra/Casper.
//!
//! Keeps a fixed-capacity ring of cumulative-price observations. The
//! cumulative price grows by `price × elapsed_ms` between updates, so the
//! average price over any two observations is `Δcumulative / Δtime`.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::{error::ProtocolError, state::MAX_OBSERVATION_CAPACITY};

/// One point of price history.
#[odra::odra_type]
pub struct Observation {
    /// Block time in milliseconds
    pub timestamp: u64,
    /// Sum of WAD-scaled price × elapsed milliseconds since the oracle was deployed
    pub price_cumulative: U256,
}

/// Read side of a price oracle as seen by the option token.
#[odra::external_contract]
pub trait PriceObservations {
    /// Ring slot holding the most recent observation
    fn observation_index(&self) -> u32;
    /// Number of observations currently held (never more than the capacity)
    fn observation_count(&self) -> u32;
    fn observation(&self, index: u32) -> Option<Observation>;
    /// Up to `max_count` most recent observations, oldest first
    fn recent_observations(&self, max_count: u32) -> Vec<Observation>;
}

#[odra::event]
pub struct PriceUpdated {
    pub price: U256,
    pub price_cumulative: U256,
    pub timestamp: u64,
    pub publisher: Address,
}

#[odra::event]
pub struct PublisherAdded {
    pub publisher: Address,
    pub added_by: Address,
}

#[odra::event]
pub struct PublisherRemoved {
    pub publisher: Address,
    pub removed_by: Address,
}

#[odra::event]
pub struct AdminTransferred {
    pub previous_admin: Address,
    pub new_admin: Address,
}

#[odra::module(events = [PriceUpdated, PublisherAdded, PublisherRemoved, AdminTransferred])]
pub struct PairOracle {
    observations: Mapping<u32, Observation>,
    capacity: Var<u32>,
    index: Var<u32>,
    count: Var<u32>,
    // price in force since the latest observation
    last_price: Var<U256>,

    approved_publishers: Mapping<Address, bool>,
    admin: Var<Address>,
}

#[odra::module]
impl PairOracle {
    /// Initialize the oracle with its first observation. The ring holds
    /// between 2 and `MAX_OBSERVATION_CAPACITY` observations.
    pub fn init(&mut self, admin: Address, initial_price: U256, capacity: u32) {
        if !(2..=MAX_OBSERVATION_CAPACITY).contains(&capacity) {
            self.env().revert(ProtocolError::InvalidCapacity);
        }
        self.admin.set(admin);
        self.capacity.set(capacity);
        self.index.set(0);
        self.count.set(1);
        self.last_price.set(initial_price);
        self.observations.set(
            &0,
            Observation {
                timestamp: self.env().get_block_time(),
                price_cumulative: U256::zero(),
            },
        );
    }

    /// Publish a new spot price. The previous price is folded into the
    /// cumulative total up to now and a new observation is recorded; a second
    /// update within the same block only replaces the pending price.
    pub fn update_price(&mut self, price: U256) {
        let caller = self.env().caller();
        if !self.can_publish(caller) {
            self.env().revert(ProtocolError::Unauthorized);
        }

        let now = self.env().get_block_time();
        let latest = self.latest();
        if now > latest.timestamp {
            let price_cumulative = self.cumulative_at(&latest, now);
            let capacity = self.capacity.get_or_default();
            let next = ring_slot(self.index.get_or_default(), 1, capacity, true);
            self.observations.set(
                &next,
                Observation {
                    timestamp: now,
                    price_cumulative,
                },
            );
            self.index.set(next);
            self.count.set((self.count.get_or_default() + 1).min(capacity));
        }
        self.last_price.set(price);

        log::debug!("pair oracle price {} at {}", price, now);
        self.env().emit_event(PriceUpdated {
            price,
            price_cumulative: self.current_cumulative_price(),
            timestamp: now,
            publisher: caller,
        });
    }

    /// Add approved price publisher
    pub fn add_publisher(&mut self, publisher: Address) {
        let caller = self.only_admin();
        self.approved_publishers.set(&publisher, true);
        self.env().emit_event(PublisherAdded {
            publisher,
            added_by: caller,
        });
    }

    /// Remove price publisher
    pub fn remove_publisher(&mut self, publisher: Address) {
        let caller = self.only_admin();
        self.approved_publishers.set(&publisher, false);
        self.env().emit_event(PublisherRemoved {
            publisher,
            removed_by: caller,
        });
    }

    /// Transfer admin rights
    pub fn transfer_admin(&mut self, new_admin: Address) {
        let previous_admin = self.only_admin();
        self.admin.set(new_admin);
        self.env().emit_event(AdminTransferred {
            previous_admin,
            new_admin,
        });
    }

    pub fn is_approved_publisher(&self, address: Address) -> bool {
        self.approved_publishers.get(&address).unwrap_or(false)
    }

    pub fn current_price(&self) -> U256 {
        self.last_price.get_or_default()
    }

    /// Cumulative price as it would read if an observation were taken now
    pub fn current_cumulative_price(&self) -> U256 {
        self.cumulative_at(&self.latest(), self.env().get_block_time())
    }

    pub fn capacity(&self) -> u32 {
        self.capacity.get_or_default()
    }

    pub fn observation_index(&self) -> u32 {
        self.index.get_or_default()
    }

    pub fn observation_count(&self) -> u32 {
        self.count.get_or_default()
    }

    pub fn observation(&self, index: u32) -> Option<Observation> {
        if index >= self.count.get_or_default() {
            return None;
        }
        self.observations.get(&index)
    }

    pub fn recent_observations(&self, max_count: u32) -> Vec<Observation> {
        let capacity = self.capacity.get_or_default();
        let latest = self.index.get_or_default();
        let n = max_count.min(self.count.get_or_default());

        (0..n)
            .rev()
            .filter_map(|back| self.observations.get(&ring_slot(latest, back, capacity, false)))
            .collect()
    }
}

impl PairOracle {
    fn latest(&self) -> Observation {
        self.observations
            .get(&self.index.get_or_default())
            .unwrap_or_else(|| self.env().revert(ProtocolError::NoPriceHistory))
    }

    fn cumulative_at(&self, latest: &Observation, now: u64) -> U256 {
        let elapsed = now.saturating_sub(latest.timestamp);
        self.last_price
            .get_or_default()
            .checked_mul(U256::from(elapsed))
            .and_then(|accrued| latest.price_cumulative.checked_add(accrued))
            .unwrap_or_else(|| self.env().revert(ProtocolError::MathOverflow))
    }

    fn can_publish(&self, caller: Address) -> bool {
        self.admin.get() == Some(caller) || self.is_approved_publisher(caller)
    }

    fn only_admin(&self) -> Address {
        let caller = self.env().caller();
        if self.admin.get() != Some(caller) {
            self.env().revert(ProtocolError::Unauthorized);
        }
        caller
    }
}

/// Ring slot `steps` ahead of (or behind) `slot`. Computed in u64 so the
/// intermediate sum cannot wrap for any u32 capacity.
fn ring_slot(slot: u32, steps: u32, capacity: u32, forward: bool) -> u32 {
    let capacity = u64::from(capacity);
    let steps = u64::from(steps) % capacity;
    let slot = u64::from(slot);
    let moved = if forward { slot + steps } else { slot + capacity - steps };
    (moved % capacity) as u32
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::DEFAULT_OBSERVATION_CAPACITY;
    use odra::host::{Deployer, HostEnv};

    pub(crate) const PRICE: u128 = 1_000_000_000_000_000_000;
    pub(crate) const HOUR_MS: u64 = 3_600_000;

    pub(crate) fn deploy_oracle(env: &HostEnv, admin: Address, initial_price: U256) -> PairOracleHostRef {
        PairOracle::deploy(
            env,
            PairOracleInitArgs {
                admin,
                initial_price,
                capacity: DEFAULT_OBSERVATION_CAPACITY,
            },
        )
    }

    #[test]
    fn cumulative_price_tracks_price_times_time() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut oracle = deploy_oracle(&env, admin, U256::from(PRICE));

        env.advance_block_time(HOUR_MS);
        oracle.update_price(U256::from(2 * PRICE));
        env.advance_block_time(HOUR_MS);
        oracle.update_price(U256::from(3 * PRICE));

        let history = oracle.recent_observations(10);
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].price_cumulative, U256::from(PRICE) * U256::from(HOUR_MS));
        assert_eq!(
            history[2].price_cumulative - history[1].price_cumulative,
            U256::from(2 * PRICE) * U256::from(HOUR_MS)
        );
        assert_eq!(oracle.current_price(), U256::from(3 * PRICE));
    }

    #[test]
    fn ring_overwrites_oldest_observation() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut oracle = PairOracle::deploy(
            &env,
            PairOracleInitArgs {
                admin,
                initial_price: U256::from(PRICE),
                capacity: 8,
            },
        );

        for _ in 0..10 {
            env.advance_block_time(HOUR_MS);
            oracle.update_price(U256::from(PRICE));
        }

        assert_eq!(oracle.observation_count(), 8);
        assert_eq!(oracle.observation_index(), 10 % 8);
        let history = oracle.recent_observations(8);
        assert_eq!(history.len(), 8);
        assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(history[7].timestamp - history[0].timestamp, 7 * HOUR_MS);
    }

    #[test]
    fn same_block_update_replaces_pending_price() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut oracle = deploy_oracle(&env, admin, U256::from(PRICE));

        env.advance_block_time(HOUR_MS);
        oracle.update_price(U256::from(5 * PRICE));
        oracle.update_price(U256::from(4 * PRICE));
        assert_eq!(oracle.observation_count(), 2);
        assert_eq!(oracle.current_price(), U256::from(4 * PRICE));
    }

    #[test]
    fn only_admin_or_publisher_updates() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let publisher = env.get_account(1);
        let mut oracle = deploy_oracle(&env, admin, U256::from(PRICE));

        env.set_caller(publisher);
        assert_eq!(oracle.try_update_price(U256::one()), Err(ProtocolError::Unauthorized.into()));
        assert_eq!(oracle.try_add_publisher(publisher), Err(ProtocolError::Unauthorized.into()));

        env.set_caller(admin);
        oracle.add_publisher(publisher);
        env.set_caller(publisher);
        env.advance_block_time(HOUR_MS);
        oracle.update_price(U256::one());
        assert!(oracle.is_approved_publisher(publisher));

        env.set_caller(admin);
        oracle.remove_publisher(publisher);
        env.set_caller(publisher);
        assert_eq!(oracle.try_update_price(U256::one()), Err(ProtocolError::Unauthorized.into()));
    }

    #[test]
    fn ring_slots_wrap_without_overflow() {
        assert_eq!(ring_slot(7, 1, 8, true), 0);
        assert_eq!(ring_slot(0, 1, 8, false), 7);
        assert_eq!(ring_slot(3, 3, 8, false), 0);
        assert_eq!(ring_slot(u32::MAX - 1, 1, u32::MAX, true), 0);
        assert_eq!(ring_slot(u32::MAX - 1, 0, u32::MAX, false), u32::MAX - 1);
        assert_eq!(ring_slot(0, u32::MAX - 1, u32::MAX, false), 1);
    }

    #[test]
    fn largest_ring_reads_back_in_order() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut oracle = PairOracle::deploy(
            &env,
            PairOracleInitArgs {
                admin,
                initial_price: U256::from(PRICE),
                capacity: MAX_OBSERVATION_CAPACITY,
            },
        );
        for _ in 0..3 {
            env.advance_block_time(HOUR_MS);
            oracle.update_price(U256::from(PRICE));
        }

        assert_eq!(oracle.capacity(), MAX_OBSERVATION_CAPACITY);
        let history = oracle.recent_observations(u32::MAX);
        assert_eq!(history.len(), 4);
        assert!(history.windows(2).all(|w| w[1].timestamp - w[0].timestamp == HOUR_MS));
    }

    #[test]
    #[should_panic]
    fn capacity_above_maximum_is_rejected() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        PairOracle::deploy(
            &env,
            PairOracleInitArgs {
                admin,
                initial_price: U256::from(PRICE),
                capacity: MAX_OBSERVATION_CAPACITY + 1,
            },
        );
    }

    #[test]
    #[should_panic]
    fn capacity_below_two_is_rejected() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        PairOracle::deploy(
            &env,
            PairOracleInitArgs {
                admin,
                initial_price: U256::from(PRICE),
                capacity: 1,
            },
        );
    }
}
