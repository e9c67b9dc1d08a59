//! Exchange-rate minter: turns native deposits into receipt tokens at a rate
//! that grows with a configurable annual yield.

use odra::casper_types::{U256, U512};
use odra::prelude::*;
use odra::ContractRef;

use crate::{
    access::{Role, RoleGranted, RoleRevoked, Roles},
    error::ProtocolError,
    math::{
        common::{MILLIS_PER_SECOND, SECONDS_PER_YEAR},
        Decimal, YieldRate,
    },
    registry::FeeRegistryContractRef,
    state::RateCheckpoint,
    token::RoleTokenContractRef,
};

/// Length of the accrual year in block-time units
pub const YEAR_MILLIS: u64 = SECONDS_PER_YEAR * MILLIS_PER_SECOND;

#[odra::event]
pub struct YieldUpdated {
    pub old_yield: i64,
    pub new_yield: i64,
    pub exchange_rate: U256,
}

#[odra::event]
pub struct TreasuryUpdated {
    pub old_treasury: Address,
    pub new_treasury: Address,
}

#[odra::event]
pub struct Minted {
    pub sender: Address,
    pub recipient: Address,
    pub deposit: U256,
    pub amount_out: U256,
    pub exchange_rate: U256,
}

#[odra::module(events = [YieldUpdated, TreasuryUpdated, Minted, RoleGranted, RoleRevoked])]
pub struct ExchangeRateMinter {
    receipt_token: Var<Address>,
    treasury: Var<Address>,
    initial_exchange_rate: Var<Decimal>,
    yield_rate: Var<i64>,
    checkpoint_rate: Var<Decimal>,
    last_updated: Var<u64>,
    roles: SubModule<Roles>,
}

#[odra::module]
impl ExchangeRateMinter {
    /// Initialize the minter. The deployer becomes its admin.
    pub fn init(
        &mut self,
        receipt_token: Address,
        treasury: Address,
        fee_registry: Address,
        initial_exchange_rate: U256,
        yield_rate: i64,
    ) {
        let deployer = self.env().caller();
        let initial = Decimal::from_scaled_val(initial_exchange_rate);

        self.receipt_token.set(receipt_token);
        self.treasury.set(treasury);
        self.initial_exchange_rate.set(initial);
        self.yield_rate.set(yield_rate);
        self.store_checkpoint(RateCheckpoint::new(initial, self.env().get_block_time()));
        self.roles.bootstrap(deployer);

        FeeRegistryContractRef::new(self.env(), fee_registry).register(deployer);
    }

    // ===========================================================================
    // EXCHANGE RATE
    // ===========================================================================

    /// Exchange rate (WAD scaled) as of the current block time.
    pub fn get_current_exchange_rate(&self) -> U256 {
        let now = self.env().get_block_time();
        self.checkpoint()
            .rate_at(self.current_yield(), self.initial_rate(), now)
            .unwrap_or_else(|err| self.env().revert(err))
            .scaled_val()
    }

    /// Change the annual yield. Time before the change keeps accruing at the
    /// old yield.
    pub fn set_yield(&mut self, new_yield: i64) {
        self.only_admin();
        let exchange_rate = self.update_checkpoint();
        let old_yield = self.yield_rate.get_or_default();
        self.yield_rate.set(new_yield);

        log::debug!(
            "yield {} -> {} at rate {}",
            YieldRate(old_yield),
            YieldRate(new_yield),
            exchange_rate
        );
        self.env().emit_event(YieldUpdated {
            old_yield,
            new_yield,
            exchange_rate: exchange_rate.scaled_val(),
        });
    }

    /// Redirect future deposits to `new_treasury`. Admin only.
    pub fn set_treasury(&mut self, new_treasury: Address) {
        self.only_admin();
        let old_treasury = self.treasury();
        self.treasury.set(new_treasury);
        self.env().emit_event(TreasuryUpdated {
            old_treasury,
            new_treasury,
        });
    }

    // ===========================================================================
    // MINTING
    // ===========================================================================

    /// Mint receipt tokens for the attached deposit and forward the deposit
    /// to the treasury. Returns the amount minted.
    #[odra(payable)]
    pub fn mint(&mut self, recipient: Address, min_amount_out: U256) -> U256 {
        let deposit = self.attached_deposit();
        self.mint_for(recipient, deposit, min_amount_out)
    }

    /// Mint to the caller, accepting one unit less than the quoted amount.
    #[odra(payable)]
    pub fn deposit(&mut self) -> U256 {
        let deposit = self.attached_deposit();
        let quoted = motes_to_amount(deposit)
            .and_then(|amount| self.current_rate().try_amount_div(amount))
            .unwrap_or_else(|err| self.env().revert(err));
        let caller = self.env().caller();
        self.mint_for(caller, deposit, quoted.saturating_sub(U256::one()))
    }

    // ===========================================================================
    // ROLES
    // ===========================================================================

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
    // VIEWS
    // ===========================================================================

    /// WAD-scaled rate the minter was deployed with
    pub fn initial_exchange_rate(&self) -> U256 {
        self.initial_rate().scaled_val()
    }

    /// Current annual yield in parts per ten million
    pub fn yield_rate(&self) -> i64 {
        self.yield_rate.get_or_default()
    }

    /// Block time (milliseconds) of the last committed checkpoint
    pub fn last_updated(&self) -> u64 {
        self.last_updated.get_or_default()
    }

    /// Ledger the minter mints into
    pub fn receipt_token(&self) -> Address {
        self.receipt_token.get_or_revert_with(ProtocolError::NotInitialized)
    }

    /// Account that receives every deposit
    pub fn treasury(&self) -> Address {
        self.treasury.get_or_revert_with(ProtocolError::NotInitialized)
    }

    /// Seconds in the accrual year
    pub fn year(&self) -> u64 {
        SECONDS_PER_YEAR
    }
}

impl ExchangeRateMinter {
    fn mint_for(&mut self, recipient: Address, deposit: U512, min_amount_out: U256) -> U256 {
        let rate = self.update_checkpoint();
        let amount = motes_to_amount(deposit).unwrap_or_else(|err| self.env().revert(err));
        let amount_out = rate
            .try_amount_div(amount)
            .unwrap_or_else(|err| self.env().revert(err));
        if amount_out < min_amount_out {
            self.env().revert(ProtocolError::SlippageNotMet);
        }

        RoleTokenContractRef::new(self.env(), self.receipt_token()).mint(recipient, amount_out);
        self.env().transfer_tokens(&self.treasury(), &deposit);

        log::debug!("minted {} receipt for {} at rate {}", amount_out, amount, rate);
        self.env().emit_event(Minted {
            sender: self.env().caller(),
            recipient,
            deposit: amount,
            amount_out,
            exchange_rate: rate.scaled_val(),
        });
        amount_out
    }

    fn attached_deposit(&self) -> U512 {
        let deposit = self.env().attached_value();
        if deposit.is_zero() {
            self.env().revert(ProtocolError::NoDepositSupplied);
        }
        deposit
    }

    /// Commit the accrued rate and return it.
    fn update_checkpoint(&mut self) -> Decimal {
        let now = self.env().get_block_time();
        let mut checkpoint = self.checkpoint();
        let rate = checkpoint
            .advance(self.current_yield(), self.initial_rate(), now)
            .unwrap_or_else(|err| self.env().revert(err));
        self.store_checkpoint(checkpoint);
        rate
    }

    fn current_rate(&self) -> Decimal {
        Decimal::from_scaled_val(self.get_current_exchange_rate())
    }

    fn checkpoint(&self) -> RateCheckpoint {
        RateCheckpoint::new(
            self.checkpoint_rate.get_or_default(),
            self.last_updated.get_or_default(),
        )
    }

    fn store_checkpoint(&mut self, checkpoint: RateCheckpoint) {
        self.checkpoint_rate.set(checkpoint.rate);
        self.last_updated.set(checkpoint.timestamp);
    }

    fn initial_rate(&self) -> Decimal {
        self.initial_exchange_rate.get_or_default()
    }

    fn current_yield(&self) -> YieldRate {
        YieldRate(self.yield_rate.get_or_default())
    }

    fn only_admin(&self) {
        self.roles.require(Role::Admin, ProtocolError::Unauthorized);
    }
}

/// Native deposits are counted one mote per base-asset unit.
fn motes_to_amount(motes: U512) -> Result<U256, ProtocolError> {
    if motes > U512::from(u128::MAX) {
        return Err(ProtocolError::MathOverflow);
    }
    Ok(U256::from(motes.as_u128()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        math::common::WAD,
        registry::RevenueRegistry,
        token::{tests::deploy_token, RoleTokenHostRef},
    };
    use odra::host::{Deployer, HostEnv, HostRef, NoArgs};
    use odra::prelude::Addressable;

    const FIVE_PERCENT: i64 = 500_000;

    struct Setup {
        env: HostEnv,
        minter: ExchangeRateMinterHostRef,
        receipt: RoleTokenHostRef,
        admin: Address,
        treasury: Address,
        user: Address,
    }

    fn setup(initial_exchange_rate: U256, yield_rate: i64) -> Setup {
        let env = odra_test::env();
        let (admin, treasury, user) = (env.get_account(0), env.get_account(1), env.get_account(2));
        let registry = RevenueRegistry::deploy(&env, NoArgs);
        let mut receipt = deploy_token(&env, "sRCPT", admin, registry.address());
        let minter = ExchangeRateMinter::deploy(
            &env,
            ExchangeRateMinterInitArgs {
                receipt_token: receipt.address(),
                treasury,
                fee_registry: registry.address(),
                initial_exchange_rate,
                yield_rate,
            },
        );
        receipt.grant_role(Role::Minter, minter.address());
        Setup {
            env,
            minter,
            receipt,
            admin,
            treasury,
            user,
        }
    }

    fn wad(numerator: u64, denominator: u64) -> U256 {
        U256::from(WAD) * U256::from(numerator) / U256::from(denominator)
    }

    #[test]
    fn rate_accrues_linearly_across_yield_changes() {
        let Setup { env, mut minter, .. } = setup(U256::from(WAD), FIVE_PERCENT);
        assert_eq!(minter.get_current_exchange_rate(), U256::from(WAD));

        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(minter.get_current_exchange_rate(), wad(105, 100));
        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(minter.get_current_exchange_rate(), wad(110, 100));

        minter.set_yield(1_200_000);
        assert_eq!(minter.get_current_exchange_rate(), wad(110, 100));
        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(minter.get_current_exchange_rate(), wad(122, 100));
    }

    #[test]
    fn split_year_blends_yields() {
        let Setup { env, mut minter, .. } = setup(U256::from(WAD), 600_000);
        env.advance_block_time(YEAR_MILLIS / 2);
        minter.set_yield(400_000);
        env.advance_block_time(YEAR_MILLIS / 2);
        assert_eq!(minter.get_current_exchange_rate(), wad(105, 100));
    }

    #[test]
    fn set_yield_emits_rate_at_change() {
        let Setup { env, mut minter, user, .. } = setup(U256::from(WAD), FIVE_PERCENT);
        env.advance_block_time(YEAR_MILLIS);
        minter.set_yield(0);
        assert!(env.emitted_event(
            &minter,
            YieldUpdated {
                old_yield: FIVE_PERCENT,
                new_yield: 0,
                exchange_rate: wad(105, 100),
            }
        ));
        assert_eq!(minter.last_updated(), env.block_time());

        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(minter.get_current_exchange_rate(), wad(105, 100));

        env.set_caller(user);
        assert_eq!(minter.try_set_yield(1), Err(ProtocolError::Unauthorized.into()));
        assert_eq!(minter.try_set_treasury(user), Err(ProtocolError::Unauthorized.into()));
    }

    #[test]
    fn negative_yield_floors_at_zero() {
        let Setup { env, mut minter, user, .. } = setup(U256::from(WAD), -5_000_000);
        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(minter.get_current_exchange_rate(), wad(1, 2));
        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(minter.get_current_exchange_rate(), U256::zero());

        env.set_caller(user);
        assert_eq!(
            minter.with_tokens(U512::from(1_000)).try_mint(user, U256::zero()),
            Err(ProtocolError::ZeroExchangeRate.into())
        );
    }

    #[test]
    fn mint_prices_deposit_and_pays_treasury() {
        let Setup {
            env,
            mut minter,
            receipt,
            treasury,
            user,
            ..
        } = setup(U256::from(WAD), FIVE_PERCENT);
        let treasury_before = env.balance_of(&treasury);

        env.advance_block_time(1_000);
        env.set_caller(user);
        let out = minter
            .with_tokens(U512::from(1_000_000))
            .mint(user, U256::from(999_999));

        assert_eq!(out, U256::from(999_999));
        assert_eq!(receipt.balance_of(user), out);
        assert_eq!(env.balance_of(&treasury), treasury_before + U512::from(1_000_000));
        assert_eq!(env.balance_of(&minter.address()), U512::zero());
        assert_eq!(minter.last_updated(), env.block_time());
    }

    #[test]
    fn mint_at_two_to_one() {
        let Setup { env, mut minter, receipt, user, .. } = setup(U256::from(2 * WAD), 0);
        env.set_caller(user);
        let out = minter.with_tokens(U512::from(1_001)).mint(user, U256::zero());
        assert_eq!(out, U256::from(500));
        assert!(env.emitted_event(
            &minter,
            Minted {
                sender: user,
                recipient: user,
                deposit: U256::from(1_001),
                amount_out: U256::from(500),
                exchange_rate: U256::from(2 * WAD),
            }
        ));
        assert_eq!(receipt.total_supply(), U256::from(500));
    }

    #[test]
    fn mint_guards() {
        let Setup { env, mut minter, receipt, user, .. } = setup(U256::from(WAD), FIVE_PERCENT);
        env.set_caller(user);

        assert_eq!(
            minter.try_mint(user, U256::zero()),
            Err(ProtocolError::NoDepositSupplied.into())
        );

        env.advance_block_time(YEAR_MILLIS);
        assert_eq!(
            minter
                .with_tokens(U512::from(1_000_000))
                .try_mint(user, U256::from(1_000_000)),
            Err(ProtocolError::SlippageNotMet.into())
        );
        assert_eq!(receipt.total_supply(), U256::zero());
    }

    #[test]
    fn mint_fails_without_minter_role() {
        let Setup {
            env,
            mut minter,
            mut receipt,
            admin,
            user,
            ..
        } = setup(U256::from(WAD), FIVE_PERCENT);
        env.set_caller(admin);
        receipt.revoke_role(Role::Minter, minter.address());

        env.set_caller(user);
        assert_eq!(
            minter.with_tokens(U512::from(10)).try_mint(user, U256::zero()),
            Err(ProtocolError::OnlyMinter.into())
        );
    }

    #[test]
    fn deposit_mints_to_caller() {
        let Setup { env, mut minter, receipt, user, .. } = setup(U256::from(WAD), FIVE_PERCENT);
        env.advance_block_time(YEAR_MILLIS);
        env.set_caller(user);
        let out = minter.with_tokens(U512::from(1_050)).deposit();
        assert_eq!(out, U256::from(1_000));
        assert_eq!(receipt.balance_of(user), U256::from(1_000));
    }

    #[test]
    fn treasury_change_redirects_deposits() {
        let Setup {
            env,
            mut minter,
            admin,
            treasury,
            user,
            ..
        } = setup(U256::from(WAD), 0);
        let new_treasury = env.get_account(5);
        env.set_caller(admin);
        minter.set_treasury(new_treasury);
        assert!(env.emitted_event(
            &minter,
            TreasuryUpdated {
                old_treasury: treasury,
                new_treasury,
            }
        ));

        let before = env.balance_of(&new_treasury);
        env.set_caller(user);
        minter.with_tokens(U512::from(77)).mint(user, U256::zero());
        assert_eq!(env.balance_of(&new_treasury), before + U512::from(77));
    }

    #[test]
    fn views_report_configuration() {
        let Setup {
            minter,
            receipt,
            admin,
            treasury,
            ..
        } = setup(U256::from(WAD), FIVE_PERCENT);
        assert_eq!(minter.initial_exchange_rate(), U256::from(WAD));
        assert_eq!(minter.yield_rate(), FIVE_PERCENT);
        assert_eq!(minter.receipt_token(), receipt.address());
        assert_eq!(minter.treasury(), treasury);
        assert_eq!(minter.year(), 31_536_000);
        assert!(minter.has_role(Role::Admin, admin));
        assert!(!minter.has_role(Role::Minter, admin));
    }

    #[test]
    fn minted_amount_never_exceeds_entitlement() {
        let Setup { env, mut minter, user, .. } = setup(U256::from(WAD), 734_211);
        env.set_caller(user);
        for (step, deposit) in [(17_345u64, 1u64), (9_999_999, 12_345), (86_400_000, 987_654_321)] {
            env.advance_block_time(step);
            let rate = minter.get_current_exchange_rate();
            let out = minter.with_tokens(U512::from(deposit)).mint(user, U256::zero());
            let scaled = U256::from(deposit) * U256::from(WAD);
            assert!(out * rate <= scaled);
            assert!(scaled < (out + 1) * rate);
        }
    }
}
