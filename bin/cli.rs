//! Deploys the staked option system and runs read-only scenarios against it.

use std::str::FromStr;

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, NoArgs};
use odra::prelude::{Address, Addressable};

use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt, OdraCli,
};

use staked_option::{
    access::Role,
    minter::{ExchangeRateMinter, ExchangeRateMinterInitArgs},
    option::{OptionToken, OptionTokenInitArgs},
    oracle::{PairOracle, PairOracleInitArgs},
    registry::RevenueRegistry,
    state::DEFAULT_OBSERVATION_CAPACITY,
    token::{RoleToken, RoleTokenInitArgs},
};

const WAD: u64 = 1_000_000_000_000_000_000;

/// Deployment parameters. Every field can be overridden with a
/// `STAKED_OPTION_*` environment variable.
struct DeployConfig {
    treasury: Option<Address>,
    initial_exchange_rate: U256,
    yield_rate: i64,
    initial_price: U256,
    discount: u8,
    gas: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            treasury: None,
            initial_exchange_rate: U256::from(WAD),
            yield_rate: 500_000,
            initial_price: U256::from(WAD),
            discount: 50,
            gas: 300_000_000_000,
        }
    }
}

impl DeployConfig {
    fn from_env() -> Self {
        let default = Self::default();
        Self {
            treasury: var("TREASURY").and_then(|v| Address::from_str(&v).ok()),
            initial_exchange_rate: var("INITIAL_EXCHANGE_RATE")
                .and_then(|v| U256::from_dec_str(&v).ok())
                .unwrap_or(default.initial_exchange_rate),
            yield_rate: parsed("YIELD_RATE").unwrap_or(default.yield_rate),
            initial_price: var("INITIAL_PRICE")
                .and_then(|v| U256::from_dec_str(&v).ok())
                .unwrap_or(default.initial_price),
            discount: parsed("DISCOUNT").unwrap_or(default.discount),
            gas: parsed("GAS").unwrap_or(default.gas),
        }
    }
}

fn var(key: &str) -> Option<String> {
    std::env::var(format!("STAKED_OPTION_{}", key))
        .ok()
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    var(key).and_then(|v| v.parse().ok())
}

/// Deploys the registry, both ledgers, the minter, the oracle and the option,
/// then wires the minter role.
pub struct StakedOptionDeployScript;

impl DeployScript for StakedOptionDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        let config = DeployConfig::from_env();
        let admin = env.caller();
        let treasury = config.treasury.unwrap_or(admin);
        println!("deploying staked option system, admin {:?}", admin);

        let registry = RevenueRegistry::load_or_deploy(env, NoArgs, container, config.gas)?;

        let mut receipt = RoleToken::load_or_deploy(
            env,
            RoleTokenInitArgs {
                name: String::from("Staked Receipt"),
                symbol: String::from("sRCPT"),
                decimals: 18,
                admin,
                fee_registry: registry.address(),
            },
            container,
            config.gas,
        )?;

        // The container keys contracts by type, so the second ledger is
        // deployed outside of it.
        env.set_gas(config.gas);
        let governance = RoleToken::deploy(
            env,
            RoleTokenInitArgs {
                name: String::from("Governance"),
                symbol: String::from("GOV"),
                decimals: 18,
                admin,
                fee_registry: registry.address(),
            },
        );
        println!("governance token at {:?}", governance.address());

        let minter = ExchangeRateMinter::load_or_deploy(
            env,
            ExchangeRateMinterInitArgs {
                receipt_token: receipt.address(),
                treasury,
                fee_registry: registry.address(),
                initial_exchange_rate: config.initial_exchange_rate,
                yield_rate: config.yield_rate,
            },
            container,
            config.gas,
        )?;

        let oracle = PairOracle::load_or_deploy(
            env,
            PairOracleInitArgs {
                admin,
                initial_price: config.initial_price,
                capacity: DEFAULT_OBSERVATION_CAPACITY,
            },
            container,
            config.gas,
        )?;

        let option = OptionToken::load_or_deploy(
            env,
            OptionTokenInitArgs {
                name: String::from("Governance Option"),
                symbol: String::from("oGOV"),
                admin,
                payment_token: receipt.address(),
                underlying_token: governance.address(),
                pair: oracle.address(),
                treasury,
                discount: config.discount,
                fee_registry: registry.address(),
            },
            container,
            config.gas,
        )?;

        env.set_gas(config.gas);
        receipt.grant_role(Role::Minter, minter.address());

        println!("minter at {:?}", minter.address());
        println!("option at {:?}", option.address());
        Ok(())
    }
}

/// Prints the live exchange rate and the strike for one option.
pub struct QuoteScenario;

impl Scenario for QuoteScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let minter = container.contract_ref::<ExchangeRateMinter>(env)?;
        let option = container.contract_ref::<OptionToken>(env)?;

        let one = U256::from(WAD);
        println!("exchange rate: {}", minter.get_current_exchange_rate());
        println!("yield rate: {}", minter.yield_rate());
        println!("twap price: {}", option.get_time_weighted_average_price(one));
        println!("strike price: {}", option.get_discounted_price(one));
        Ok(())
    }
}

impl ScenarioMetadata for QuoteScenario {
    const NAME: &'static str = "quote";
    const DESCRIPTION: &'static str = "Prints the exchange rate and the option strike price";
}

/// Main function
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the staked option contracts")
        .deploy(StakedOptionDeployScript)
        .contract::<RevenueRegistry>()
        .contract::<RoleToken>()
        .contract::<ExchangeRateMinter>()
        .contract::<PairOracle>()
        .contract::<OptionToken>()
        .scenario(QuoteScenario)
        .build()
        .run();
}
