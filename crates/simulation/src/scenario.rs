//! Scenario description and market construction.

use crate::error::{Result, SimulationError};
use crate::trade_size::TradeSizeSpec;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use vamm_domain::address::Address;
use vamm_domain::config::{DEFAULT_DEV_FEE, DEFAULT_FEES, EngineConfig};
use vamm_domain::context::CallContext;
use vamm_domain::enums::PoolStatus;
use vamm_domain::ledger::InMemoryLedger;
use vamm_domain::math::wad::from_decimal;
use vamm_engine::Engine;
use vamm_router::Router;

const CORE: &str = "core";
const ROUTER: &str = "router";

/// A pool seeded at scenario start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSpec {
    pub asset: String,
    /// Initial price in vCash.
    pub price: Decimal,
    /// Tokens deposited by `provider` when listing.
    pub liquidity: Decimal,
    pub provider: String,
    #[serde(default = "default_status")]
    pub status: PoolStatus,
}

fn default_status() -> PoolStatus {
    PoolStatus::Listed
}

/// Trading workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub trades: usize,
    pub seed: u64,
    /// Accounts drawing trades; each needs balances in the traded assets.
    pub traders: Vec<String>,
    pub size: TradeSizeSpec,
    /// Seconds between trades; each trade also advances one block.
    #[serde(default = "default_block_time")]
    pub block_time_secs: u64,
    /// Every this many trades the admin moves official pools towards the reference price.
    #[serde(default)]
    pub price_update_interval: Option<usize>,
    /// Per-step volatility of the reference price.
    #[serde(default)]
    pub reference_volatility: f64,
}

fn default_block_time() -> u64 {
    12
}

/// Complete simulation input, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub admin: String,
    pub fee_to: String,
    #[serde(default = "default_fees")]
    pub fees: u32,
    #[serde(default = "default_dev_fee")]
    pub dev_fee: u32,
    #[serde(default)]
    pub pool_size_min_limit: Decimal,
    pub native: String,
    pub wrapped_native: String,
    /// Start of the simulated clock.
    pub start_timestamp: u64,
    pub start_block: u64,
    /// Account → asset → balance.
    pub balances: BTreeMap<String, BTreeMap<String, Decimal>>,
    pub pools: Vec<PoolSpec>,
    pub workload: WorkloadConfig,
}

fn default_fees() -> u32 {
    DEFAULT_FEES
}

fn default_dev_fee() -> u32 {
    DEFAULT_DEV_FEE
}

impl Default for ScenarioConfig {
    /// Four pools seeded by alice, traded by bob and carol.
    fn default() -> Self {
        let balances = [
            ("alice", [("WETH", 600_000), ("DAI", 2_000_000), ("UNI", 2_000_000), ("COMP", 2_000_000)]),
            ("bob", [("WETH", 10_000), ("DAI", 5_000_000), ("UNI", 200_000), ("COMP", 200_000)]),
            ("carol", [("WETH", 10_000), ("DAI", 5_000_000), ("UNI", 200_000), ("COMP", 200_000)]),
        ]
        .into_iter()
        .map(|(account, assets)| {
            let assets = assets
                .into_iter()
                .map(|(asset, amount)| (asset.to_string(), Decimal::from(amount)))
                .collect();
            (account.to_string(), assets)
        })
        .collect();

        let pool = |asset: &str, price: i64, liquidity: i64, status| PoolSpec {
            asset: asset.to_string(),
            price: Decimal::from(price),
            liquidity: Decimal::from(liquidity),
            provider: "alice".to_string(),
            status,
        };

        Self {
            admin: "admin".to_string(),
            fee_to: "fee_to".to_string(),
            fees: DEFAULT_FEES,
            dev_fee: DEFAULT_DEV_FEE,
            pool_size_min_limit: Decimal::ZERO,
            native: "ETH".to_string(),
            wrapped_native: "WETH".to_string(),
            start_timestamp: 1_600_000_000,
            start_block: 1_000,
            balances,
            pools: vec![
                pool("WETH", 300, 500_000, PoolStatus::Official),
                pool("DAI", 1, 1_000_000, PoolStatus::Official),
                pool("UNI", 30, 1_000_000, PoolStatus::Listed),
                pool("COMP", 20, 1_000_000, PoolStatus::Listed),
            ],
            workload: WorkloadConfig {
                trades: 500,
                seed: 42,
                traders: vec!["bob".to_string(), "carol".to_string()],
                size: TradeSizeSpec::LogNormal {
                    median: Decimal::from(2_000),
                    sigma: 1.2,
                    cap: Some(Decimal::from(250_000)),
                },
                block_time_secs: default_block_time(),
                price_update_interval: Some(100),
                reference_volatility: 0.01,
            },
        }
    }
}

impl ScenarioConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            SimulationError::InvalidScenario(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig::default()
            .with_fee_to(self.fee_to.as_str())
            .with_fees(self.fees, self.dev_fee)
            .with_pool_size_min_limit(from_decimal(self.pool_size_min_limit)?))
    }

    /// Funds accounts, binds engine and router, then lists every pool.
    pub fn build(&self) -> Result<Market> {
        let mut market = Market {
            engine: Engine::new(CORE, self.admin.as_str(), self.engine_config()?)?,
            router: Router::new(ROUTER, self.native.as_str(), self.wrapped_native.as_str()),
            ledger: InMemoryLedger::new().with_native(self.native.as_str(), self.wrapped_native.as_str()),
            admin: Address::from(self.admin.as_str()),
            block: self.start_block,
            timestamp: self.start_timestamp,
        };
        let admin = market.ctx(&market.admin);
        let core = market.engine.address().clone();
        market.router.bind_core(&core)?;
        market.engine.bind_router(&admin, market.router.address())?;

        for (account, assets) in &self.balances {
            for (asset, amount) in assets {
                market.ledger.deposit(
                    &Address::from(asset.as_str()),
                    &Address::from(account.as_str()),
                    from_decimal(*amount)?,
                )?;
            }
        }

        for spec in &self.pools {
            if spec.status == PoolStatus::Unlisted {
                return Err(SimulationError::InvalidScenario(format!(
                    "pool {} cannot start unlisted",
                    spec.asset
                )));
            }
            let asset = Address::from(spec.asset.as_str());
            let provider = Address::from(spec.provider.as_str());
            let ctx = market.ctx(&provider);
            let (price, liquidity) = (from_decimal(spec.price)?, from_decimal(spec.liquidity)?);
            market.engine.transact(&mut market.ledger, |engine, settlement| {
                engine.list_new_token(
                    &ctx,
                    settlement,
                    &asset,
                    price,
                    Default::default(),
                    liquidity,
                    &provider,
                )
            })?;
            if spec.status != PoolStatus::Listed {
                market.engine.update_pool_status(&admin, &asset, spec.status)?;
            }
        }

        info!(
            pools = self.pools.len(),
            accounts = self.balances.len(),
            "Scenario market built"
        );
        Ok(market)
    }
}

/// Engine, router and ledger sharing one simulated clock.
#[derive(Debug)]
pub struct Market {
    pub engine: Engine,
    pub router: Router,
    pub ledger: InMemoryLedger,
    pub admin: Address,
    pub block: u64,
    pub timestamp: u64,
}

impl Market {
    pub fn ctx(&self, caller: &Address) -> CallContext {
        CallContext::new(caller.clone(), self.block, self.timestamp)
    }

    pub fn admin_ctx(&self) -> CallContext {
        self.ctx(&self.admin)
    }

    /// Moves the clock by one block and `secs` seconds.
    pub fn advance(&mut self, secs: u64) {
        self.block += 1;
        self.timestamp += secs;
    }
}
