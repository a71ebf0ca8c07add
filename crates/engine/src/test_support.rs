//! Shared fixture for engine tests.

use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::liquidity::{RemoveLiquidity, Withdrawal};
use crate::swap::SwapOutcome;
use primitive_types::U256;
use vamm_domain::address::Address;
use vamm_domain::config::EngineConfig;
use vamm_domain::context::CallContext;
use vamm_domain::enums::PoolStatus;
use vamm_domain::error::Result;
use vamm_domain::ledger::{AssetLedger, InMemoryLedger};
use vamm_domain::math::units;

pub const CORE: &str = "core";
pub const ADMIN: &str = "admin";
pub const ROUTER: &str = "router";
pub const FEE_TO: &str = "fee_to";
pub const VCASH: &str = "vCash";
pub const WETH: &str = "WETH";
pub const DAI: &str = "DAI";
pub const UNI: &str = "UNI";
pub const COMP: &str = "COMP";
pub const AAVE: &str = "AAVE";

pub fn addr(value: &str) -> Address {
    Address::from(value)
}

/// Engine, ledger and clock wired together.
pub struct Market {
    pub engine: Engine,
    pub ledger: InMemoryLedger,
    pub block: u64,
    pub now: u64,
}

impl Market {
    /// Four listed pools seeded by alice: WETH at 300, DAI at 1, UNI at 30, COMP at 20.
    pub fn standard() -> Self {
        let mut market = Self {
            engine: Engine::new(CORE, ADMIN, EngineConfig::default()).unwrap(),
            ledger: InMemoryLedger::new(),
            block: 100,
            now: 1_600_000_000,
        };
        let admin = market.ctx(ADMIN);
        market
            .engine
            .bind_router(&admin, &addr(ROUTER))
            .unwrap();

        for (asset, amount) in [(WETH, 2_000_000), (DAI, 10_000_000), (UNI, 10_000_000), (COMP, 10_000_000)] {
            market.fund("alice", asset, units(amount));
        }
        for (asset, amount) in [(WETH, 100_000), (DAI, 10_000_000), (UNI, 1_000_000), (COMP, 10_000_000)] {
            market.fund("bob", asset, units(amount));
        }

        market.list("alice", WETH, units(300), units(500_000)).unwrap();
        market.list("alice", DAI, units(1), units(1_000_000)).unwrap();
        market.list("alice", UNI, units(30), units(1_000_000)).unwrap();
        market.list("alice", COMP, units(20), units(1_000_000)).unwrap();
        market
    }

    pub fn ctx(&self, caller: &str) -> CallContext {
        CallContext::new(caller, self.block, self.now)
    }

    /// Context of a call routed for `user`.
    pub fn routed(&self, user: &str) -> CallContext {
        self.ctx(user).delegate(&addr(ROUTER))
    }

    pub fn advance(&mut self, secs: u64) {
        self.now += secs;
        self.block += secs / 12;
    }

    pub fn fund(&mut self, holder: &str, asset: &str, amount: U256) {
        self.ledger
            .deposit(&addr(asset), &addr(holder), amount)
            .unwrap();
    }

    pub fn set_status(&mut self, asset: &str, status: PoolStatus) {
        let admin = self.ctx(ADMIN);
        self.engine
            .update_pool_status(&admin, &addr(asset), status)
            .unwrap();
    }

    pub fn list(&mut self, who: &str, asset: &str, price: U256, tokens: U256) -> Result<U256> {
        let ctx = self.ctx(who);
        let (asset, to) = (addr(asset), addr(who));
        self.engine.transact(&mut self.ledger, |engine, s| {
            engine.list_new_token(&ctx, s, &asset, price, U256::zero(), tokens, &to)
        })
    }

    pub fn add_liquidity(&mut self, who: &str, asset: &str, tokens: U256) -> Result<U256> {
        let ctx = self.ctx(who);
        let (asset, to) = (addr(asset), addr(who));
        self.engine.transact(&mut self.ledger, |engine, s| {
            engine.add_liquidity(&ctx, s, &asset, tokens, &to)
        })
    }

    pub fn remove(&mut self, who: &str, asset: &str, shares: U256) -> Result<Withdrawal> {
        let ctx = self.ctx(who);
        let request = RemoveLiquidity {
            asset: addr(asset),
            shares,
            to: addr(who),
            min_vcash_out: U256::zero(),
            min_token_out: U256::zero(),
        };
        self.engine.transact(&mut self.ledger, |engine, s| {
            engine.remove_liquidity(&ctx, s, &request)
        })
    }

    pub fn transfer_shares(&mut self, from: &str, asset: &str, to: &str, amount: U256) -> Result<()> {
        let ctx = self.ctx(from);
        self.engine
            .transfer_shares(&ctx, &addr(asset), &addr(to), amount)
    }

    pub fn swap_in(&mut self, user: &str, asset_in: &str, asset_out: &str, amount: U256, to: &str) -> Result<SwapOutcome> {
        let ctx = self.routed(user);
        let (asset_in, asset_out, to) = (addr(asset_in), addr(asset_out), addr(to));
        self.engine.transact(&mut self.ledger, |engine, s| {
            engine.swap_in(&ctx, s, &asset_in, &asset_out, amount, &to)
        })
    }

    pub fn swap_out(&mut self, user: &str, asset_in: &str, asset_out: &str, amount: U256, to: &str) -> Result<SwapOutcome> {
        let ctx = self.routed(user);
        let (asset_in, asset_out, to) = (addr(asset_in), addr(asset_out), addr(to));
        self.engine.transact(&mut self.ledger, |engine, s| {
            engine.swap_out(&ctx, s, &asset_in, &asset_out, amount, &to)
        })
    }

    /// Pool debt minus credit plus settled debt equals vCash minted by the
    /// engine plus retained swap fees.
    pub fn assert_vcash_identity(&self) {
        let (settled, retained) = self.engine.pending_events().iter().fold(
            (U256::zero(), U256::zero()),
            |(settled, retained), record| match &record.event {
                EngineEvent::PoolRebalanced { vcash_settled, .. } => (settled + *vcash_settled, retained),
                EngineEvent::Swap { retained_fee, .. } => (settled, retained + *retained_fee),
                _ => (settled, retained),
            },
        );
        let (net, positive) = self.engine.net_vcash_issued().unwrap();
        let supply = self.ledger.total_supply(&addr(VCASH));
        if positive {
            assert_eq!(net + settled, supply + retained);
        } else {
            assert_eq!(settled, supply + retained + net);
        }
    }
}
