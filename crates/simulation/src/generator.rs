//! Random trade generation.

use crate::trade_size::TradeSizeModel;
use primitive_types::U256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use vamm_domain::address::Address;
use vamm_domain::math::wad::{from_decimal, to_decimal, wad};
use vamm_engine::Engine;

/// One exact-input swap to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub trader: Address,
    pub asset_in: Address,
    pub asset_out: Address,
    pub amount_in: U256,
    /// vCash notional the trade was sized from.
    pub notional: Decimal,
}

/// Draws trades between random pairs of tradable assets.
pub struct TradeGenerator<M: TradeSizeModel> {
    rng: StdRng,
    model: M,
    traders: Vec<Address>,
}

impl<M: TradeSizeModel> TradeGenerator<M> {
    pub fn new(seed: u64, model: M, traders: Vec<Address>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            model,
            traders,
        }
    }

    /// Generator randomness, shared with the reference price feed.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Next trade against the engine's current prices, or `None` when fewer
    /// than two assets can trade or there is no trader.
    pub fn next_trade(&mut self, engine: &Engine) -> Option<Trade> {
        let vcash = engine.config().vcash.clone();
        let mut assets: Vec<(Address, U256)> = engine
            .pools()
            .filter(|pool| pool.status.is_tradable())
            .map(|pool| (pool.asset.clone(), pool.price))
            .collect();
        assets.push((vcash, wad()));
        if assets.len() < 2 || self.traders.is_empty() {
            return None;
        }

        let trader = self.traders[self.rng.random_range(0..self.traders.len())].clone();
        let input = self.rng.random_range(0..assets.len());
        let mut output = self.rng.random_range(0..assets.len() - 1);
        if output >= input {
            output += 1;
        }
        let (asset_in, price_in) = assets[input].clone();
        let asset_out = assets[output].0.clone();

        let notional = self.model.next_size(&mut self.rng);
        let price = to_decimal(price_in);
        if price.is_zero() {
            return None;
        }
        let amount_in = from_decimal((notional / price).round_dp(12)).ok()?;

        Some(Trade {
            trader,
            asset_in,
            asset_out,
            amount_in,
            notional,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioConfig;
    use crate::trade_size::ConstantSize;
    use vamm_domain::enums::PoolStatus;
    use rust_decimal_macros::dec;

    fn traders() -> Vec<Address> {
        vec![Address::from("bob"), Address::from("carol")]
    }

    #[test]
    fn test_trades_are_reproducible() {
        let market = ScenarioConfig::default().build().unwrap();
        let sample = |seed| {
            let mut generator = TradeGenerator::new(seed, ConstantSize::new(dec!(600)), traders());
            (0..50)
                .filter_map(|_| generator.next_trade(&market.engine))
                .collect::<Vec<_>>()
        };
        let trades = sample(9);
        assert_eq!(trades.len(), 50);
        assert_eq!(trades, sample(9));
        assert!(trades.iter().all(|trade| trade.asset_in != trade.asset_out));
    }

    #[test]
    fn test_amount_in_matches_notional() {
        let market = ScenarioConfig::default().build().unwrap();
        let mut generator = TradeGenerator::new(1, ConstantSize::new(dec!(600)), traders());
        for _ in 0..50 {
            let trade = generator.next_trade(&market.engine).unwrap();
            if trade.asset_in == Address::from("WETH") {
                assert_eq!(to_decimal(trade.amount_in), dec!(2));
            }
            if trade.asset_in == Address::from("vCash") {
                assert_eq!(to_decimal(trade.amount_in), dec!(600));
            }
        }
    }

    #[test]
    fn test_paused_pools_are_skipped() {
        let mut market = ScenarioConfig::default().build().unwrap();
        let admin = market.admin_ctx();
        for asset in ["WETH", "DAI", "UNI", "COMP"] {
            market
                .engine
                .update_pool_status(&admin, &Address::from(asset), PoolStatus::Paused)
                .unwrap();
        }
        let mut generator = TradeGenerator::new(1, ConstantSize::new(dec!(600)), traders());
        assert!(generator.next_trade(&market.engine).is_none());
    }
}
