//! Simulation loop.

use crate::error::Result;
use crate::generator::TradeGenerator;
use crate::price_path::GeometricBrownianMotion;
use crate::scenario::{Market, ScenarioConfig, WorkloadConfig};
use crate::trade_size::TradeSizeModel;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use vamm_domain::address::Address;
use vamm_domain::ledger::AssetLedger;
use vamm_domain::math::wad::{from_decimal, to_decimal};
use vamm_engine::views::PoolInfo;
use vamm_router::params::ExactInput;

/// Seconds a routed trade stays valid.
const TRADE_DEADLINE_SECS: u64 = 600;

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trades_attempted: usize,
    pub trades_executed: usize,
    /// vCash value exchanged by executed trades.
    pub volume: Decimal,
    /// vCash minted to the fee recipient.
    pub dev_fees: Decimal,
    /// Swap fees booked against pools but never issued as vCash.
    pub retained_fees: Decimal,
    /// Debt settled by automatic rebalancing of official pools.
    pub rebalanced: Decimal,
    pub price_updates: usize,
    /// Rejected trades by error code.
    pub failures: BTreeMap<String, usize>,
    /// Rejected price updates by error code.
    pub price_update_failures: BTreeMap<String, usize>,
    /// vCash supply change not explained by pool debt, credit, settlements and
    /// retained fees. Zero when sound.
    pub accounting_drift: Decimal,
    pub start_block: u64,
    pub end_block: u64,
    pub pools: Vec<PoolInfo>,
}

fn signed((amount, positive): (U256, bool)) -> Decimal {
    let value = to_decimal(amount);
    if positive { value } else { -value }
}

fn vcash_position(market: &Market) -> Result<(Decimal, Decimal)> {
    let vcash = market.engine.config().vcash.clone();
    let supply = to_decimal(market.ledger.total_supply(&vcash));
    let net = signed(market.engine.net_vcash_issued()?);
    Ok((supply, net))
}

/// Builds the scenario's market and runs its workload.
pub fn run_simulation(scenario: &ScenarioConfig) -> Result<(Market, SimulationSummary)> {
    let mut market = scenario.build()?;
    let model = scenario.workload.size.build()?;
    let traders = scenario
        .workload
        .traders
        .iter()
        .map(|trader| Address::from(trader.as_str()))
        .collect();
    let mut generator = TradeGenerator::new(scenario.workload.seed, model, traders);
    let summary = run_trades(&mut market, &mut generator, &scenario.workload)?;
    Ok((market, summary))
}

/// Submits `workload.trades` generated trades through the router.
///
/// Rejections are tallied by error code; only a broken market aborts the run.
pub fn run_trades<M: TradeSizeModel>(
    market: &mut Market,
    generator: &mut TradeGenerator<M>,
    workload: &WorkloadConfig,
) -> Result<SimulationSummary> {
    market.engine.take_events();
    let (supply_before, net_before) = vcash_position(market)?;
    let start_block = market.block;
    let reference = GeometricBrownianMotion::new(0.0, workload.reference_volatility);
    let mut reference_prices: BTreeMap<Address, Decimal> = market
        .engine
        .pools()
        .map(|pool| (pool.asset.clone(), to_decimal(pool.price)))
        .collect();

    let mut summary = SimulationSummary {
        trades_attempted: 0,
        trades_executed: 0,
        volume: Decimal::ZERO,
        dev_fees: Decimal::ZERO,
        retained_fees: Decimal::ZERO,
        rebalanced: Decimal::ZERO,
        price_updates: 0,
        failures: BTreeMap::new(),
        price_update_failures: BTreeMap::new(),
        accounting_drift: Decimal::ZERO,
        start_block,
        end_block: start_block,
        pools: Vec::new(),
    };

    info!(trades = workload.trades, seed = workload.seed, "Simulation started");
    for step in 0..workload.trades {
        market.advance(workload.block_time_secs);

        let update_due = workload
            .price_update_interval
            .is_some_and(|interval| interval > 0 && step > 0 && step % interval == 0);
        if let (true, Some(reference)) = (update_due, &reference) {
            update_reference_prices(market, generator, reference, &mut reference_prices, &mut summary)?;
        }

        let Some(trade) = generator.next_trade(&market.engine) else {
            break;
        };
        summary.trades_attempted += 1;
        let ctx = market.ctx(&trade.trader);
        let params = ExactInput {
            asset_in: trade.asset_in.clone(),
            asset_out: trade.asset_out.clone(),
            amount_in: trade.amount_in,
            amount_out_min: U256::zero(),
            to: trade.trader.clone(),
            deadline: market.timestamp + TRADE_DEADLINE_SECS,
        };
        match market
            .router
            .swap_exact_input(&mut market.engine, &mut market.ledger, &ctx, &params)
        {
            Ok(outcome) => {
                summary.trades_executed += 1;
                summary.volume += to_decimal(outcome.vcash_value);
                summary.dev_fees += to_decimal(outcome.dev_fee);
                summary.retained_fees += to_decimal(outcome.retained_fee);
                summary.rebalanced += to_decimal(outcome.rebalanced);
            }
            Err(err) => {
                debug!(
                    step,
                    trader = %trade.trader,
                    asset_in = %trade.asset_in,
                    asset_out = %trade.asset_out,
                    notional = %trade.notional,
                    code = err.code(),
                    "Trade rejected"
                );
                *summary.failures.entry(err.code().to_string()).or_default() += 1;
            }
        }
        market.engine.take_events();
    }

    let (supply_after, net_after) = vcash_position(market)?;
    summary.accounting_drift =
        (supply_after - supply_before) - (net_after - net_before) - summary.rebalanced
            + summary.retained_fees;
    summary.end_block = market.block;
    summary.pools = market
        .engine
        .pools()
        .map(|pool| market.engine.pool_info(&pool.asset))
        .collect::<std::result::Result<_, _>>()?;

    info!(
        attempted = summary.trades_attempted,
        executed = summary.trades_executed,
        volume = %summary.volume,
        dev_fees = %summary.dev_fees,
        drift = %summary.accounting_drift,
        "Simulation finished"
    );
    Ok(summary)
}

/// Asks the admin to move every official pool to its next reference price.
fn update_reference_prices<M: TradeSizeModel>(
    market: &mut Market,
    generator: &mut TradeGenerator<M>,
    reference: &GeometricBrownianMotion,
    reference_prices: &mut BTreeMap<Address, Decimal>,
    summary: &mut SimulationSummary,
) -> Result<()> {
    let official: Vec<Address> = market
        .engine
        .pools()
        .filter(|pool| pool.status.is_official())
        .map(|pool| pool.asset.clone())
        .collect();
    let admin = market.admin_ctx();
    for asset in official {
        let Some(current) = reference_prices.get(&asset).copied() else {
            continue;
        };
        let next = reference.step(current, generator.rng());
        reference_prices.insert(asset.clone(), next);
        match market
            .engine
            .update_pool_price(&admin, &asset, from_decimal(next)?)
        {
            Ok(()) => summary.price_updates += 1,
            Err(err) => {
                debug!(asset = %asset, code = err.code(), "Price update rejected");
                *summary
                    .price_update_failures
                    .entry(err.code().to_string())
                    .or_default() += 1;
            }
        }
    }
    Ok(())
}
