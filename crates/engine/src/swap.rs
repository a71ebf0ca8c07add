//! Swap quoting and settlement.
//!
//! A swap prices its input against the input pool and its vCash value against
//! the output pool. vCash itself is a valid leg with a fixed price of one.
//!
//! The fee is split in two halves valued at the input leg's post-trade price,
//! one booked by each side. The dev fee comes out of the output side's half.
//! When the input is vCash the output pool books the whole fee.
//!
//! | route          | input pool outflow   | output pool inflow      |
//! |----------------|----------------------|-------------------------|
//! | token -> token | `V + fee / 2`        | `V + fee / 2 - dev`     |
//! | token -> vCash | `V + fee / 2`        | (`V` minted)            |
//! | vCash -> token | (`amount_in` burned) | `amount_in - dev`       |
//!
//! The dev fee is minted to `fee_to`. On a token -> vCash swap the vCash
//! side's half, net of the dev fee, is never issued; it is reported as the
//! retained fee. Pool debt minus credit therefore equals the vCash minted by
//! the engine plus retained fees, less debt settled by rebalancing.

use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::settlement::Settlement;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vamm_domain::address::Address;
use vamm_domain::context::CallContext;
use vamm_domain::enums::PoolStatus;
use vamm_domain::error::{AmmError, Result};
use vamm_domain::math::pricing::{self, PriceImpact};
use vamm_domain::math::wad::{checked_add, checked_sub, to_decimal, wad};

/// Priced swap, before settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub asset_in: Address,
    pub asset_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    /// vCash exchanged between the two legs, fee excluded.
    pub vcash_value: U256,
    /// Input pool price after the trade; one for vCash.
    pub asset_in_price: U256,
    /// Output pool price after the trade; one for vCash.
    pub asset_out_price: U256,
}

/// Settled swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub amount_in: U256,
    pub amount_out: U256,
    pub vcash_value: U256,
    /// vCash minted to `fee_to`.
    pub dev_fee: U256,
    /// Fee booked against the input pool but never issued as vCash.
    pub retained_fee: U256,
    /// Debt settled by the automatic rebalance of an official input pool.
    pub rebalanced: U256,
}

#[derive(Debug, Clone, Copy)]
enum Leg {
    Vcash,
    Pool { price: U256, reserve: U256 },
}

/// Fails when a trade shrank the pool below the floor.
fn enforce_pool_floor(before: Option<U256>, after: Option<U256>, limit: U256) -> Result<()> {
    let after = after.ok_or(AmmError::MinPoolSize)?;
    match before {
        Some(before) if after >= before => Ok(()),
        _ if after >= limit => Ok(()),
        _ => Err(AmmError::MinPoolSize),
    }
}

impl Engine {
    fn leg(&self, asset: &Address) -> Result<Leg> {
        if *asset == self.state.config.vcash {
            return Ok(Leg::Vcash);
        }
        let pool = self.pool(asset)?;
        if pool.status == PoolStatus::Unlisted {
            return Err(AmmError::PoolUnlisted);
        }
        if !pool.status.is_tradable() {
            return Err(AmmError::Paused);
        }
        Ok(Leg::Pool {
            price: pool.price,
            reserve: pool.token_balance,
        })
    }

    fn legs(&self, asset_in: &Address, asset_out: &Address, amount: U256) -> Result<(Leg, Leg)> {
        if asset_in == asset_out {
            return Err(AmmError::SameSwapToken);
        }
        if amount.is_zero() {
            return Err(AmmError::InsufficientInput);
        }
        Ok((self.leg(asset_in)?, self.leg(asset_out)?))
    }

    /// Output for exactly `amount_in` of `asset_in`.
    pub fn quote_amount_out(
        &self,
        asset_in: &Address,
        asset_out: &Address,
        amount_in: U256,
    ) -> Result<SwapQuote> {
        let (leg_in, leg_out) = self.legs(asset_in, asset_out, amount_in)?;
        let net_in = pricing::deduct_fee(amount_in, self.state.config.fees)?;

        let sold = match leg_in {
            Leg::Vcash => PriceImpact {
                new_price: wad(),
                amount: net_in,
            },
            Leg::Pool { price, reserve } => pricing::sell_exact_tokens(price, reserve, net_in)?,
        };
        let bought = match leg_out {
            Leg::Vcash => PriceImpact {
                new_price: wad(),
                amount: sold.amount,
            },
            Leg::Pool { price, reserve } => {
                pricing::buy_with_exact_vcash(price, reserve, sold.amount)?
            }
        };
        if bought.amount.is_zero() {
            return Err(AmmError::InsufficientOutput);
        }

        debug!(
            asset_in = %asset_in,
            asset_out = %asset_out,
            amount_in = %to_decimal(amount_in),
            amount_out = %to_decimal(bought.amount),
            "Quoted exact input"
        );
        Ok(SwapQuote {
            asset_in: asset_in.clone(),
            asset_out: asset_out.clone(),
            amount_in,
            amount_out: bought.amount,
            vcash_value: sold.amount,
            asset_in_price: sold.new_price,
            asset_out_price: bought.new_price,
        })
    }

    /// Input needed to receive exactly `amount_out` of `asset_out`.
    pub fn quote_amount_in(
        &self,
        asset_in: &Address,
        asset_out: &Address,
        amount_out: U256,
    ) -> Result<SwapQuote> {
        let (leg_in, leg_out) = self.legs(asset_in, asset_out, amount_out)?;

        let bought = match leg_out {
            Leg::Vcash => PriceImpact {
                new_price: wad(),
                amount: amount_out,
            },
            Leg::Pool { price, reserve } => pricing::buy_exact_tokens(price, reserve, amount_out)?,
        };
        let sold = match leg_in {
            Leg::Vcash => PriceImpact {
                new_price: wad(),
                amount: bought.amount,
            },
            Leg::Pool { price, reserve } => {
                pricing::sell_for_exact_vcash(price, reserve, bought.amount)?
            }
        };
        let amount_in = pricing::add_fee(sold.amount, self.state.config.fees)?;

        debug!(
            asset_in = %asset_in,
            asset_out = %asset_out,
            amount_in = %to_decimal(amount_in),
            amount_out = %to_decimal(amount_out),
            "Quoted exact output"
        );
        Ok(SwapQuote {
            asset_in: asset_in.clone(),
            asset_out: asset_out.clone(),
            amount_in,
            amount_out,
            vcash_value: bought.amount,
            asset_in_price: sold.new_price,
            asset_out_price: bought.new_price,
        })
    }

    /// Swaps exactly `amount_in`. Router only.
    pub fn swap_in(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        asset_in: &Address,
        asset_out: &Address,
        amount_in: U256,
        to: &Address,
    ) -> Result<SwapOutcome> {
        self.require_router(ctx)?;
        let quote = self.quote_amount_out(asset_in, asset_out, amount_in)?;
        self.settle_swap(ctx, settlement, quote, to)
    }

    /// Swaps for exactly `amount_out`. Router only.
    pub fn swap_out(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        asset_in: &Address,
        asset_out: &Address,
        amount_out: U256,
        to: &Address,
    ) -> Result<SwapOutcome> {
        self.require_router(ctx)?;
        let quote = self.quote_amount_in(asset_in, asset_out, amount_out)?;
        self.settle_swap(ctx, settlement, quote, to)
    }

    fn settle_swap(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        quote: SwapQuote,
        to: &Address,
    ) -> Result<SwapOutcome> {
        let payer = self.acting_account(ctx)?;
        let config = self.state.config.clone();
        let in_is_vcash = quote.asset_in == config.vcash;
        let out_is_vcash = quote.asset_out == config.vcash;

        let fee_price = quote.asset_in_price;
        let dev_fee = pricing::fee_value(fee_price, quote.amount_in, config.dev_fee)?;
        let half_fee = pricing::half_fee_value(fee_price, quote.amount_in, config.fees)?;
        let value = quote.vcash_value;
        let mut retained_fee = U256::zero();

        if in_is_vcash {
            settlement.burn(&config.vcash, &payer, quote.amount_in);
        } else {
            // dev fee can exceed half the fee; the pool still covers what is minted
            let outflow = if out_is_vcash {
                let charged = half_fee.max(dev_fee);
                retained_fee = charged - dev_fee;
                checked_add(value, charged)?
            } else {
                checked_add(value, half_fee)?
            };
            let pool = self.pool_mut(&quote.asset_in)?;
            let before = pool.value()?;
            pool.price = quote.asset_in_price;
            pool.token_balance = checked_add(pool.token_balance, quote.amount_in)?;
            pool.record_vcash_flow(U256::zero(), outflow)?;
            pool.last_traded_block = Some(ctx.block_number);
            enforce_pool_floor(before, pool.value()?, config.pool_size_min_limit)?;
            settlement.transfer(&quote.asset_in, &payer, &config.vault, quote.amount_in);
        }

        if out_is_vcash {
            settlement.mint(&config.vcash, to, quote.amount_out);
        } else {
            let inflow = if in_is_vcash {
                checked_sub(quote.amount_in, dev_fee)?
            } else {
                checked_sub(checked_add(value, half_fee)?, dev_fee)?
            };
            let pool = self.pool_mut(&quote.asset_out)?;
            let before = pool.value()?;
            pool.price = quote.asset_out_price;
            pool.token_balance = pool
                .token_balance
                .checked_sub(quote.amount_out)
                .ok_or(AmmError::InsufficientLiquidity)?;
            pool.record_vcash_flow(inflow, U256::zero())?;
            pool.last_traded_block = Some(ctx.block_number);
            enforce_pool_floor(before, pool.value()?, config.pool_size_min_limit)?;
            settlement.transfer(&quote.asset_out, &config.vault, to, quote.amount_out);
        }

        settlement.mint(&config.vcash, &config.fee_to, dev_fee);

        info!(
            payer = %payer,
            recipient = %to,
            asset_in = %quote.asset_in,
            asset_out = %quote.asset_out,
            amount_in = %to_decimal(quote.amount_in),
            amount_out = %to_decimal(quote.amount_out),
            vcash_value = %to_decimal(value),
            "Swap settled"
        );
        self.emit(
            ctx,
            EngineEvent::Swap {
                payer,
                recipient: to.clone(),
                asset_in: quote.asset_in.clone(),
                asset_out: quote.asset_out.clone(),
                amount_in: quote.amount_in,
                amount_out: quote.amount_out,
                vcash_value: value,
                dev_fee,
                retained_fee,
            },
        );

        let mut rebalanced = U256::zero();
        if !in_is_vcash {
            let pool = self.pool(&quote.asset_in)?;
            if pool.status.is_official() && !pool.vcash_debt.is_zero() {
                rebalanced = self
                    .settle_debt(ctx, settlement, &quote.asset_in)?
                    .vcash_settled;
            }
        }

        Ok(SwapOutcome {
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            vcash_value: value,
            dev_fee,
            retained_fee,
            rebalanced,
        })
    }
}
