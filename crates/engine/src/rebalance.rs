//! Debt settlement and direct price control.

use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::settlement::Settlement;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::info;
use vamm_domain::address::Address;
use vamm_domain::context::CallContext;
use vamm_domain::enums::{Capability, PoolStatus};
use vamm_domain::error::{AmmError, Result};
use vamm_domain::math::wad::{checked_sub, div_wad, to_decimal, wad};

/// Result of settling a pool's debt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceOutcome {
    /// Debt written off.
    pub vcash_settled: U256,
    /// Tokens moved from custody to `fee_to`.
    pub tokens_out: U256,
}

/// Largest change in pool value, in wei, that rounding in a rebalance can cause
/// at `price`.
pub fn rebalance_tolerance(price: U256) -> U256 {
    price / wad() + U256::from(2u8)
}

impl Engine {
    /// Settles the pool's vCash debt with its own tokens. Admin only.
    pub fn rebalance_pool(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        asset: &Address,
    ) -> Result<RebalanceOutcome> {
        self.require_admin(ctx)?;
        self.settle_debt(ctx, settlement, asset)
    }

    pub(crate) fn settle_debt(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        asset: &Address,
    ) -> Result<RebalanceOutcome> {
        let vault = self.state.config.vault.clone();
        let fee_to = self.state.config.fee_to.clone();
        let pool = self.pool_mut(asset)?;
        if pool.vcash_debt.is_zero() {
            return Ok(RebalanceOutcome::default());
        }

        let vcash_settled = pool.vcash_debt.min(pool.token_value()?);
        let tokens_out = div_wad(vcash_settled, pool.price)?.min(pool.token_balance);
        pool.token_balance = checked_sub(pool.token_balance, tokens_out)?;
        pool.record_vcash_flow(vcash_settled, U256::zero())?;
        settlement.transfer(asset, &vault, &fee_to, tokens_out);

        info!(
            asset = %asset,
            vcash_settled = %to_decimal(vcash_settled),
            tokens_out = %to_decimal(tokens_out),
            "Pool rebalanced"
        );
        self.emit(
            ctx,
            EngineEvent::PoolRebalanced {
                asset: asset.clone(),
                vcash_settled,
                tokens_out,
            },
        );
        Ok(RebalanceOutcome {
            vcash_settled,
            tokens_out,
        })
    }

    /// Sets a pool price directly once trading has been quiet for the cooldown. Admin only.
    pub fn update_pool_price(
        &mut self,
        ctx: &CallContext,
        asset: &Address,
        new_price: U256,
    ) -> Result<()> {
        self.require_admin(ctx)?;
        if new_price.is_zero() {
            return Err(AmmError::ZeroPrice);
        }
        let cooldown = self.state.config.locks.price_update_cooldown_blocks;
        let pool = self.pool_mut(asset)?;
        if pool
            .last_traded_block
            .is_some_and(|last| ctx.block_number.saturating_sub(last) < cooldown)
        {
            return Err(AmmError::TooEarly);
        }
        let old_price = std::mem::replace(&mut pool.price, new_price);

        info!(asset = %asset, old_price = %to_decimal(old_price), new_price = %to_decimal(new_price), "Pool price updated");
        self.emit(
            ctx,
            EngineEvent::PriceUpdated {
                asset: asset.clone(),
                old_price,
                new_price,
                synthetic: false,
            },
        );
        Ok(())
    }

    /// Sets the price of a synthetic pool. Price adjusters only.
    pub fn set_synth_pool_price(
        &mut self,
        ctx: &CallContext,
        asset: &Address,
        new_price: U256,
    ) -> Result<()> {
        self.state
            .permissions
            .require(Capability::PriceAdjuster, &ctx.caller)?;
        let pool = self.pool_mut(asset)?;
        if pool.status != PoolStatus::Synthetic {
            return Err(AmmError::NotSynthetic);
        }
        if new_price.is_zero() {
            return Err(AmmError::ZeroPrice);
        }
        let old_price = std::mem::replace(&mut pool.price, new_price);

        info!(asset = %asset, new_price = %to_decimal(new_price), "Synthetic price set");
        self.emit(
            ctx,
            EngineEvent::PriceUpdated {
                asset: asset.clone(),
                old_price,
                new_price,
                synthetic: true,
            },
        );
        Ok(())
    }
}
