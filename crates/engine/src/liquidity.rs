//! Liquidity deposits, withdrawals and share transfers.

use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::policy::{self, HolderState};
use crate::settlement::Settlement;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vamm_domain::address::Address;
use vamm_domain::context::CallContext;
use vamm_domain::enums::{Capability, PoolStatus};
use vamm_domain::error::{AmmError, Result};
use vamm_domain::math::wad::{checked_add, checked_sub, div_wad, mul_div, mul_wad, to_decimal};

/// Shares permanently credited to `fee_to` by the first deposit into a pool.
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// First-deposit shares are the contributed vCash value divided by this.
pub const INITIAL_SHARE_DIVISOR: u64 = 1_000_000;

/// Withdrawal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidity {
    pub asset: Address,
    pub shares: U256,
    pub to: Address,
    pub min_vcash_out: U256,
    pub min_token_out: U256,
}

/// Assets paid out by a withdrawal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub vcash_out: U256,
    pub token_out: U256,
}

impl Engine {
    /// Deposits tokens only.
    pub fn add_liquidity(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        asset: &Address,
        token_amount: U256,
        to: &Address,
    ) -> Result<U256> {
        self.add_liquidity_pair(ctx, settlement, asset, U256::zero(), token_amount, to)
    }

    /// Deposits tokens together with vCash; the vCash is burned and accrues as pool credit.
    pub fn add_liquidity_pair(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        asset: &Address,
        vcash_amount: U256,
        token_amount: U256,
        to: &Address,
    ) -> Result<U256> {
        let provider = self.acting_account(ctx)?;
        if token_amount.is_zero() {
            return Err(AmmError::BadAmount);
        }
        let config = self.state.config.clone();
        let pool = self.pool(asset)?;
        if pool.status == PoolStatus::Paused {
            return Err(AmmError::Paused);
        }
        let pid = pool.pid;
        let value_before = pool.value()?;
        let contributed = checked_add(vcash_amount, mul_wad(token_amount, pool.price)?)?;
        let supply = self.state.shares.total_supply(pid);

        let minimum = U256::from(MINIMUM_LIQUIDITY);
        let shares = if supply.is_zero() {
            let initial = contributed / U256::from(INITIAL_SHARE_DIVISOR);
            if initial <= minimum {
                return Err(AmmError::BadLiquidity);
            }
            self.state
                .shares
                .mint(pid, &config.fee_to, minimum, ctx.timestamp)?;
            initial - minimum
        } else {
            match value_before {
                Some(value) if !value.is_zero() => mul_div(supply, contributed, value)?,
                _ => return Err(AmmError::BadLiquidity),
            }
        };
        if shares.is_zero() {
            return Err(AmmError::BadLiquidity);
        }
        self.state.shares.mint(pid, to, shares, ctx.timestamp)?;

        let pool = self.pool_mut(asset)?;
        pool.token_balance = checked_add(pool.token_balance, token_amount)?;
        pool.record_vcash_flow(vcash_amount, U256::zero())?;
        pool.created_at.get_or_insert(ctx.timestamp);
        let value_after = pool.value()?.ok_or(AmmError::MinPoolSize)?;
        if value_after < config.pool_size_min_limit {
            return Err(AmmError::MinPoolSize);
        }

        settlement.transfer(asset, &provider, &config.vault, token_amount);
        settlement.burn(&config.vcash, &provider, vcash_amount);

        info!(
            asset = %asset,
            provider = %provider,
            recipient = %to,
            token_amount = %to_decimal(token_amount),
            vcash_amount = %to_decimal(vcash_amount),
            shares = %shares,
            "Liquidity added"
        );
        self.emit(
            ctx,
            EngineEvent::LiquidityAdded {
                asset: asset.clone(),
                provider,
                recipient: to.clone(),
                token_amount,
                vcash_amount,
                shares,
            },
        );
        Ok(shares)
    }

    /// Burns the caller's shares and pays out their part of the pool.
    pub fn remove_liquidity(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        request: &RemoveLiquidity,
    ) -> Result<Withdrawal> {
        let holder = self.acting_account(ctx)?;
        if request.shares.is_zero() {
            return Err(AmmError::BadAmount);
        }
        let config = self.state.config.clone();
        let pool = self.pool(&request.asset)?;
        let pid = pool.pid;
        let position = self
            .state
            .shares
            .position(pid, &holder)
            .filter(|position| position.share_balance >= request.shares)
            .ok_or(AmmError::InsufficientShares)?;
        let state = HolderState {
            position,
            is_top_holder: self.state.shares.is_top_holder(pid, &holder),
        };
        policy::check_withdrawal(pool, state, ctx.timestamp, &config.locks)?;

        let supply = self.state.shares.total_supply(pid);
        let value = pool.value()?.unwrap_or_default();
        let value_out = mul_div(value, request.shares, supply)?;
        let vcash_out = mul_div(pool.vcash_credit, request.shares, supply)?;
        let token_out = div_wad(checked_sub(value_out, vcash_out)?, pool.price)?
            .min(pool.token_balance);

        if vcash_out < request.min_vcash_out {
            return Err(AmmError::InsufficientVcashOut);
        }
        if token_out < request.min_token_out {
            return Err(AmmError::InsufficientTokenOut);
        }

        self.state.shares.burn(pid, &holder, request.shares)?;
        let pool = self.pool_mut(&request.asset)?;
        pool.token_balance = checked_sub(pool.token_balance, token_out)?;
        pool.record_vcash_flow(U256::zero(), vcash_out)?;

        settlement.transfer(&request.asset, &config.vault, &request.to, token_out);
        settlement.mint(&config.vcash, &request.to, vcash_out);

        info!(
            asset = %request.asset,
            holder = %holder,
            recipient = %request.to,
            shares = %request.shares,
            token_out = %to_decimal(token_out),
            vcash_out = %to_decimal(vcash_out),
            "Liquidity removed"
        );
        self.emit(
            ctx,
            EngineEvent::LiquidityRemoved {
                asset: request.asset.clone(),
                holder,
                recipient: request.to.clone(),
                shares: request.shares,
                token_out,
                vcash_out,
            },
        );
        Ok(Withdrawal {
            vcash_out,
            token_out,
        })
    }

    /// Moves the caller's shares to `to`, subject to the lock policy.
    pub fn transfer_shares(
        &mut self,
        ctx: &CallContext,
        asset: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<()> {
        let sender = self.acting_account(ctx)?;
        if amount.is_zero() {
            return Err(AmmError::BadAmount);
        }
        let pool = self.pool(asset)?;
        let pid = pool.pid;
        let position = self
            .state
            .shares
            .position(pid, &sender)
            .filter(|position| position.share_balance >= amount)
            .ok_or(AmmError::InsufficientShares)?;
        let state = HolderState {
            position,
            is_top_holder: self.state.shares.is_top_holder(pid, &sender),
        };
        let exempt = self
            .state
            .permissions
            .has(Capability::LockExemptRecipient, to);
        policy::check_share_transfer(pool, state, exempt, ctx.timestamp, &self.state.config.locks)?;
        debug!(asset = %asset, from = %sender, to = %to, exempt, "Share transfer allowed");

        self.state
            .shares
            .transfer(pid, &sender, to, amount, ctx.timestamp)?;
        info!(asset = %asset, from = %sender, to = %to, amount = %amount, "Shares transferred");
        self.emit(
            ctx,
            EngineEvent::SharesTransferred {
                asset: asset.clone(),
                from: sender,
                to: to.clone(),
                amount,
            },
        );
        Ok(())
    }
}
