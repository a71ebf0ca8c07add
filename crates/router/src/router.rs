//! Router executing swaps and liquidity operations against a bound engine.

use crate::params::{AddLiquidity, ExactInput, ExactOutput};
use primitive_types::U256;
use tracing::{debug, info};
use vamm_domain::address::Address;
use vamm_domain::context::CallContext;
use vamm_domain::error::{AmmError, Result};
use vamm_domain::ledger::AssetLedger;
use vamm_domain::math::wad::to_decimal;
use vamm_engine::Engine;
use vamm_engine::liquidity::{RemoveLiquidity, Withdrawal};
use vamm_engine::settlement::Settlement;
use vamm_engine::swap::SwapOutcome;

fn check_deadline(ctx: &CallContext, deadline: u64) -> Result<()> {
    if ctx.timestamp > deadline {
        return Err(AmmError::Expired);
    }
    Ok(())
}

/// Stateless façade over one engine.
///
/// Every call takes the end user's [`CallContext`] and forwards it to the
/// engine as a call made by the router on the user's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    address: Address,
    core: Option<Address>,
    native: Address,
    wrapped_native: Address,
}

impl Router {
    /// Creates an unbound router. `native` is swapped through the pool of `wrapped_native`.
    pub fn new(
        address: impl Into<Address>,
        native: impl Into<Address>,
        wrapped_native: impl Into<Address>,
    ) -> Self {
        Self {
            address: address.into(),
            core: None,
            native: native.into(),
            wrapped_native: wrapped_native.into(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn core(&self) -> Option<&Address> {
        self.core.as_ref()
    }

    pub fn native(&self) -> &Address {
        &self.native
    }

    pub fn wrapped_native(&self) -> &Address {
        &self.wrapped_native
    }

    /// Binds the router to the engine at `core`. Can only happen once.
    pub fn bind_core(&mut self, core: &Address) -> Result<()> {
        if self.core.is_some() {
            return Err(AmmError::RouterAlreadyBound);
        }
        info!(router = %self.address, core = %core, "Router bound to core");
        self.core = Some(core.clone());
        Ok(())
    }

    fn ensure_core(&self, engine: &Engine) -> Result<()> {
        match &self.core {
            None => Err(AmmError::CoreUnbound),
            Some(core) if core != engine.address() => Err(AmmError::WrongCore),
            Some(_) => Ok(()),
        }
    }

    fn is_native(&self, asset: &Address) -> bool {
        *asset == self.native
    }

    /// Asset as the engine sees it.
    fn core_asset(&self, asset: &Address) -> Address {
        if self.is_native(asset) {
            self.wrapped_native.clone()
        } else {
            asset.clone()
        }
    }

    /// Unwraps what the engine paid the router and forwards it to `to` as native.
    fn pay_native(&self, settlement: &mut Settlement, to: &Address, amount: U256) {
        settlement.unwrap_native(&self.address, amount);
        settlement.transfer(&self.native, &self.address, to, amount);
    }

    /// Swaps exactly `params.amount_in`, failing if the output is below `amount_out_min`.
    pub fn swap_exact_input<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        params: &ExactInput,
    ) -> Result<SwapOutcome>
    where
        L: AssetLedger + ?Sized,
    {
        self.ensure_core(engine)?;
        check_deadline(ctx, params.deadline)?;
        let routed = ctx.delegate(&self.address);
        let asset_in = self.core_asset(&params.asset_in);
        let asset_out = self.core_asset(&params.asset_out);
        let native_out = self.is_native(&params.asset_out);
        let recipient = if native_out {
            self.address.clone()
        } else {
            params.to.clone()
        };

        let outcome = engine.transact(ledger, |engine, settlement| {
            if self.is_native(&params.asset_in) {
                settlement.wrap_native(&ctx.caller, params.amount_in);
            }
            let outcome = engine.swap_in(
                &routed,
                settlement,
                &asset_in,
                &asset_out,
                params.amount_in,
                &recipient,
            )?;
            if outcome.amount_out < params.amount_out_min {
                return Err(AmmError::InsufficientOutput);
            }
            if native_out {
                self.pay_native(settlement, &params.to, outcome.amount_out);
            }
            Ok(outcome)
        })?;

        info!(
            user = %ctx.caller,
            asset_in = %params.asset_in,
            asset_out = %params.asset_out,
            amount_in = %to_decimal(outcome.amount_in),
            amount_out = %to_decimal(outcome.amount_out),
            "Exact input swap routed"
        );
        Ok(outcome)
    }

    /// Swaps for exactly `params.amount_out`, failing if the input exceeds `amount_in_max`.
    pub fn swap_exact_output<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        params: &ExactOutput,
    ) -> Result<SwapOutcome>
    where
        L: AssetLedger + ?Sized,
    {
        self.ensure_core(engine)?;
        check_deadline(ctx, params.deadline)?;
        let routed = ctx.delegate(&self.address);
        let asset_in = self.core_asset(&params.asset_in);
        let asset_out = self.core_asset(&params.asset_out);
        let native_out = self.is_native(&params.asset_out);
        let recipient = if native_out {
            self.address.clone()
        } else {
            params.to.clone()
        };

        let quote = engine.quote_amount_in(&asset_in, &asset_out, params.amount_out)?;
        if quote.amount_in > params.amount_in_max {
            return Err(AmmError::ExcessiveInput);
        }
        debug!(amount_in = %to_decimal(quote.amount_in), "Exact output input fixed");

        let outcome = engine.transact(ledger, |engine, settlement| {
            if self.is_native(&params.asset_in) {
                settlement.wrap_native(&ctx.caller, quote.amount_in);
            }
            let outcome = engine.swap_out(
                &routed,
                settlement,
                &asset_in,
                &asset_out,
                params.amount_out,
                &recipient,
            )?;
            if outcome.amount_in > params.amount_in_max {
                return Err(AmmError::ExcessiveInput);
            }
            if native_out {
                self.pay_native(settlement, &params.to, outcome.amount_out);
            }
            Ok(outcome)
        })?;

        info!(
            user = %ctx.caller,
            asset_in = %params.asset_in,
            asset_out = %params.asset_out,
            amount_in = %to_decimal(outcome.amount_in),
            amount_out = %to_decimal(outcome.amount_out),
            "Exact output swap routed"
        );
        Ok(outcome)
    }

    /// Deposits tokens, or native asset when `params.asset` is the native asset.
    pub fn add_liquidity<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        params: &AddLiquidity,
    ) -> Result<U256>
    where
        L: AssetLedger + ?Sized,
    {
        self.deposit(engine, ledger, ctx, params, U256::zero())
    }

    /// Deposits tokens together with `vcash_amount` of the caller's vCash.
    pub fn add_liquidity_pair<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        params: &AddLiquidity,
        vcash_amount: U256,
    ) -> Result<U256>
    where
        L: AssetLedger + ?Sized,
    {
        self.deposit(engine, ledger, ctx, params, vcash_amount)
    }

    /// Wraps `amount` of the caller's native asset and deposits it.
    pub fn add_liquidity_native<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        amount: U256,
        to: &Address,
        deadline: u64,
    ) -> Result<U256>
    where
        L: AssetLedger + ?Sized,
    {
        let params = AddLiquidity::new(self.native.clone(), amount, to.clone(), deadline);
        self.deposit(engine, ledger, ctx, &params, U256::zero())
    }

    fn deposit<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        params: &AddLiquidity,
        vcash_amount: U256,
    ) -> Result<U256>
    where
        L: AssetLedger + ?Sized,
    {
        self.ensure_core(engine)?;
        check_deadline(ctx, params.deadline)?;
        let routed = ctx.delegate(&self.address);
        let asset = self.core_asset(&params.asset);

        engine.transact(ledger, |engine, settlement| {
            if self.is_native(&params.asset) {
                settlement.wrap_native(&ctx.caller, params.token_amount);
            }
            engine.add_liquidity_pair(
                &routed,
                settlement,
                &asset,
                vcash_amount,
                params.token_amount,
                &params.to,
            )
        })
    }

    /// Burns shares and pays out; a native `request.asset` is paid out unwrapped.
    pub fn remove_liquidity<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        request: &RemoveLiquidity,
        deadline: u64,
    ) -> Result<Withdrawal>
    where
        L: AssetLedger + ?Sized,
    {
        self.ensure_core(engine)?;
        check_deadline(ctx, deadline)?;
        let routed = ctx.delegate(&self.address);
        let native = self.is_native(&request.asset);
        let vcash = engine.config().vcash.clone();
        let core_request = RemoveLiquidity {
            asset: self.core_asset(&request.asset),
            to: if native {
                self.address.clone()
            } else {
                request.to.clone()
            },
            ..request.clone()
        };

        engine.transact(ledger, |engine, settlement| {
            let withdrawal = engine.remove_liquidity(&routed, settlement, &core_request)?;
            if native {
                self.pay_native(settlement, &request.to, withdrawal.token_out);
                settlement.transfer(&vcash, &self.address, &request.to, withdrawal.vcash_out);
            }
            Ok(withdrawal)
        })
    }

    /// [`Router::remove_liquidity`] from the wrapped native pool.
    pub fn remove_liquidity_native<L>(
        &self,
        engine: &mut Engine,
        ledger: &mut L,
        ctx: &CallContext,
        request: RemoveLiquidity,
        deadline: u64,
    ) -> Result<Withdrawal>
    where
        L: AssetLedger + ?Sized,
    {
        let request = RemoveLiquidity {
            asset: self.native.clone(),
            ..request
        };
        self.remove_liquidity(engine, ledger, ctx, &request, deadline)
    }
}
