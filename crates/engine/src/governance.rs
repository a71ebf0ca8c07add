//! Admin-gated configuration and role management.
//!
//! Setters validate against their ceilings and fail instead of clamping.

use crate::engine::Engine;
use crate::events::EngineEvent;
use primitive_types::U256;
use tracing::info;
use vamm_domain::address::Address;
use vamm_domain::config::{check_fees, check_pool_size_min_limit};
use vamm_domain::context::CallContext;
use vamm_domain::enums::{Capability, PoolStatus};
use vamm_domain::error::{AmmError, Result};
use vamm_domain::math::wad::to_decimal;

impl Engine {
    /// Binds the router allowed to swap. Can only happen once.
    pub fn bind_router(&mut self, ctx: &CallContext, router: &Address) -> Result<()> {
        self.require_admin(ctx)?;
        if self.state.config.router.is_some() {
            return Err(AmmError::RouterAlreadyBound);
        }
        self.state.config.router = Some(router.clone());
        info!(engine = %self.address(), router = %router, "Router bound");
        self.emit(ctx, EngineEvent::RouterBound { router: router.clone() });
        Ok(())
    }

    pub fn set_fees(&mut self, ctx: &CallContext, fees: u32) -> Result<()> {
        self.require_admin(ctx)?;
        check_fees(fees, self.state.config.dev_fee)?;
        self.state.config.fees = fees;
        self.fees_changed(ctx);
        Ok(())
    }

    pub fn set_dev_fee(&mut self, ctx: &CallContext, dev_fee: u32) -> Result<()> {
        self.require_admin(ctx)?;
        check_fees(self.state.config.fees, dev_fee)?;
        self.state.config.dev_fee = dev_fee;
        self.fees_changed(ctx);
        Ok(())
    }

    fn fees_changed(&mut self, ctx: &CallContext) {
        let fees = self.state.config.fees;
        let dev_fee = self.state.config.dev_fee;
        info!(fees, dev_fee, "Fees updated");
        self.emit(ctx, EngineEvent::FeesUpdated { fees, dev_fee });
    }

    pub fn set_pool_size_min_limit(&mut self, ctx: &CallContext, limit: U256) -> Result<()> {
        self.require_admin(ctx)?;
        check_pool_size_min_limit(limit)?;
        self.state.config.pool_size_min_limit = limit;
        info!(limit = %to_decimal(limit), "Pool size floor updated");
        self.emit(ctx, EngineEvent::PoolSizeLimitUpdated { limit });
        Ok(())
    }

    pub fn set_fee_to(&mut self, ctx: &CallContext, fee_to: &Address) -> Result<()> {
        self.require_admin(ctx)?;
        self.state.config.fee_to = fee_to.clone();
        info!(fee_to = %fee_to, "Fee recipient updated");
        self.emit(ctx, EngineEvent::FeeToUpdated { fee_to: fee_to.clone() });
        Ok(())
    }

    pub fn set_open_listing(&mut self, ctx: &CallContext, open: bool) -> Result<()> {
        self.require_admin(ctx)?;
        self.state.config.open_listing = open;
        info!(open, "Listing mode updated");
        self.emit(ctx, EngineEvent::ListingModeUpdated { open });
        Ok(())
    }

    pub fn update_price_adjuster(&mut self, ctx: &CallContext, account: &Address, granted: bool) -> Result<()> {
        self.update_role(ctx, Capability::PriceAdjuster, account, granted)
    }

    pub fn update_lister(&mut self, ctx: &CallContext, account: &Address, granted: bool) -> Result<()> {
        self.update_role(ctx, Capability::Lister, account, granted)
    }

    /// Lets `account` receive shares that are still time locked.
    pub fn set_share_whitelist(&mut self, ctx: &CallContext, account: &Address, granted: bool) -> Result<()> {
        self.update_role(ctx, Capability::LockExemptRecipient, account, granted)
    }

    fn update_role(
        &mut self,
        ctx: &CallContext,
        capability: Capability,
        account: &Address,
        granted: bool,
    ) -> Result<()> {
        self.require_admin(ctx)?;
        if self.state.permissions.set(capability, account, granted) {
            info!(?capability, account = %account, granted, "Role updated");
            self.emit(
                ctx,
                EngineEvent::RoleUpdated {
                    capability,
                    account: account.clone(),
                    granted,
                },
            );
        }
        Ok(())
    }

    /// Moves a pool to any status.
    pub fn update_pool_status(&mut self, ctx: &CallContext, asset: &Address, status: PoolStatus) -> Result<()> {
        self.require_admin(ctx)?;
        let pool = self.pool_mut(asset)?;
        let old_status = std::mem::replace(&mut pool.status, status);
        info!(asset = %asset, from = %old_status, to = %status, "Pool status updated");
        self.emit(
            ctx,
            EngineEvent::StatusUpdated {
                asset: asset.clone(),
                old_status,
                new_status: status,
            },
        );
        Ok(())
    }

    /// Alias of [`Engine::update_pool_status`].
    pub fn set_token_status(&mut self, ctx: &CallContext, asset: &Address, status: PoolStatus) -> Result<()> {
        self.update_pool_status(ctx, asset, status)
    }

    /// Records the insurance amount backing `asset`.
    pub fn set_token_insurance(&mut self, ctx: &CallContext, asset: &Address, amount: U256) -> Result<()> {
        self.require_admin(ctx)?;
        self.state.token_insurance.insert(asset.clone(), amount);
        info!(asset = %asset, amount = %to_decimal(amount), "Token insurance updated");
        self.emit(
            ctx,
            EngineEvent::TokenInsuranceUpdated {
                asset: asset.clone(),
                amount,
            },
        );
        Ok(())
    }

    /// Sets the metadata URI template of the liquidity shares.
    pub fn set_share_uri(&mut self, ctx: &CallContext, uri: impl Into<String>) -> Result<()> {
        self.require_admin(ctx)?;
        let uri = uri.into();
        self.state.shares.set_uri(uri.clone());
        info!(uri = %uri, "Share URI updated");
        self.emit(ctx, EngineEvent::ShareUriUpdated { uri });
        Ok(())
    }

    pub fn transfer_admin(&mut self, ctx: &CallContext, new_admin: &Address) -> Result<()> {
        self.require_admin(ctx)?;
        let previous = self.state.permissions.transfer_admin(new_admin.clone());
        info!(from = %previous, to = %new_admin, "Admin transferred");
        self.emit(
            ctx,
            EngineEvent::AdminTransferred {
                from: previous,
                to: new_admin.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use vamm_domain::config::{EngineConfig, max_pool_size_min_limit};
    use vamm_domain::math::units;

    #[test]
    fn test_fee_ceilings() {
        let mut market = Market::standard();
        let admin = market.ctx(ADMIN);
        assert_eq!(
            market.engine.set_fees(&admin, 1_000),
            Err(AmmError::FeeTooHigh(1_000))
        );
        assert_eq!(
            market.engine.set_dev_fee(&admin, 1_000),
            Err(AmmError::DevFeeTooHigh(1_000))
        );
        assert_eq!(
            market.engine.set_fees(&admin, 40),
            Err(AmmError::DevFeeTooHigh(50))
        );
        market.engine.set_fees(&admin, 999).unwrap();
        market.engine.set_dev_fee(&admin, 100).unwrap();
        assert_eq!(market.engine.config().fees, 999);
        assert_eq!(market.engine.config().dev_fee, 100);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.fees, 300);
        assert_eq!(config.dev_fee, 50);
    }

    #[test]
    fn test_setters_require_admin() {
        let mut market = Market::standard();
        let bob = market.ctx("bob");
        assert_eq!(market.engine.set_fees(&bob, 100), Err(AmmError::NotAdmin));
        assert_eq!(
            market.engine.set_fee_to(&bob, &addr("bob")),
            Err(AmmError::NotAdmin)
        );
        assert_eq!(
            market.engine.update_pool_status(&bob, &addr(DAI), PoolStatus::Paused),
            Err(AmmError::NotAdmin)
        );
        assert_eq!(
            market.engine.transfer_admin(&bob, &addr("bob")),
            Err(AmmError::NotAdmin)
        );
    }

    #[test]
    fn test_pool_size_limit_ceiling() {
        let mut market = Market::standard();
        let admin = market.ctx(ADMIN);
        assert_eq!(
            market
                .engine
                .set_pool_size_min_limit(&admin, max_pool_size_min_limit() + U256::one()),
            Err(AmmError::PoolSizeLimitTooHigh)
        );
        market.engine.set_pool_size_min_limit(&admin, units(1_000)).unwrap();
        assert_eq!(market.engine.config().pool_size_min_limit, units(1_000));
    }

    #[test]
    fn test_router_binds_once() {
        let mut market = Market::standard();
        let admin = market.ctx(ADMIN);
        assert_eq!(
            market.engine.bind_router(&admin, &addr("router2")),
            Err(AmmError::RouterAlreadyBound)
        );
    }

    #[test]
    fn test_status_moves_freely() {
        let mut market = Market::standard();
        let admin = market.ctx(ADMIN);
        for status in [
            PoolStatus::Official,
            PoolStatus::Unlisted,
            PoolStatus::Synthetic,
            PoolStatus::Paused,
            PoolStatus::Listed,
        ] {
            market.engine.set_token_status(&admin, &addr(DAI), status).unwrap();
            assert_eq!(market.engine.pool(&addr(DAI)).unwrap().status, status);
        }
    }

    #[test]
    fn test_admin_transfer() {
        let mut market = Market::standard();
        let admin = market.ctx(ADMIN);
        market.engine.transfer_admin(&admin, &addr("dao")).unwrap();
        assert_eq!(market.engine.admin(), &addr("dao"));
        assert_eq!(market.engine.set_fees(&admin, 100), Err(AmmError::NotAdmin));
        let dao = market.ctx("dao");
        market.engine.set_fees(&dao, 100).unwrap();
    }

    #[test]
    fn test_token_insurance() {
        let mut market = Market::standard();
        assert!(market.engine.token_insurance(&addr(UNI)).is_zero());

        let admin = market.ctx(ADMIN);
        market.engine.set_token_insurance(&admin, &addr(UNI), units(100)).unwrap();
        assert_eq!(market.engine.token_insurance(&addr(UNI)), units(100));
        assert!(market.engine.token_insurance(&addr(DAI)).is_zero());

        let bob = market.ctx("bob");
        assert_eq!(
            market.engine.set_token_insurance(&bob, &addr(UNI), units(1)),
            Err(AmmError::NotAdmin)
        );
        assert_eq!(market.engine.token_insurance(&addr(UNI)), units(100));
        assert!(market.engine.pending_events().iter().any(|record| matches!(
            &record.event,
            EngineEvent::TokenInsuranceUpdated { asset, .. } if *asset == addr(UNI)
        )));
    }

    #[test]
    fn test_share_uri() {
        let mut market = Market::standard();
        assert_eq!(market.engine.share_uri(), "");

        let admin = market.ctx(ADMIN);
        market
            .engine
            .set_share_uri(&admin, "https://token-cdn-domain/{id}.json")
            .unwrap();
        assert_eq!(market.engine.share_uri(), "https://token-cdn-domain/{id}.json");

        let bob = market.ctx("bob");
        assert_eq!(
            market.engine.set_share_uri(&bob, "https://elsewhere/{id}.json"),
            Err(AmmError::NotAdmin)
        );
        assert_eq!(market.engine.share_uri(), "https://token-cdn-domain/{id}.json");
    }
}
