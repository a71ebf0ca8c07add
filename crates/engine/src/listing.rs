//! Pool creation.

use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::settlement::Settlement;
use primitive_types::U256;
use tracing::info;
use vamm_domain::address::Address;
use vamm_domain::context::CallContext;
use vamm_domain::enums::{Capability, PoolStatus};
use vamm_domain::error::{AmmError, Result};
use vamm_domain::math::wad::to_decimal;
use vamm_domain::pool::Pool;

impl Engine {
    /// Lists `asset` at `price` and seeds the pool with the caller's liquidity.
    ///
    /// The paired `vcash_amount` and `token_amount` fix the value behind the
    /// first shares, which are minted to `to`. Returns the shares minted.
    #[allow(clippy::too_many_arguments)]
    pub fn list_new_token(
        &mut self,
        ctx: &CallContext,
        settlement: &mut Settlement,
        asset: &Address,
        price: U256,
        vcash_amount: U256,
        token_amount: U256,
        to: &Address,
    ) -> Result<U256> {
        let lister = self.acting_account(ctx)?;
        let permissions = &self.state.permissions;
        if !self.state.config.open_listing
            && !permissions.is_admin(&lister)
            && !permissions.has(Capability::Lister, &lister)
        {
            return Err(AmmError::BadRole);
        }
        self.create_pool(ctx, asset, price, PoolStatus::Listed)?;
        self.add_liquidity_pair(ctx, settlement, asset, vcash_amount, token_amount, to)
    }

    /// Creates a pool with an explicit status and no liquidity. Admin only.
    pub fn add_special_token(
        &mut self,
        ctx: &CallContext,
        asset: &Address,
        price: U256,
        status: PoolStatus,
    ) -> Result<u64> {
        self.require_admin(ctx)?;
        self.create_pool(ctx, asset, price, status)
    }

    fn create_pool(
        &mut self,
        ctx: &CallContext,
        asset: &Address,
        price: U256,
        status: PoolStatus,
    ) -> Result<u64> {
        if *asset == self.state.config.vcash {
            return Err(AmmError::VcashPool);
        }
        if self.state.pools.contains_key(asset) {
            return Err(AmmError::PoolExists(asset.clone()));
        }
        let pid = self.state.next_pid;
        let pool = Pool::new(pid, asset.clone(), price, status)?;
        self.state.pools.insert(asset.clone(), pool);
        self.state.next_pid += 1;

        info!(asset = %asset, pid, price = %to_decimal(price), status = %status, "Pool created");
        self.emit(
            ctx,
            EngineEvent::PoolCreated {
                asset: asset.clone(),
                pid,
                price,
                status,
            },
        );
        Ok(pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use vamm_domain::math::units;

    #[test]
    fn test_listing_creates_listed_pool_with_shares() {
        let mut market = Market::standard();
        let info = market.engine.pool_info(&addr(WETH)).unwrap();
        assert_eq!(info.status, PoolStatus::Listed);
        assert_eq!(info.price, units(300));
        assert_eq!(info.token_balance, units(500_000));
        assert!(!market.engine.share_balance(&addr(WETH), &addr("alice")).unwrap().is_zero());
        assert!(info.created_at.is_some());
    }

    #[test]
    fn test_listing_existing_pool_fails_even_when_paused() {
        let mut market = Market::standard();
        market.set_status(DAI, PoolStatus::Paused);
        assert_eq!(
            market.list("bob", DAI, units(1), units(100)),
            Err(AmmError::PoolExists(addr(DAI)))
        );
    }

    #[test]
    fn test_listing_vcash_or_zero_price_fails() {
        let mut market = Market::standard();
        assert_eq!(
            market.list("bob", VCASH, units(1), units(100)),
            Err(AmmError::VcashPool)
        );
        market.fund("bob", "AAVE", units(100));
        assert_eq!(
            market.list("bob", "AAVE", U256::zero(), units(100)),
            Err(AmmError::ZeroPrice)
        );
        assert!(market.engine.pool(&addr("AAVE")).is_err());
    }

    #[test]
    fn test_closed_listing_requires_lister() {
        let mut market = Market::standard();
        let admin = market.ctx(ADMIN);
        market.engine.set_open_listing(&admin, false).unwrap();
        market.fund("bob", "AAVE", units(1_000));
        assert_eq!(
            market.list("bob", "AAVE", units(100), units(1_000)),
            Err(AmmError::BadRole)
        );
        market.engine.update_lister(&admin, &addr("bob"), true).unwrap();
        market.list("bob", "AAVE", units(100), units(1_000)).unwrap();
    }

    #[test]
    fn test_special_token_is_admin_only() {
        let mut market = Market::standard();
        let bob = market.ctx("bob");
        assert_eq!(
            market
                .engine
                .add_special_token(&bob, &addr("SYN"), units(5), PoolStatus::Synthetic),
            Err(AmmError::NotAdmin)
        );
        let admin = market.ctx(ADMIN);
        let pid = market
            .engine
            .add_special_token(&admin, &addr("SYN"), units(5), PoolStatus::Synthetic)
            .unwrap();
        let pool = market.engine.pool(&addr("SYN")).unwrap();
        assert_eq!(pool.pid, pid);
        assert_eq!(pool.status, PoolStatus::Synthetic);
        assert!(pool.token_balance.is_zero());
    }
}
