//! Read-only queries.

use crate::engine::Engine;
use crate::permissions::PermissionTable;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use vamm_domain::address::Address;
use vamm_domain::config::EngineConfig;
use vamm_domain::enums::{Capability, PoolStatus};
use vamm_domain::error::{AmmError, Result};
use vamm_domain::pool::Pool;
use vamm_domain::position::LiquidityPosition;

/// Valuation snapshot of one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    pub asset: Address,
    pub pid: u64,
    pub status: PoolStatus,
    pub price: U256,
    pub token_balance: U256,
    pub token_value: U256,
    pub vcash_debt: U256,
    pub vcash_credit: U256,
    /// `None` when debt exceeds everything the pool holds.
    pub pool_value: Option<U256>,
    pub total_shares: U256,
    pub last_traded_block: Option<u64>,
    pub created_at: Option<u64>,
}

impl Engine {
    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.state.permissions
    }

    pub fn admin(&self) -> &Address {
        self.state.permissions.admin()
    }

    pub fn has_capability(&self, capability: Capability, account: &Address) -> bool {
        self.state.permissions.has(capability, account)
    }

    pub fn pool(&self, asset: &Address) -> Result<&Pool> {
        self.state
            .pools
            .get(asset)
            .ok_or_else(|| AmmError::NoPool(asset.clone()))
    }

    /// Insurance recorded for `asset`; zero when none was set.
    pub fn token_insurance(&self, asset: &Address) -> U256 {
        self.state
            .token_insurance
            .get(asset)
            .copied()
            .unwrap_or_default()
    }

    /// Metadata URI template of the liquidity shares.
    pub fn share_uri(&self) -> &str {
        self.state.shares.uri()
    }

    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.state.pools.values()
    }

    pub fn pool_info(&self, asset: &Address) -> Result<PoolInfo> {
        let pool = self.pool(asset)?;
        Ok(PoolInfo {
            asset: pool.asset.clone(),
            pid: pool.pid,
            status: pool.status,
            price: pool.price,
            token_balance: pool.token_balance,
            token_value: pool.token_value()?,
            vcash_debt: pool.vcash_debt,
            vcash_credit: pool.vcash_credit,
            pool_value: pool.value()?,
            total_shares: self.state.shares.total_supply(pool.pid),
            last_traded_block: pool.last_traded_block,
            created_at: pool.created_at,
        })
    }

    pub fn position(&self, asset: &Address, holder: &Address) -> Result<Option<&LiquidityPosition>> {
        let pid = self.pool(asset)?.pid;
        Ok(self.state.shares.position(pid, holder))
    }

    pub fn share_balance(&self, asset: &Address, holder: &Address) -> Result<U256> {
        let pid = self.pool(asset)?.pid;
        Ok(self.state.shares.balance_of(pid, holder))
    }

    pub fn total_shares(&self, asset: &Address) -> Result<U256> {
        let pid = self.pool(asset)?.pid;
        Ok(self.state.shares.total_supply(pid))
    }

    pub fn top_holder(&self, asset: &Address) -> Result<Option<(Address, U256)>> {
        let pid = self.pool(asset)?.pid;
        Ok(self
            .state
            .shares
            .top_holder(pid)
            .map(|(holder, balance)| (holder.clone(), balance)))
    }

    /// Net vCash put into circulation by all pools: `(amount, is_positive)`.
    pub fn net_vcash_issued(&self) -> Result<(U256, bool)> {
        let mut debt = U256::zero();
        let mut credit = U256::zero();
        for pool in self.state.pools.values() {
            debt = debt.checked_add(pool.vcash_debt).ok_or(AmmError::MathOverflow)?;
            credit = credit
                .checked_add(pool.vcash_credit)
                .ok_or(AmmError::MathOverflow)?;
        }
        Ok(if debt >= credit {
            (debt - credit, true)
        } else {
            (credit - debt, false)
        })
    }
}
