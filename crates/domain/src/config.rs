//! Engine configuration records.

use crate::address::Address;
use crate::enums::PoolStatus;
use crate::error::{AmmError, Result};
use crate::math::units;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Default swap fee, out of `FEE_DENOMINATOR` (0.30%).
pub const DEFAULT_FEES: u32 = 300;
/// Default dev fee, out of `FEE_DENOMINATOR` (0.05%).
pub const DEFAULT_DEV_FEE: u32 = 50;
/// Fee setters reject values at or above this ceiling.
pub const MAX_FEE: u32 = 1_000;
/// Upper bound for the pool size floor, in whole vCash.
pub const MAX_POOL_SIZE_MIN_LIMIT_UNITS: u64 = 1_000_000_000_000_000;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Time windows protecting liquidity from short-lived manipulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Withdrawal and transfer lock after a deposit into an official pool, seconds.
    pub official_lock_secs: u64,
    /// Withdrawal and transfer lock for every other pool status, seconds.
    pub default_lock_secs: u64,
    /// How long after pool creation the top holder stays locked, seconds.
    pub top_holder_lock_secs: u64,
    /// Blocks that must pass after a trade before an admin price update.
    pub price_update_cooldown_blocks: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            official_lock_secs: 4 * HOUR,
            default_lock_secs: DAY,
            top_holder_lock_secs: 90 * DAY,
            price_update_cooldown_blocks: 6_000,
        }
    }
}

impl LockConfig {
    /// Lock applied to deposits into a pool with `status`.
    pub fn deposit_lock(&self, status: PoolStatus) -> u64 {
        if status.is_official() {
            self.official_lock_secs
        } else {
            self.default_lock_secs
        }
    }

    /// Whether the top holder of a pool created at `created_at` is still locked at `now`.
    pub fn top_holder_locked(&self, status: PoolStatus, created_at: Option<u64>, now: u64) -> bool {
        if status.is_official() {
            return false;
        }
        match created_at {
            Some(created) => now < created.saturating_add(self.top_holder_lock_secs),
            None => true,
        }
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The synthetic unit of account.
    pub vcash: Address,
    /// Custody account holding every pool's tokens.
    pub vault: Address,
    /// Receives dev fees, rebalanced tokens and the minimum liquidity.
    pub fee_to: Address,
    /// Swap fee, out of `FEE_DENOMINATOR`.
    pub fees: u32,
    /// Part of `fees` routed to `fee_to`, out of `FEE_DENOMINATOR`.
    pub dev_fee: u32,
    /// A pool may not shrink below this value through a trade, wad vCash.
    pub pool_size_min_limit: U256,
    /// Whether anyone may list a new asset.
    pub open_listing: bool,
    /// The only caller allowed to swap; bound once.
    pub router: Option<Address>,
    pub locks: LockConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vcash: Address::from("vCash"),
            vault: Address::from("vault"),
            fee_to: Address::from("fee_to"),
            fees: DEFAULT_FEES,
            dev_fee: DEFAULT_DEV_FEE,
            pool_size_min_limit: U256::zero(),
            open_listing: true,
            router: None,
            locks: LockConfig::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_vcash(mut self, vcash: impl Into<Address>) -> Self {
        self.vcash = vcash.into();
        self
    }

    #[must_use]
    pub fn with_vault(mut self, vault: impl Into<Address>) -> Self {
        self.vault = vault.into();
        self
    }

    #[must_use]
    pub fn with_fee_to(mut self, fee_to: impl Into<Address>) -> Self {
        self.fee_to = fee_to.into();
        self
    }

    #[must_use]
    pub fn with_fees(mut self, fees: u32, dev_fee: u32) -> Self {
        self.fees = fees;
        self.dev_fee = dev_fee;
        self
    }

    #[must_use]
    pub fn with_pool_size_min_limit(mut self, limit: U256) -> Self {
        self.pool_size_min_limit = limit;
        self
    }

    #[must_use]
    pub fn with_open_listing(mut self, open: bool) -> Self {
        self.open_listing = open;
        self
    }

    #[must_use]
    pub fn with_locks(mut self, locks: LockConfig) -> Self {
        self.locks = locks;
        self
    }
}

/// Ceiling for [`EngineConfig::pool_size_min_limit`].
pub fn max_pool_size_min_limit() -> U256 {
    units(MAX_POOL_SIZE_MIN_LIMIT_UNITS)
}

/// Both rates below [`MAX_FEE`] and the dev fee no larger than the fee.
pub fn check_fees(fees: u32, dev_fee: u32) -> Result<()> {
    if fees >= MAX_FEE {
        return Err(AmmError::FeeTooHigh(fees));
    }
    if dev_fee >= MAX_FEE || dev_fee > fees {
        return Err(AmmError::DevFeeTooHigh(dev_fee));
    }
    Ok(())
}

pub fn check_pool_size_min_limit(limit: U256) -> Result<()> {
    if limit > max_pool_size_min_limit() {
        return Err(AmmError::PoolSizeLimitTooHigh);
    }
    Ok(())
}

impl EngineConfig {
    /// Applies the bounds the governance setters enforce.
    pub fn validate(&self) -> Result<()> {
        check_fees(self.fees, self.dev_fee)?;
        check_pool_size_min_limit(self.pool_size_min_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locks() {
        let locks = LockConfig::default();
        assert_eq!(locks.deposit_lock(PoolStatus::Official), 4 * HOUR);
        assert_eq!(locks.deposit_lock(PoolStatus::Listed), DAY);
        assert_eq!(locks.deposit_lock(PoolStatus::Synthetic), DAY);
    }

    #[test]
    fn test_top_holder_window() {
        let locks = LockConfig::default();
        assert!(locks.top_holder_locked(PoolStatus::Listed, Some(0), 89 * DAY));
        assert!(!locks.top_holder_locked(PoolStatus::Listed, Some(0), 90 * DAY));
        assert!(!locks.top_holder_locked(PoolStatus::Official, Some(0), DAY));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_fees(500, 100)
            .with_fee_to("treasury")
            .with_open_listing(false);
        assert_eq!(config.fees, 500);
        assert_eq!(config.dev_fee, 100);
        assert_eq!(config.fee_to, Address::from("treasury"));
        assert!(!config.open_listing);
    }

    #[test]
    fn test_validate_bounds() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
        assert_eq!(
            EngineConfig::default().with_fees(5_000, 10_000).validate(),
            Err(AmmError::FeeTooHigh(5_000))
        );
        assert_eq!(
            EngineConfig::default().with_fees(300, 400).validate(),
            Err(AmmError::DevFeeTooHigh(400))
        );
        assert_eq!(
            EngineConfig::default()
                .with_pool_size_min_limit(max_pool_size_min_limit() + U256::one())
                .validate(),
            Err(AmmError::PoolSizeLimitTooHigh)
        );
    }

    #[test]
    fn test_config_serde() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
