//! Lock rules for withdrawing and transferring liquidity shares.
//!
//! Both checks are pure functions of the pool, the holder's position and the
//! clock so they can be evaluated without touching engine state.

use vamm_domain::config::LockConfig;
use vamm_domain::error::{AmmError, Result};
use vamm_domain::pool::Pool;
use vamm_domain::position::LiquidityPosition;

/// Facts about the holder needed to evaluate a lock.
#[derive(Debug, Clone, Copy)]
pub struct HolderState<'a> {
    pub position: &'a LiquidityPosition,
    /// No other holder of the pool has strictly more shares.
    pub is_top_holder: bool,
}

/// Rejects a withdrawal made before the deposit lock or top-holder lock expires.
pub fn check_withdrawal(
    pool: &Pool,
    holder: HolderState<'_>,
    now: u64,
    locks: &LockConfig,
) -> Result<()> {
    if now < holder.position.unlocked_at(locks.deposit_lock(pool.status)) {
        return Err(AmmError::WrongTime);
    }
    if holder.is_top_holder && locks.top_holder_locked(pool.status, pool.created_at, now) {
        return Err(AmmError::TopHolderLocked);
    }
    Ok(())
}

/// Rejects a share transfer under the same locks, unless the recipient is exempt.
pub fn check_share_transfer(
    pool: &Pool,
    sender: HolderState<'_>,
    recipient_exempt: bool,
    now: u64,
    locks: &LockConfig,
) -> Result<()> {
    if recipient_exempt {
        return Ok(());
    }
    if now < sender.position.unlocked_at(locks.deposit_lock(pool.status)) {
        return Err(AmmError::TransferTooEarly);
    }
    if sender.is_top_holder && locks.top_holder_locked(pool.status, pool.created_at, now) {
        return Err(AmmError::TransferTopHolder);
    }
    Ok(())
}
