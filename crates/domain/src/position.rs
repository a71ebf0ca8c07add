use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// A holder's stake in one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    pub share_balance: U256,
    /// Timestamp of the most recent deposit or share receipt.
    pub last_deposit_at: u64,
}

impl LiquidityPosition {
    /// Earliest timestamp at which the position clears a lock of `lock_secs`.
    pub fn unlocked_at(&self, lock_secs: u64) -> u64 {
        self.last_deposit_at.saturating_add(lock_secs)
    }
}
