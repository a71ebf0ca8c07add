use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Unlisted,
    Listed,
    Official,
    Synthetic,
    Paused,
}

impl PoolStatus {
    /// Pools in this state quote and settle swaps.
    pub fn is_tradable(self) -> bool {
        !matches!(self, Self::Unlisted | Self::Paused)
    }

    /// Official pools get the short withdrawal lock and no top-holder guard.
    pub fn is_official(self) -> bool {
        self == Self::Official
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unlisted => "UNLISTED",
            Self::Listed => "LISTED",
            Self::Official => "OFFICIAL",
            Self::Synthetic => "SYNTHETIC",
            Self::Paused => "PAUSED",
        };
        f.write_str(label)
    }
}

/// Roles granted through the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// May set the price of synthetic pools.
    PriceAdjuster,
    /// May list new pools while listing is closed.
    Lister,
    /// May receive time-locked shares.
    LockExemptRecipient,
}
