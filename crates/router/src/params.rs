//! Parameters accepted by the router.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use vamm_domain::address::Address;

/// Swap exactly `amount_in` of `asset_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInput {
    /// Asset paid; may be the native asset.
    pub asset_in: Address,
    /// Asset received; may be the native asset.
    pub asset_out: Address,
    pub amount_in: U256,
    /// Fails with `INSUFF_OUTPUT` below this.
    pub amount_out_min: U256,
    pub to: Address,
    /// Last timestamp at which the swap may execute.
    pub deadline: u64,
}

/// Swap for exactly `amount_out` of `asset_out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutput {
    pub asset_in: Address,
    pub asset_out: Address,
    pub amount_out: U256,
    /// Fails with `EXCESSIVE_INPUT` above this.
    pub amount_in_max: U256,
    pub to: Address,
    pub deadline: u64,
}

/// Token deposit into a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLiquidity {
    /// Pool asset; the native asset deposits into the wrapped pool.
    pub asset: Address,
    pub token_amount: U256,
    /// Receives the minted shares.
    pub to: Address,
    pub deadline: u64,
}

impl AddLiquidity {
    pub fn new(asset: impl Into<Address>, token_amount: U256, to: impl Into<Address>, deadline: u64) -> Self {
        Self {
            asset: asset.into(),
            token_amount,
            to: to.into(),
            deadline,
        }
    }
}
