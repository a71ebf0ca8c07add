//! Single-pool price impact formulas.
//!
//! Each pool quotes its asset against vCash. A trade moves the pool price from
//! `P` to `P'` and settles at a price weighted toward the post-trade price:
//!
//! ```text
//! settle(P, P') = (P + 4 * P') / 5
//! ```
//!
//! Selling tokens into a pool lowers its price as `P' = P * R / (R + dx)`,
//! buying tokens raises it as `P' = P * R / (R - dx)`. When the vCash side of
//! the trade is the known quantity the same curves are expressed against the
//! pool's vCash reserve `R * P`.

use super::wad::{checked_add, checked_sub, mul_div, mul_div_up, mul_wad, wad};
use crate::error::{AmmError, Result};
use primitive_types::U256;

/// Fee and dev-fee rates are expressed over this denominator.
pub const FEE_DENOMINATOR: u32 = 100_000;

/// Weight of the post-trade price in the settlement price, out of `SETTLE_WEIGHT_TOTAL`.
const SETTLE_WEIGHT_NEW: u64 = 4;
const SETTLE_WEIGHT_TOTAL: u64 = 5;

/// Result of pricing one side of a swap against a single pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceImpact {
    /// Pool price after the trade.
    pub new_price: U256,
    /// The quantity that was solved for: vCash value or token amount.
    pub amount: U256,
}

/// Settlement price of a trade moving the pool price from `original` to `new`.
pub fn settlement_price(original: U256, new: U256) -> Result<U256> {
    let weighted = new
        .checked_mul(U256::from(SETTLE_WEIGHT_NEW))
        .ok_or(AmmError::MathOverflow)?;
    Ok(checked_add(original, weighted)? / U256::from(SETTLE_WEIGHT_TOTAL))
}

fn non_zero_price(price: U256) -> Result<U256> {
    if price.is_zero() {
        Err(AmmError::ZeroPrice)
    } else {
        Ok(price)
    }
}

/// Sells exactly `tokens` into the pool; solves for the vCash value.
pub fn sell_exact_tokens(price: U256, reserve: U256, tokens: U256) -> Result<PriceImpact> {
    let new_price = non_zero_price(mul_div(price, reserve, checked_add(reserve, tokens)?)?)?;
    let amount = mul_wad(tokens, settlement_price(price, new_price)?)?;
    Ok(PriceImpact { new_price, amount })
}

/// Buys tokens from the pool with exactly `vcash`; solves for the token amount.
pub fn buy_with_exact_vcash(price: U256, reserve: U256, vcash: U256) -> Result<PriceImpact> {
    let vcash_reserve = mul_wad(reserve, price)?;
    if vcash_reserve.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let new_price = mul_div(price, checked_add(vcash_reserve, vcash)?, vcash_reserve)?;
    let amount = mul_div(vcash, wad(), settlement_price(price, new_price)?)?;
    if amount >= reserve {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(PriceImpact { new_price, amount })
}

/// Buys exactly `tokens` from the pool; solves for the vCash cost (rounded up).
pub fn buy_exact_tokens(price: U256, reserve: U256, tokens: U256) -> Result<PriceImpact> {
    if tokens >= reserve {
        return Err(AmmError::InsufficientLiquidity);
    }
    let new_price = mul_div(price, reserve, checked_sub(reserve, tokens)?)?;
    let amount = mul_div_up(tokens, settlement_price(price, new_price)?, wad())?;
    Ok(PriceImpact { new_price, amount })
}

/// Sells tokens into the pool until it pays exactly `vcash`; solves for the
/// token amount (rounded up).
pub fn sell_for_exact_vcash(price: U256, reserve: U256, vcash: U256) -> Result<PriceImpact> {
    let vcash_reserve = mul_wad(reserve, price)?;
    if vcash_reserve.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let new_price = non_zero_price(mul_div(
        price,
        vcash_reserve,
        checked_add(vcash_reserve, vcash)?,
    )?)?;
    let settle = non_zero_price(settlement_price(price, new_price)?)?;
    let amount = mul_div_up(vcash, wad(), settle)?;
    Ok(PriceImpact { new_price, amount })
}

/// Input amount left after deducting the swap fee.
pub fn deduct_fee(amount: U256, fees: u32) -> Result<U256> {
    mul_div(
        amount,
        U256::from(FEE_DENOMINATOR - fees.min(FEE_DENOMINATOR)),
        U256::from(FEE_DENOMINATOR),
    )
}

/// Gross input whose fee-deducted part is at least `net`.
pub fn add_fee(net: U256, fees: u32) -> Result<U256> {
    let keep = FEE_DENOMINATOR.saturating_sub(fees);
    if keep == 0 {
        return Err(AmmError::MathOverflow);
    }
    mul_div_up(net, U256::from(FEE_DENOMINATOR), U256::from(keep))
}

/// `amount * rate / FEE_DENOMINATOR` valued at `price`.
pub fn fee_value(price: U256, amount: U256, rate: u32) -> Result<U256> {
    let fee_tokens = mul_div(amount, U256::from(rate), U256::from(FEE_DENOMINATOR))?;
    mul_wad(fee_tokens, price)
}

/// Half of the swap fee on `amount`, valued at `price`. Each side of a swap
/// books one half.
pub fn half_fee_value(price: U256, amount: U256, fees: u32) -> Result<U256> {
    let fee_tokens = mul_div(amount, U256::from(fees), U256::from(2 * FEE_DENOMINATOR))?;
    mul_wad(fee_tokens, price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::wad::{to_decimal, units};
    use rust_decimal_macros::dec;

    #[test]
    fn test_settlement_price_weights_new_price() {
        let p = settlement_price(units(100), units(50)).unwrap();
        assert_eq!(p, units(60));
    }

    #[test]
    fn test_sell_lowers_price() {
        let impact = sell_exact_tokens(units(300), units(500_000), units(2)).unwrap();
        assert!(impact.new_price < units(300));
        assert!(impact.new_price > units(299));
        let value = to_decimal(impact.amount);
        assert!(value > dec!(599) && value < dec!(600));
    }

    #[test]
    fn test_buy_with_vcash_raises_price() {
        let impact = buy_with_exact_vcash(units(1), units(1_000_000), units(600)).unwrap();
        assert!(impact.new_price > units(1));
        let tokens = to_decimal(impact.amount);
        assert!(tokens > dec!(599) && tokens < dec!(600));
    }

    #[test]
    fn test_buy_exact_tokens_rejects_full_reserve() {
        assert_eq!(
            buy_exact_tokens(units(1), units(10), units(10)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_buy_with_vcash_rejects_empty_pool() {
        assert_eq!(
            buy_with_exact_vcash(units(1), U256::zero(), units(1)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_buy_with_vcash_cannot_exhaust_reserve() {
        let result = buy_with_exact_vcash(units(1), units(10), units(1_000_000));
        assert_eq!(result, Err(AmmError::InsufficientLiquidity));
    }

    #[test]
    fn test_exact_out_costs_more_than_spot() {
        let impact = buy_exact_tokens(units(30), units(1_000_000), units(10)).unwrap();
        assert!(impact.amount > units(300));
        assert!(impact.amount < units(301));
    }

    #[test]
    fn test_sell_for_exact_vcash_matches_forward_direction() {
        let back = sell_for_exact_vcash(units(300), units(500_000), units(600)).unwrap();
        let forward = sell_exact_tokens(units(300), units(500_000), back.amount).unwrap();
        assert!(forward.amount >= units(600) - U256::from(1_000_000_000_000u64));
    }

    #[test]
    fn test_fee_helpers() {
        assert_eq!(deduct_fee(units(1), 300).unwrap(), units(997) / U256::from(1000));
        let gross = add_fee(units(997) / U256::from(1000), 300).unwrap();
        assert_eq!(gross, units(1));
        assert_eq!(
            fee_value(units(2), units(100), 50).unwrap(),
            units(1) / U256::from(10)
        );
        assert_eq!(
            half_fee_value(units(2), units(100), 300).unwrap(),
            units(3) / U256::from(10)
        );
    }
}
