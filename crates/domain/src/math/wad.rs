//! Fixed-point helpers for 18-decimal ("wad") quantities stored in `U256`.

use crate::error::{AmmError, Result};
use primitive_types::U256;
use rust_decimal::Decimal;

/// Number of fractional digits carried by every on-ledger quantity.
pub const WAD_DECIMALS: u32 = 18;

/// `1.0` in wad representation.
pub fn wad() -> U256 {
    U256::exp10(WAD_DECIMALS as usize)
}

/// Whole units expressed as a wad, e.g. `units(300)` is `300.0`.
pub fn units(value: u64) -> U256 {
    U256::from(value) * wad()
}

/// `a * b / denominator`, rounding down.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(AmmError::MathOverflow);
    }
    let product = a.checked_mul(b).ok_or(AmmError::MathOverflow)?;
    Ok(product / denominator)
}

/// `a * b / denominator`, rounding up.
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(AmmError::MathOverflow);
    }
    let product = a.checked_mul(b).ok_or(AmmError::MathOverflow)?;
    let quotient = product / denominator;
    if (product % denominator).is_zero() {
        Ok(quotient)
    } else {
        quotient.checked_add(U256::one()).ok_or(AmmError::MathOverflow)
    }
}

/// Product of two wads.
pub fn mul_wad(a: U256, b: U256) -> Result<U256> {
    mul_div(a, b, wad())
}

/// Quotient of two wads.
pub fn div_wad(a: U256, b: U256) -> Result<U256> {
    mul_div(a, wad(), b)
}

pub fn checked_add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(AmmError::MathOverflow)
}

pub fn checked_sub(a: U256, b: U256) -> Result<U256> {
    a.checked_sub(b).ok_or(AmmError::MathOverflow)
}

/// Converts a wad into a `Decimal` for display and reporting.
///
/// Values beyond `Decimal`'s 96-bit mantissa lose low-order digits; values that
/// cannot fit at all saturate to `Decimal::MAX`.
pub fn to_decimal(value: U256) -> Decimal {
    let max_mantissa = U256::from(Decimal::MAX.mantissa() as u128);
    let mut mantissa = value;
    let mut scale = WAD_DECIMALS;
    while mantissa > max_mantissa && scale > 0 {
        mantissa /= U256::from(10u8);
        scale -= 1;
    }
    if mantissa > max_mantissa {
        return Decimal::MAX;
    }
    Decimal::from_i128_with_scale(mantissa.low_u128() as i128, scale).normalize()
}

/// Converts a non-negative `Decimal` into a wad, truncating digits beyond 18 decimals.
pub fn from_decimal(value: Decimal) -> Result<U256> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmmError::BadAmount);
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale();
    if scale > WAD_DECIMALS {
        Ok(mantissa / U256::exp10((scale - WAD_DECIMALS) as usize))
    } else {
        mantissa
            .checked_mul(U256::exp10((WAD_DECIMALS - scale) as usize))
            .ok_or(AmmError::MathOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mul_div_rounding() {
        let seven = U256::from(7);
        let two = U256::from(2);
        assert_eq!(mul_div(seven, U256::one(), two).unwrap(), U256::from(3));
        assert_eq!(mul_div_up(seven, U256::one(), two).unwrap(), U256::from(4));
        assert_eq!(mul_div_up(U256::from(8), U256::one(), two).unwrap(), U256::from(4));
    }

    #[test]
    fn test_mul_div_rejects_zero_denominator() {
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero()),
            Err(AmmError::MathOverflow)
        );
    }

    #[test]
    fn test_mul_div_overflow() {
        assert_eq!(
            mul_div(U256::MAX, U256::from(2), U256::one()),
            Err(AmmError::MathOverflow)
        );
    }

    #[test]
    fn test_wad_products() {
        assert_eq!(mul_wad(units(3), units(300)).unwrap(), units(900));
        assert_eq!(div_wad(units(900), units(3)).unwrap(), units(300));
    }

    #[test]
    fn test_decimal_conversion() {
        assert_eq!(to_decimal(units(300)), dec!(300));
        assert_eq!(to_decimal(wad() / U256::from(4)), dec!(0.25));
        assert_eq!(from_decimal(dec!(1.5)).unwrap(), units(3) / U256::from(2));
        assert_eq!(from_decimal(dec!(0)).unwrap(), U256::zero());
        assert_eq!(from_decimal(dec!(-1)), Err(AmmError::BadAmount));
    }

    #[test]
    fn test_to_decimal_large_values_keep_magnitude() {
        // 10^12 units exceeds the mantissa at full wad scale
        let big = units(1_000_000_000_000);
        assert_eq!(to_decimal(big), dec!(1000000000000));
    }
}
