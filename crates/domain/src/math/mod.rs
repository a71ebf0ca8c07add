//! Fixed-point arithmetic and pool pricing formulas.

/// Single-pool price impact formulas.
pub mod pricing;
/// Wad (18-decimal) helpers.
pub mod wad;

pub use pricing::{FEE_DENOMINATOR, PriceImpact};
pub use wad::{from_decimal, to_decimal, units, wad};
