//! Prelude module for convenient imports.
//!
//! ```rust
//! use vamm_domain::prelude::*;
//! ```

pub use crate::address::Address;
pub use crate::config::{EngineConfig, LockConfig};
pub use crate::context::CallContext;
pub use crate::enums::{Capability, PoolStatus};
pub use crate::error::{AmmError, ErrorKind, LedgerError, Result};
pub use crate::ledger::{AssetLedger, InMemoryLedger, LedgerOp};
pub use crate::math::{FEE_DENOMINATOR, from_decimal, to_decimal, units, wad};
pub use crate::pool::Pool;
pub use crate::position::LiquidityPosition;
pub use primitive_types::U256;
