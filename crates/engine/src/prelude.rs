//! Prelude module for convenient imports.
//!
//! ```rust
//! use vamm_engine::prelude::*;
//! ```

pub use crate::engine::Engine;
pub use crate::events::{EngineEvent, EventRecord};
pub use crate::liquidity::{MINIMUM_LIQUIDITY, RemoveLiquidity, Withdrawal};
pub use crate::permissions::PermissionTable;
pub use crate::rebalance::{RebalanceOutcome, rebalance_tolerance};
pub use crate::settlement::Settlement;
pub use crate::state::{LoadError, PersistedState, SCHEMA_VERSION, load_state};
pub use crate::swap::{SwapOutcome, SwapQuote};
pub use crate::views::PoolInfo;
