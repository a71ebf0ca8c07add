//! Prelude module for convenient imports.
//!
//! ```rust
//! use vamm_simulation::prelude::*;
//! ```

pub use crate::error::SimulationError;
pub use crate::generator::{Trade, TradeGenerator};
pub use crate::price_path::GeometricBrownianMotion;
pub use crate::runner::{SimulationSummary, run_simulation};
pub use crate::scenario::{Market, PoolSpec, ScenarioConfig, WorkloadConfig};
pub use crate::trade_size::{ConstantSize, LogNormalSize, TradeSizeModel, TradeSizeSpec};
