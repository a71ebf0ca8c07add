//! Prelude module for convenient imports.
//!
//! ```rust
//! use vamm_router::prelude::*;
//! ```

pub use crate::params::{AddLiquidity, ExactInput, ExactOutput};
pub use crate::router::Router;
