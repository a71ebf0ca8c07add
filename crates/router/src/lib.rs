//! User-facing entry point to the vCash AMM engine.
//!
//! The [`Router`] enforces deadlines and slippage bounds and converts the
//! native asset to and from its wrapped form, so the engine only ever sees the
//! wrapped asset. It is the only account allowed to call the engine's swap
//! entry points.

/// Request parameters.
pub mod params;
/// The router itself.
pub mod router;
/// Prelude for convenient imports.
pub mod prelude;

pub use router::Router;
