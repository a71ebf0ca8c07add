//! Core domain types for the vCash AMM.
//!
//! Every listed asset has a pool priced against vCash, a synthetic unit of
//! account. This crate holds the records, formulas and error taxonomy shared
//! by the engine, the router and the tooling around them.

/// Account and asset identities.
pub mod address;
/// Engine configuration records.
pub mod config;
/// Per-call execution context.
pub mod context;
/// Status and capability enums.
pub mod enums;
/// Error types.
pub mod error;
/// Asset ledger interface.
pub mod ledger;
/// Fixed-point math and pricing.
pub mod math;
/// Pool accounting record.
pub mod pool;
/// Liquidity positions.
pub mod position;
/// Prelude for convenient imports.
pub mod prelude;
