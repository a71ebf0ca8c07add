//! Seeded trade simulation against a full engine and router.
//!
//! A [`scenario::ScenarioConfig`] describes pools, balances and the trading
//! workload. [`runner::run_simulation`] builds the market, replays randomly
//! sized trades through the router and reports volume, fees, failures by
//! error code and whether vCash accounting stayed balanced.

/// Simulation errors.
pub mod error;
/// Random trade generation.
pub mod generator;
/// Reference price paths for official pools.
pub mod price_path;
/// Prelude for convenient imports.
pub mod prelude;
/// Simulation loop and summary.
pub mod runner;
/// Scenario description and market construction.
pub mod scenario;
/// Trade size distributions.
pub mod trade_size;
