//! Pool accounting, liquidity lifecycle and governance for the vCash AMM.
//!
//! [`Engine`] owns every pool, the liquidity share ledger and the permission
//! table. Operations run inside [`Engine::transact`], which stages token
//! movements in a [`settlement::Settlement`] and commits them to an
//! [`vamm_domain::ledger::AssetLedger`] only when the whole operation succeeds.

/// Engine aggregate and transaction boundary.
pub mod engine;
/// Engine events.
pub mod events;
/// Admin configuration and roles.
pub mod governance;
/// Pool creation.
pub mod listing;
/// Liquidity deposits, withdrawals and share transfers.
pub mod liquidity;
/// Admin and capability table.
pub mod permissions;
/// Withdrawal and share transfer locks.
pub mod policy;
/// Debt settlement and price maintenance.
pub mod rebalance;
/// Staged ledger operations.
pub mod settlement;
/// Liquidity share balances.
pub mod shares;
/// Snapshot export, restore and migration.
pub mod state;
/// Quotes and swap settlement.
pub mod swap;
/// Read-only queries.
pub mod views;
/// Prelude for convenient imports.
pub mod prelude;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::Engine;
