//! Versioned snapshot of engine state for export and restore.
//!
//! Schema history:
//! - v1: pool records without `last_traded_block` and `created_at`.
//! - v2: current layout.

use crate::engine::{Engine, EngineState};
use crate::permissions::PermissionTable;
use crate::shares::{PoolShares, ShareLedger};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;
use vamm_domain::address::Address;
use vamm_domain::config::EngineConfig;
use vamm_domain::enums::PoolStatus;
use vamm_domain::error::{AmmError, Result};
use vamm_domain::pool::Pool;

pub const SCHEMA_VERSION: u32 = 2;

/// Everything needed to rebuild an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub schema_version: u32,
    pub engine: Address,
    pub config: EngineConfig,
    pub permissions: PermissionTable,
    pub pools: Vec<Pool>,
    pub shares: BTreeMap<u64, PoolShares>,
    pub next_pid: u64,
    #[serde(default)]
    pub token_insurance: BTreeMap<Address, U256>,
    #[serde(default)]
    pub share_uri: String,
}

/// Pool record as written by schema v1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRecordV1 {
    pub pid: u64,
    pub asset: Address,
    pub price: U256,
    pub token_balance: U256,
    pub vcash_debt: U256,
    pub vcash_credit: U256,
    pub status: PoolStatus,
}

/// Schema v1 snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStateV1 {
    pub schema_version: u32,
    pub engine: Address,
    pub config: EngineConfig,
    pub permissions: PermissionTable,
    pub pools: Vec<PoolRecordV1>,
    pub shares: BTreeMap<u64, PoolShares>,
    pub next_pid: u64,
}

impl PersistedStateV1 {
    /// Upgrades to the current schema.
    ///
    /// v1 kept neither creation time nor trading height, so every funded pool
    /// is treated as created at `migrated_at` and as last traded at
    /// `migrated_block`. Top-holder windows and price cooldowns restart.
    pub fn migrate(self, migrated_at: u64, migrated_block: u64) -> Result<PersistedState> {
        if self.schema_version != 1 {
            return Err(AmmError::UnsupportedSchema(self.schema_version));
        }
        let pools = self
            .pools
            .into_iter()
            .map(|record| {
                let funded = self
                    .shares
                    .get(&record.pid)
                    .is_some_and(|shares| !shares.total_supply.is_zero());
                Pool {
                    pid: record.pid,
                    asset: record.asset,
                    price: record.price,
                    token_balance: record.token_balance,
                    vcash_debt: record.vcash_debt,
                    vcash_credit: record.vcash_credit,
                    status: record.status,
                    last_traded_block: Some(migrated_block),
                    created_at: funded.then_some(migrated_at),
                }
            })
            .collect::<Vec<_>>();
        info!(pools = pools.len(), migrated_at, migrated_block, "Migrated state from schema v1");
        Ok(PersistedState {
            schema_version: SCHEMA_VERSION,
            engine: self.engine,
            config: self.config,
            permissions: self.permissions,
            pools,
            shares: self.shares,
            next_pid: self.next_pid,
            token_insurance: BTreeMap::new(),
            share_uri: String::new(),
        })
    }
}

/// Reads a snapshot of any supported schema from JSON. Older schemas are
/// migrated as of `migrated_at` and `migrated_block`.
pub fn load_state(
    json: &str,
    migrated_at: u64,
    migrated_block: u64,
) -> std::result::Result<PersistedState, LoadError> {
    #[derive(Deserialize)]
    struct Probe {
        schema_version: u32,
    }

    let probe: Probe = serde_json::from_str(json)?;
    match probe.schema_version {
        1 => {
            let legacy: PersistedStateV1 = serde_json::from_str(json)?;
            Ok(legacy.migrate(migrated_at, migrated_block)?)
        }
        SCHEMA_VERSION => Ok(serde_json::from_str(json)?),
        other => Err(AmmError::UnsupportedSchema(other).into()),
    }
}

/// Failure to read a persisted snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid state: {0}")]
    Engine(#[from] AmmError),
}

impl Engine {
    pub fn export_state(&self) -> PersistedState {
        PersistedState {
            schema_version: SCHEMA_VERSION,
            engine: self.address().clone(),
            config: self.state.config.clone(),
            permissions: self.state.permissions.clone(),
            pools: self.state.pools.values().cloned().collect(),
            shares: self
                .state
                .shares
                .pools()
                .map(|(pid, shares)| (*pid, shares.clone()))
                .collect(),
            next_pid: self.state.next_pid,
            token_insurance: self.state.token_insurance.clone(),
            share_uri: self.state.shares.uri().to_string(),
        }
    }

    /// Rebuilds an engine from a current-schema snapshot. The event log starts empty.
    pub fn restore(snapshot: PersistedState) -> Result<Self> {
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(AmmError::UnsupportedSchema(snapshot.schema_version));
        }
        snapshot.config.validate()?;
        let pools = snapshot
            .pools
            .into_iter()
            .map(|pool| (pool.asset.clone(), pool))
            .collect();
        Ok(Engine::from_state(
            snapshot.engine,
            EngineState {
                config: snapshot.config,
                permissions: snapshot.permissions,
                pools,
                shares: ShareLedger::from_parts(snapshot.shares, snapshot.share_uri),
                token_insurance: snapshot.token_insurance,
                next_pid: snapshot.next_pid,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use vamm_domain::context::CallContext;
    use vamm_domain::math::units;

    #[test]
    fn test_restore_reproduces_engine() {
        let mut market = Market::standard();
        market.swap_in("bob", WETH, DAI, units(3), "bob").unwrap();
        let admin = market.ctx(ADMIN);
        market.engine.set_token_insurance(&admin, &addr(UNI), units(100)).unwrap();
        market
            .engine
            .set_share_uri(&admin, "https://shares.example/{id}.json")
            .unwrap();

        let json = serde_json::to_string(&market.engine.export_state()).unwrap();
        let restored = Engine::restore(load_state(&json, 0, 0).unwrap()).unwrap();

        for asset in [WETH, DAI, UNI, COMP] {
            assert_eq!(
                restored.pool_info(&addr(asset)).unwrap(),
                market.engine.pool_info(&addr(asset)).unwrap()
            );
        }
        assert_eq!(restored.config(), market.engine.config());
        assert_eq!(restored.admin(), &addr(ADMIN));
        assert_eq!(restored.token_insurance(&addr(UNI)), units(100));
        assert_eq!(restored.share_uri(), "https://shares.example/{id}.json");
        assert!(restored.pending_events().is_empty());
    }

    #[test]
    fn test_v1_migration_restarts_lock_windows() {
        let mut market = Market::standard();
        market.swap_in("bob", WETH, DAI, units(1), "bob").unwrap();
        let current = market.engine.export_state();
        let legacy = PersistedStateV1 {
            schema_version: 1,
            engine: current.engine.clone(),
            config: current.config.clone(),
            permissions: current.permissions.clone(),
            pools: current
                .pools
                .iter()
                .map(|pool| PoolRecordV1 {
                    pid: pool.pid,
                    asset: pool.asset.clone(),
                    price: pool.price,
                    token_balance: pool.token_balance,
                    vcash_debt: pool.vcash_debt,
                    vcash_credit: pool.vcash_credit,
                    status: pool.status,
                })
                .collect(),
            shares: current.shares.clone(),
            next_pid: current.next_pid,
        };
        let json = serde_json::to_string(&legacy).unwrap();

        let migrated = load_state(&json, 42, 5_000).unwrap();
        assert_eq!(migrated.schema_version, SCHEMA_VERSION);
        assert!(migrated.pools.iter().all(|pool| pool.created_at == Some(42)));
        assert!(migrated.pools.iter().all(|pool| pool.last_traded_block == Some(5_000)));
        assert!(migrated.token_insurance.is_empty());

        // the cooldown counts from the migration height
        let mut engine = Engine::restore(migrated).unwrap();
        let early = CallContext::new(ADMIN, 5_001, 0);
        assert_eq!(
            engine.update_pool_price(&early, &addr(WETH), units(310)),
            Err(AmmError::TooEarly)
        );
        let later = CallContext::new(ADMIN, 11_000, 0);
        engine.update_pool_price(&later, &addr(WETH), units(310)).unwrap();
    }

    #[test]
    fn test_restore_rejects_out_of_bounds_config() {
        let market = Market::standard();
        let mut snapshot = market.engine.export_state();
        snapshot.config.fees = 5_000;
        assert_eq!(
            Engine::restore(snapshot).err(),
            Some(AmmError::FeeTooHigh(5_000))
        );
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let json = r#"{"schema_version": 7}"#;
        assert!(matches!(
            load_state(json, 0, 0),
            Err(LoadError::Engine(AmmError::UnsupportedSchema(7)))
        ));
    }
}
