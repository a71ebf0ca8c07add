//! The engine aggregate and its transaction boundary.

use crate::events::{EngineEvent, EventLog, EventRecord};
use crate::permissions::PermissionTable;
use crate::settlement::Settlement;
use crate::shares::ShareLedger;
use primitive_types::U256;
use std::collections::BTreeMap;
use tracing::{info, warn};
use vamm_domain::address::Address;
use vamm_domain::config::EngineConfig;
use vamm_domain::context::CallContext;
use vamm_domain::error::{AmmError, Result};
use vamm_domain::ledger::AssetLedger;
use vamm_domain::pool::Pool;

/// Everything an operation may mutate. Cloned as the rollback snapshot.
#[derive(Debug, Clone)]
pub(crate) struct EngineState {
    pub(crate) config: EngineConfig,
    pub(crate) permissions: PermissionTable,
    pub(crate) pools: BTreeMap<Address, Pool>,
    pub(crate) shares: ShareLedger,
    /// Insurance amount recorded per asset by the admin.
    pub(crate) token_insurance: BTreeMap<Address, U256>,
    pub(crate) next_pid: u64,
}

/// Pool accounting core, liquidity manager and governance control.
///
/// All mutating operations take `&mut self`, so calls are strictly serialized
/// and no operation can observe another one half-applied.
#[derive(Debug)]
pub struct Engine {
    address: Address,
    pub(crate) state: EngineState,
    pub(crate) events: EventLog,
}

impl Engine {
    /// Creates an engine identified by `address` and administered by `admin`.
    ///
    /// The config must pass the bounds the governance setters enforce, and the
    /// router is bound afterwards through [`Engine::bind_router`].
    pub fn new(address: impl Into<Address>, admin: impl Into<Address>, config: EngineConfig) -> Result<Self> {
        if config.router.is_some() {
            return Err(AmmError::RouterAlreadyBound);
        }
        config.validate()?;
        let address = address.into();
        let admin = admin.into();
        info!(engine = %address, admin = %admin, fees = config.fees, dev_fee = config.dev_fee, "Engine created");
        Ok(Self {
            address,
            state: EngineState {
                config,
                permissions: PermissionTable::new(admin),
                pools: BTreeMap::new(),
                shares: ShareLedger::default(),
                token_insurance: BTreeMap::new(),
                next_pid: 1,
            },
            events: EventLog::default(),
        })
    }

    pub(crate) fn from_state(address: Address, state: EngineState) -> Self {
        Self {
            address,
            state,
            events: EventLog::default(),
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Runs `operation` atomically.
    ///
    /// The operation mutates engine state and stages ledger operations into a
    /// [`Settlement`]; the settlement is applied only after the operation
    /// succeeds. If the operation or the ledger fails, engine state and events
    /// are restored to what they were before the call.
    pub fn transact<L, T, F>(&mut self, ledger: &mut L, operation: F) -> Result<T>
    where
        L: AssetLedger + ?Sized,
        F: FnOnce(&mut Engine, &mut Settlement) -> Result<T>,
    {
        let snapshot = self.state.clone();
        let mark = self.events.mark();
        let mut settlement = Settlement::new();

        let outcome = operation(self, &mut settlement).and_then(|value| {
            ledger.apply(settlement.ops())?;
            Ok(value)
        });

        if let Err(err) = &outcome {
            warn!(code = err.code(), error = %err, "Operation rolled back");
            self.state = snapshot;
            self.events.rollback(mark);
        }
        outcome
    }

    /// Drains committed events.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }

    /// Events committed since the last drain.
    pub fn pending_events(&self) -> &[EventRecord] {
        self.events.pending()
    }

    pub(crate) fn emit(&mut self, ctx: &CallContext, event: EngineEvent) {
        self.events.push(ctx.block_number, ctx.timestamp, event);
    }

    /// Account an operation acts for: the end user when called through the
    /// bound router, otherwise the caller itself.
    pub(crate) fn acting_account(&self, ctx: &CallContext) -> Result<Address> {
        match &ctx.on_behalf_of {
            Some(user) => {
                self.require_router(ctx)?;
                Ok(user.clone())
            }
            None => Ok(ctx.caller.clone()),
        }
    }

    pub(crate) fn require_router(&self, ctx: &CallContext) -> Result<()> {
        match &self.state.config.router {
            Some(router) if *router == ctx.caller => Ok(()),
            _ => Err(AmmError::NotRouter),
        }
    }

    pub(crate) fn require_admin(&self, ctx: &CallContext) -> Result<()> {
        self.state.permissions.require_admin(&ctx.caller)
    }

    pub(crate) fn pool_mut(&mut self, asset: &Address) -> Result<&mut Pool> {
        self.state
            .pools
            .get_mut(asset)
            .ok_or_else(|| AmmError::NoPool(asset.clone()))
    }
}
