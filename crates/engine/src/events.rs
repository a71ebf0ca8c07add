//! Engine events.
//!
//! Every committed state change appends an [`EventRecord`]. Records staged by
//! an operation that later fails are discarded together with its state.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use vamm_domain::address::Address;
use vamm_domain::enums::{Capability, PoolStatus};

/// Something that happened inside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A pool was created.
    PoolCreated {
        asset: Address,
        pid: u64,
        price: U256,
        status: PoolStatus,
    },
    /// A swap settled.
    Swap {
        payer: Address,
        recipient: Address,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        amount_out: U256,
        vcash_value: U256,
        dev_fee: U256,
        retained_fee: U256,
    },
    /// Liquidity was deposited.
    LiquidityAdded {
        asset: Address,
        provider: Address,
        recipient: Address,
        token_amount: U256,
        vcash_amount: U256,
        shares: U256,
    },
    /// Liquidity was withdrawn.
    LiquidityRemoved {
        asset: Address,
        holder: Address,
        recipient: Address,
        shares: U256,
        token_out: U256,
        vcash_out: U256,
    },
    /// Shares changed hands.
    SharesTransferred {
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    /// Pool debt was settled in tokens.
    PoolRebalanced {
        asset: Address,
        vcash_settled: U256,
        tokens_out: U256,
    },
    /// A pool price was set directly.
    PriceUpdated {
        asset: Address,
        old_price: U256,
        new_price: U256,
        synthetic: bool,
    },
    /// A pool changed status.
    StatusUpdated {
        asset: Address,
        old_status: PoolStatus,
        new_status: PoolStatus,
    },
    /// Swap fee settings changed.
    FeesUpdated { fees: u32, dev_fee: u32 },
    /// The pool size floor changed.
    PoolSizeLimitUpdated { limit: U256 },
    /// The fee recipient changed.
    FeeToUpdated { fee_to: Address },
    /// Listing was opened or closed.
    ListingModeUpdated { open: bool },
    /// A capability was granted or revoked.
    RoleUpdated {
        capability: Capability,
        account: Address,
        granted: bool,
    },
    /// The admin role moved.
    AdminTransferred { from: Address, to: Address },
    /// The router was bound.
    RouterBound { router: Address },
    /// The insurance recorded for an asset changed.
    TokenInsuranceUpdated { asset: Address, amount: U256 },
    /// The share metadata URI changed.
    ShareUriUpdated { uri: String },
}

/// An event stamped with its position in the log and the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing across committed records.
    pub sequence: u64,
    pub block_number: u64,
    pub timestamp: u64,
    pub event: EngineEvent,
}

/// Append-only event buffer with rollback to a mark.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventLog {
    next_sequence: u64,
    pending: Vec<EventRecord>,
}

/// Position in the log to roll back to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventMark {
    len: usize,
    next_sequence: u64,
}

impl EventLog {
    pub(crate) fn push(&mut self, block_number: u64, timestamp: u64, event: EngineEvent) {
        self.pending.push(EventRecord {
            sequence: self.next_sequence,
            block_number,
            timestamp,
            event,
        });
        self.next_sequence += 1;
    }

    pub(crate) fn mark(&self) -> EventMark {
        EventMark {
            len: self.pending.len(),
            next_sequence: self.next_sequence,
        }
    }

    pub(crate) fn rollback(&mut self, mark: EventMark) {
        self.pending.truncate(mark.len);
        self.next_sequence = mark.next_sequence;
    }

    pub(crate) fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn pending(&self) -> &[EventRecord] {
        &self.pending
    }
}
