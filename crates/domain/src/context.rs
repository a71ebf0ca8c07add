use crate::address::Address;

/// Host-supplied facts about the call being executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller.
    pub caller: Address,
    /// End user the caller acts for; only honoured when the caller is the bound router.
    pub on_behalf_of: Option<Address>,
    pub block_number: u64,
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(caller: impl Into<Address>, block_number: u64, timestamp: u64) -> Self {
        Self {
            caller: caller.into(),
            on_behalf_of: None,
            block_number,
            timestamp,
        }
    }

    /// Context for a nested call made by `intermediary` on behalf of this caller.
    #[must_use]
    pub fn delegate(&self, intermediary: &Address) -> Self {
        Self {
            caller: intermediary.clone(),
            on_behalf_of: Some(self.caller.clone()),
            block_number: self.block_number,
            timestamp: self.timestamp,
        }
    }
}
