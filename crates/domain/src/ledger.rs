//! Fungible asset ledger interface and an in-memory implementation.

use crate::address::Address;
use crate::error::LedgerError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A single balance movement staged by the engine or router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOp {
    Transfer {
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    Mint {
        asset: Address,
        to: Address,
        amount: U256,
    },
    Burn {
        asset: Address,
        from: Address,
        amount: U256,
    },
    /// Native asset of `holder` becomes the wrapped asset one to one.
    Wrap { holder: Address, amount: U256 },
    /// Wrapped asset of `holder` becomes the native asset one to one.
    Unwrap { holder: Address, amount: U256 },
}

/// The ledger holding real asset balances.
pub trait AssetLedger {
    /// Current balance of `holder` in `asset`.
    fn balance_of(&self, asset: &Address, holder: &Address) -> U256;

    /// Total supply of `asset`.
    fn total_supply(&self, asset: &Address) -> U256;

    /// Applies `ops` in order. Either every operation takes effect or none does.
    fn apply(&mut self, ops: &[LedgerOp]) -> Result<(), LedgerError>;
}

/// Balances held in memory, with optional native/wrapped pairing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    balances: BTreeMap<Address, BTreeMap<Address, U256>>,
    supplies: BTreeMap<Address, U256>,
    native: Option<(Address, Address)>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs the native asset with its wrapped form for `Wrap`/`Unwrap`.
    #[must_use]
    pub fn with_native(mut self, native: impl Into<Address>, wrapped: impl Into<Address>) -> Self {
        self.native = Some((native.into(), wrapped.into()));
        self
    }

    /// Credits `amount` of `asset` to `holder` outside of any settlement.
    pub fn deposit(&mut self, asset: &Address, holder: &Address, amount: U256) -> Result<(), LedgerError> {
        self.apply(&[LedgerOp::Mint {
            asset: asset.clone(),
            to: holder.clone(),
            amount,
        }])
    }

    /// All non-zero balances of `asset`.
    pub fn holders(&self, asset: &Address) -> Vec<(Address, U256)> {
        self.balances
            .get(asset)
            .map(|accounts| {
                accounts
                    .iter()
                    .filter(|(_, balance)| !balance.is_zero())
                    .map(|(holder, balance)| (holder.clone(), *balance))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn credit(&mut self, asset: &Address, holder: &Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self
            .balances
            .entry(asset.clone())
            .or_default()
            .entry(holder.clone())
            .or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::SupplyOverflow(asset.clone()))?;
        Ok(())
    }

    fn debit(&mut self, asset: &Address, holder: &Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(asset, holder);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset: asset.clone(),
                holder: holder.clone(),
                needed: amount,
                available,
            });
        }
        if let Some(balance) = self
            .balances
            .get_mut(asset)
            .and_then(|accounts| accounts.get_mut(holder))
        {
            *balance = available - amount;
        }
        Ok(())
    }

    fn grow_supply(&mut self, asset: &Address, amount: U256) -> Result<(), LedgerError> {
        let supply = self.supplies.entry(asset.clone()).or_default();
        *supply = supply
            .checked_add(amount)
            .ok_or_else(|| LedgerError::SupplyOverflow(asset.clone()))?;
        Ok(())
    }

    fn shrink_supply(&mut self, asset: &Address, amount: U256) {
        let supply = self.supplies.entry(asset.clone()).or_default();
        *supply = supply.saturating_sub(amount);
    }

    fn native_pair(&self) -> Result<(Address, Address), LedgerError> {
        self.native.clone().ok_or(LedgerError::WrappingUnavailable)
    }

    fn apply_one(&mut self, op: &LedgerOp) -> Result<(), LedgerError> {
        match op {
            LedgerOp::Transfer {
                asset,
                from,
                to,
                amount,
            } => {
                self.debit(asset, from, *amount)?;
                self.credit(asset, to, *amount)
            }
            LedgerOp::Mint { asset, to, amount } => {
                self.grow_supply(asset, *amount)?;
                self.credit(asset, to, *amount)
            }
            LedgerOp::Burn {
                asset,
                from,
                amount,
            } => {
                self.debit(asset, from, *amount)?;
                self.shrink_supply(asset, *amount);
                Ok(())
            }
            LedgerOp::Wrap { holder, amount } => {
                let (native, wrapped) = self.native_pair()?;
                self.debit(&native, holder, *amount)?;
                self.shrink_supply(&native, *amount);
                self.grow_supply(&wrapped, *amount)?;
                self.credit(&wrapped, holder, *amount)
            }
            LedgerOp::Unwrap { holder, amount } => {
                let (native, wrapped) = self.native_pair()?;
                self.debit(&wrapped, holder, *amount)?;
                self.shrink_supply(&wrapped, *amount);
                self.grow_supply(&native, *amount)?;
                self.credit(&native, holder, *amount)
            }
        }
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, asset: &Address, holder: &Address) -> U256 {
        self.balances
            .get(asset)
            .and_then(|accounts| accounts.get(holder))
            .copied()
            .unwrap_or_default()
    }

    fn total_supply(&self, asset: &Address) -> U256 {
        self.supplies.get(asset).copied().unwrap_or_default()
    }

    fn apply(&mut self, ops: &[LedgerOp]) -> Result<(), LedgerError> {
        let mut staged = self.clone();
        for op in ops {
            staged.apply_one(op)?;
        }
        debug!(ops = ops.len(), "Ledger settlement applied");
        *self = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::units;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = InMemoryLedger::new();
        ledger.deposit(&addr("DAI"), &addr("alice"), units(10)).unwrap();
        ledger
            .apply(&[LedgerOp::Transfer {
                asset: addr("DAI"),
                from: addr("alice"),
                to: addr("bob"),
                amount: units(4),
            }])
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("DAI"), &addr("alice")), units(6));
        assert_eq!(ledger.balance_of(&addr("DAI"), &addr("bob")), units(4));
        assert_eq!(ledger.total_supply(&addr("DAI")), units(10));
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut ledger = InMemoryLedger::new();
        ledger.deposit(&addr("DAI"), &addr("alice"), units(10)).unwrap();
        let result = ledger.apply(&[
            LedgerOp::Burn {
                asset: addr("DAI"),
                from: addr("alice"),
                amount: units(5),
            },
            LedgerOp::Transfer {
                asset: addr("DAI"),
                from: addr("alice"),
                to: addr("bob"),
                amount: units(6),
            },
        ]);
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(ledger.balance_of(&addr("DAI"), &addr("alice")), units(10));
        assert_eq!(ledger.total_supply(&addr("DAI")), units(10));
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let mut ledger = InMemoryLedger::new().with_native("ETH", "WETH");
        ledger.deposit(&addr("ETH"), &addr("alice"), units(3)).unwrap();
        ledger
            .apply(&[LedgerOp::Wrap {
                holder: addr("alice"),
                amount: units(2),
            }])
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("WETH"), &addr("alice")), units(2));
        assert_eq!(ledger.balance_of(&addr("ETH"), &addr("alice")), units(1));
        ledger
            .apply(&[LedgerOp::Unwrap {
                holder: addr("alice"),
                amount: units(1),
            }])
            .unwrap();
        assert_eq!(ledger.balance_of(&addr("ETH"), &addr("alice")), units(2));
        assert_eq!(ledger.total_supply(&addr("WETH")), units(1));
    }

    #[test]
    fn test_wrap_requires_pairing() {
        let mut ledger = InMemoryLedger::new();
        let result = ledger.apply(&[LedgerOp::Wrap {
            holder: addr("alice"),
            amount: units(1),
        }]);
        assert_eq!(result, Err(LedgerError::WrappingUnavailable));
    }
}
