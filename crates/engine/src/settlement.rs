//! Ledger operations staged during an engine call.

use primitive_types::U256;
use vamm_domain::address::Address;
use vamm_domain::ledger::LedgerOp;

/// Ledger operations collected while an operation runs.
///
/// A settlement only exists inside [`crate::Engine::transact`], which applies it
/// to the ledger after the engine state has been fully updated.
#[derive(Debug, Default)]
pub struct Settlement {
    ops: Vec<LedgerOp>,
}

impl Settlement {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn transfer(&mut self, asset: &Address, from: &Address, to: &Address, amount: U256) {
        if amount.is_zero() || from == to {
            return;
        }
        self.ops.push(LedgerOp::Transfer {
            asset: asset.clone(),
            from: from.clone(),
            to: to.clone(),
            amount,
        });
    }

    pub fn mint(&mut self, asset: &Address, to: &Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        self.ops.push(LedgerOp::Mint {
            asset: asset.clone(),
            to: to.clone(),
            amount,
        });
    }

    pub fn burn(&mut self, asset: &Address, from: &Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        self.ops.push(LedgerOp::Burn {
            asset: asset.clone(),
            from: from.clone(),
            amount,
        });
    }

    pub fn wrap_native(&mut self, holder: &Address, amount: U256) {
        if !amount.is_zero() {
            self.ops.push(LedgerOp::Wrap {
                holder: holder.clone(),
                amount,
            });
        }
    }

    pub fn unwrap_native(&mut self, holder: &Address, amount: U256) {
        if !amount.is_zero() {
            self.ops.push(LedgerOp::Unwrap {
                holder: holder.clone(),
                amount,
            });
        }
    }

    pub fn ops(&self) -> &[LedgerOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_amounts_are_skipped() {
        let mut settlement = Settlement::new();
        let dai = Address::from("DAI");
        let alice = Address::from("alice");
        settlement.transfer(&dai, &alice, &Address::from("bob"), U256::zero());
        settlement.mint(&dai, &alice, U256::zero());
        settlement.transfer(&dai, &alice, &alice, U256::one());
        assert!(settlement.is_empty());
        settlement.burn(&dai, &alice, U256::one());
        assert_eq!(settlement.ops().len(), 1);
    }
}
