use crate::address::Address;
use crate::enums::PoolStatus;
use crate::error::{AmmError, Result};
use crate::math::wad::{checked_add, mul_wad};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Accounting record of the pool backing one asset.
///
/// `vcash_debt` and `vcash_credit` are never both non-zero: every vCash flow
/// goes through [`Pool::record_vcash_flow`], which nets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Sequential id, keys the share ledger.
    pub pid: u64,
    pub asset: Address,
    /// Asset value in vCash, wad.
    pub price: U256,
    /// Real asset held in custody for this pool.
    pub token_balance: U256,
    /// vCash the pool has paid out beyond what it received.
    pub vcash_debt: U256,
    /// vCash the pool has received beyond what it paid out.
    pub vcash_credit: U256,
    pub status: PoolStatus,
    /// Height of the most recent swap touching the pool.
    pub last_traded_block: Option<u64>,
    /// Timestamp of the first liquidity deposit.
    pub created_at: Option<u64>,
}

impl Pool {
    pub fn new(pid: u64, asset: Address, price: U256, status: PoolStatus) -> Result<Self> {
        if price.is_zero() {
            return Err(AmmError::ZeroPrice);
        }
        Ok(Self {
            pid,
            asset,
            price,
            token_balance: U256::zero(),
            vcash_debt: U256::zero(),
            vcash_credit: U256::zero(),
            status,
            last_traded_block: None,
            created_at: None,
        })
    }

    /// Value of the token balance at the current price.
    pub fn token_value(&self) -> Result<U256> {
        mul_wad(self.token_balance, self.price)
    }

    /// `token_balance * price + credit - debt`, or `None` when debt exceeds
    /// everything the pool holds.
    pub fn value(&self) -> Result<Option<U256>> {
        let gross = checked_add(self.token_value()?, self.vcash_credit)?;
        Ok(gross.checked_sub(self.vcash_debt))
    }

    /// Nets a vCash inflow and outflow against the debt and credit accounts.
    pub fn record_vcash_flow(&mut self, vcash_in: U256, vcash_out: U256) -> Result<()> {
        let mut debt = self.vcash_debt;
        let mut credit = self.vcash_credit;

        if vcash_in > U256::zero() {
            let repaid = vcash_in.min(debt);
            debt -= repaid;
            credit = checked_add(credit, vcash_in - repaid)?;
        }
        if vcash_out > U256::zero() {
            let consumed = vcash_out.min(credit);
            credit -= consumed;
            debt = checked_add(debt, vcash_out - consumed)?;
        }

        self.vcash_debt = debt;
        self.vcash_credit = credit;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::units;

    fn pool() -> Pool {
        let mut pool = Pool::new(1, Address::from("WETH"), units(300), PoolStatus::Listed).unwrap();
        pool.token_balance = units(10);
        pool
    }

    #[test]
    fn test_zero_price_rejected() {
        let result = Pool::new(1, Address::from("WETH"), U256::zero(), PoolStatus::Listed);
        assert_eq!(result, Err(AmmError::ZeroPrice));
    }

    #[test]
    fn test_flows_net_debt_and_credit() {
        let mut pool = pool();
        pool.record_vcash_flow(U256::zero(), units(100)).unwrap();
        assert_eq!(pool.vcash_debt, units(100));
        assert!(pool.vcash_credit.is_zero());

        pool.record_vcash_flow(units(150), U256::zero()).unwrap();
        assert!(pool.vcash_debt.is_zero());
        assert_eq!(pool.vcash_credit, units(50));

        pool.record_vcash_flow(units(10), units(70)).unwrap();
        assert_eq!(pool.vcash_debt, units(10));
        assert!(pool.vcash_credit.is_zero());
    }

    #[test]
    fn test_value_includes_credit_and_debt() {
        let mut pool = pool();
        assert_eq!(pool.value().unwrap(), Some(units(3000)));
        pool.record_vcash_flow(U256::zero(), units(500)).unwrap();
        assert_eq!(pool.value().unwrap(), Some(units(2500)));
        pool.record_vcash_flow(units(600), U256::zero()).unwrap();
        assert_eq!(pool.value().unwrap(), Some(units(3100)));
    }

    #[test]
    fn test_value_unrepresentable_when_insolvent() {
        let mut pool = pool();
        pool.record_vcash_flow(U256::zero(), units(3001)).unwrap();
        assert_eq!(pool.value().unwrap(), None);
    }
}
