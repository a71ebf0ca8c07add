//! Semi-fungible liquidity share ledger keyed by pool id.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vamm_domain::address::Address;
use vamm_domain::error::{AmmError, Result};
use vamm_domain::position::LiquidityPosition;

/// Shares of a single pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolShares {
    pub total_supply: U256,
    pub positions: BTreeMap<Address, LiquidityPosition>,
}

/// Share balances of every pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    pools: BTreeMap<u64, PoolShares>,
    /// Metadata URI template shared by every pool id; clients substitute `{id}`.
    uri: String,
}

impl ShareLedger {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub(crate) fn set_uri(&mut self, uri: String) {
        self.uri = uri;
    }

    pub fn total_supply(&self, pid: u64) -> U256 {
        self.pools
            .get(&pid)
            .map(|shares| shares.total_supply)
            .unwrap_or_default()
    }

    pub fn position(&self, pid: u64, holder: &Address) -> Option<&LiquidityPosition> {
        self.pools.get(&pid)?.positions.get(holder)
    }

    pub fn balance_of(&self, pid: u64, holder: &Address) -> U256 {
        self.position(pid, holder)
            .map(|position| position.share_balance)
            .unwrap_or_default()
    }

    pub fn positions(&self, pid: u64) -> impl Iterator<Item = (&Address, &LiquidityPosition)> {
        self.pools
            .get(&pid)
            .into_iter()
            .flat_map(|shares| shares.positions.iter())
    }

    /// Largest holder of the pool; the first in address order wins a tie.
    pub fn top_holder(&self, pid: u64) -> Option<(&Address, U256)> {
        let mut top: Option<(&Address, U256)> = None;
        for (holder, position) in self.positions(pid) {
            let balance = position.share_balance;
            if balance.is_zero() {
                continue;
            }
            if top.is_none_or(|(_, best)| balance > best) {
                top = Some((holder, balance));
            }
        }
        top
    }

    /// Whether no other holder has strictly more shares than `holder`.
    pub fn is_top_holder(&self, pid: u64, holder: &Address) -> bool {
        let balance = self.balance_of(pid, holder);
        if balance.is_zero() {
            return false;
        }
        self.positions(pid)
            .all(|(other, position)| other == holder || position.share_balance <= balance)
    }

    /// Mints shares and stamps the recipient's deposit time.
    pub fn mint(&mut self, pid: u64, holder: &Address, amount: U256, now: u64) -> Result<()> {
        let shares = self.pools.entry(pid).or_default();
        shares.total_supply = shares
            .total_supply
            .checked_add(amount)
            .ok_or(AmmError::MathOverflow)?;
        let position = shares.positions.entry(holder.clone()).or_default();
        position.share_balance = position
            .share_balance
            .checked_add(amount)
            .ok_or(AmmError::MathOverflow)?;
        position.last_deposit_at = now;
        Ok(())
    }

    pub fn burn(&mut self, pid: u64, holder: &Address, amount: U256) -> Result<()> {
        let shares = self.pools.get_mut(&pid).ok_or(AmmError::InsufficientShares)?;
        let position = shares
            .positions
            .get_mut(holder)
            .ok_or(AmmError::InsufficientShares)?;
        position.share_balance = position
            .share_balance
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientShares)?;
        shares.total_supply = shares
            .total_supply
            .checked_sub(amount)
            .ok_or(AmmError::MathOverflow)?;
        Ok(())
    }

    /// Moves shares; the recipient's deposit time is refreshed.
    pub fn transfer(
        &mut self,
        pid: u64,
        from: &Address,
        to: &Address,
        amount: U256,
        now: u64,
    ) -> Result<()> {
        self.burn(pid, from, amount)?;
        self.mint(pid, to, amount, now)
    }

    pub(crate) fn pools(&self) -> impl Iterator<Item = (&u64, &PoolShares)> {
        self.pools.iter()
    }

    pub(crate) fn from_parts(pools: BTreeMap<u64, PoolShares>, uri: String) -> Self {
        Self { pools, uri }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::from(s)
    }

    #[test]
    fn test_mint_burn_track_supply() {
        let mut ledger = ShareLedger::default();
        ledger.mint(1, &addr("alice"), U256::from(100), 5).unwrap();
        ledger.mint(1, &addr("bob"), U256::from(40), 6).unwrap();
        assert_eq!(ledger.total_supply(1), U256::from(140));

        ledger.burn(1, &addr("alice"), U256::from(30)).unwrap();
        assert_eq!(ledger.total_supply(1), U256::from(110));
        assert_eq!(ledger.balance_of(1, &addr("alice")), U256::from(70));
        assert_eq!(
            ledger.burn(1, &addr("bob"), U256::from(41)),
            Err(AmmError::InsufficientShares)
        );
    }

    #[test]
    fn test_top_holder() {
        let mut ledger = ShareLedger::default();
        ledger.mint(1, &addr("alice"), U256::from(100), 0).unwrap();
        ledger.mint(1, &addr("bob"), U256::from(40), 0).unwrap();
        assert!(ledger.is_top_holder(1, &addr("alice")));
        assert!(!ledger.is_top_holder(1, &addr("bob")));

        ledger.mint(1, &addr("bob"), U256::from(61), 0).unwrap();
        assert!(!ledger.is_top_holder(1, &addr("alice")));
        assert_eq!(ledger.top_holder(1), Some((&addr("bob"), U256::from(101))));
        assert!(!ledger.is_top_holder(1, &addr("carol")));
    }

    #[test]
    fn test_transfer_refreshes_recipient() {
        let mut ledger = ShareLedger::default();
        ledger.mint(1, &addr("alice"), U256::from(100), 0).unwrap();
        ledger
            .transfer(1, &addr("alice"), &addr("bob"), U256::from(10), 99)
            .unwrap();
        let bob = ledger.position(1, &addr("bob")).unwrap();
        assert_eq!(bob.share_balance, U256::from(10));
        assert_eq!(bob.last_deposit_at, 99);
        assert_eq!(ledger.position(1, &addr("alice")).unwrap().last_deposit_at, 0);
        assert_eq!(ledger.total_supply(1), U256::from(100));
    }
}
