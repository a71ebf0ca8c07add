//! Admin and capability table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use vamm_domain::address::Address;
use vamm_domain::enums::Capability;
use vamm_domain::error::{AmmError, Result};

/// Who may do what.
///
/// The admin is a single transferable identity; every other role is an
/// explicit capability grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTable {
    admin: Address,
    grants: BTreeMap<Capability, BTreeSet<Address>>,
}

impl PermissionTable {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            grants: BTreeMap::new(),
        }
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn is_admin(&self, account: &Address) -> bool {
        self.admin == *account
    }

    pub fn require_admin(&self, account: &Address) -> Result<()> {
        if self.is_admin(account) {
            Ok(())
        } else {
            Err(AmmError::NotAdmin)
        }
    }

    pub fn has(&self, capability: Capability, account: &Address) -> bool {
        self.grants
            .get(&capability)
            .is_some_and(|holders| holders.contains(account))
    }

    pub fn require(&self, capability: Capability, account: &Address) -> Result<()> {
        if self.has(capability, account) {
            Ok(())
        } else {
            Err(AmmError::BadRole)
        }
    }

    /// Grants or revokes `capability`; returns whether anything changed.
    pub fn set(&mut self, capability: Capability, account: &Address, granted: bool) -> bool {
        let holders = self.grants.entry(capability).or_default();
        if granted {
            holders.insert(account.clone())
        } else {
            holders.remove(account)
        }
    }

    pub fn holders(&self, capability: Capability) -> impl Iterator<Item = &Address> {
        self.grants.get(&capability).into_iter().flatten()
    }

    pub(crate) fn transfer_admin(&mut self, new_admin: Address) -> Address {
        std::mem::replace(&mut self.admin, new_admin)
    }
}
