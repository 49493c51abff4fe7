//! Authorization seam.
//!
//! The coordinator never decides who may mint or change the rate; it asks an
//! injected [`Authorizer`]. [`RoleTable`] is the in-process implementation:
//! one owner plus a set of members per role.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::AccrualError;
use drip_types::AccountId;
use serde::{Deserialize, Serialize};

/// Role enumeration for authority checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May mint new principal and burn existing principal.
    MintBurn,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MintBurn => write!(f, "mint/burn role"),
        }
    }
}

/// What a rejected caller was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    Owner,
    Role(Role),
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "ownership"),
            Self::Role(role) => write!(f, "{}", role),
        }
    }
}

/// Capability check injected into the coordinator.
pub trait Authorizer {
    fn has_role(&self, role: Role, account: &AccountId) -> bool;

    fn is_owner(&self, account: &AccountId) -> bool;

    fn require_role(&self, caller: &AccountId, role: Role) -> Result<(), AccrualError> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(AccrualError::Unauthorized {
                caller: caller.clone(),
                required: Permission::Role(role),
            })
        }
    }

    fn require_owner(&self, caller: &AccountId) -> Result<(), AccrualError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(AccrualError::Unauthorized {
                caller: caller.clone(),
                required: Permission::Owner,
            })
        }
    }
}

/// Owner plus role membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleTable {
    owner: AccountId,
    roles: HashMap<Role, HashSet<AccountId>>,
}

impl RoleTable {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            roles: HashMap::new(),
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Add `account` to `role`. Owner only.
    pub fn grant_role(
        &mut self,
        caller: &AccountId,
        role: Role,
        account: AccountId,
    ) -> Result<(), AccrualError> {
        self.require_owner(caller)?;
        tracing::info!(%account, %role, "role granted");
        self.roles.entry(role).or_default().insert(account);
        Ok(())
    }

    /// Remove `account` from `role`. Owner only.
    pub fn revoke_role(
        &mut self,
        caller: &AccountId,
        role: Role,
        account: &AccountId,
    ) -> Result<(), AccrualError> {
        self.require_owner(caller)?;
        if let Some(set) = self.roles.get_mut(&role) {
            if set.remove(account) {
                tracing::info!(%account, %role, "role revoked");
            }
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`. Owner only.
    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), AccrualError> {
        self.require_owner(caller)?;
        tracing::info!(from = %self.owner, to = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// Get all members of a role
    pub fn members(&self, role: Role) -> impl Iterator<Item = &AccountId> {
        self.roles
            .get(&role)
            .map(|set| set.iter())
            .into_iter()
            .flatten()
    }
}

impl Authorizer for RoleTable {
    fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.roles
            .get(&role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }

    fn is_owner(&self, account: &AccountId) -> bool {
        self.owner == *account
    }
}
