//! The ledger context: every piece of mutable state an operation touches.
//!
//! Nothing in this crate keeps process-wide state. Callers own a
//! [`LedgerContext`] and pass it to the engine and coordinator explicitly,
//! which is also what lets tests build fixture ledgers freely.

use crate::engine::AccrualEngine;
use crate::error::AccrualError;
use crate::registry::RateRegistry;
use crate::state::{AccountAccrual, AccrualBook};
use drip_store::{AccrualStore, BaseLedger, StoreError};
use drip_types::{AccountId, Rate, Timestamp};

const META_REGISTRY: &[u8] = b"rate_registry";

#[derive(Debug)]
pub struct LedgerContext<B: BaseLedger> {
    pub(crate) base: B,
    pub(crate) book: AccrualBook,
    pub(crate) registry: RateRegistry,
}

impl<B: BaseLedger> LedgerContext<B> {
    /// A fresh ledger whose global rate starts at `initial_rate`.
    pub fn new(base: B, initial_rate: Rate, genesis: Timestamp) -> Self {
        Self::from_parts(base, AccrualBook::new(), RateRegistry::new(initial_rate, genesis))
    }

    pub fn from_parts(base: B, book: AccrualBook, registry: RateRegistry) -> Self {
        Self {
            base,
            book,
            registry,
        }
    }

    /// Read-only access to the base ledger (principal only, no accrual).
    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn book(&self) -> &AccrualBook {
        &self.book
    }

    pub fn registry(&self) -> &RateRegistry {
        &self.registry
    }

    pub fn global_rate(&self) -> Rate {
        self.registry.current_rate()
    }

    pub fn principal_balance_of(&self, account: &AccountId) -> u128 {
        self.base.raw_balance_of(account)
    }

    /// Principal plus interest accrued since the last settlement. Never mutates.
    pub fn effective_balance_of(
        &self,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        AccrualEngine.effective_balance(self, account, now)
    }

    /// Interest that settling `account` at `now` would realize.
    pub fn accrued_interest_of(
        &self,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        Ok(AccrualEngine.plan_settlement(self, account, now)?.increase)
    }

    pub fn account_rate(&self, account: &AccountId) -> Rate {
        self.book.get(account).rate
    }

    /// `None` until the account has been settled at least once.
    pub fn last_sync_of(&self, account: &AccountId) -> Option<Timestamp> {
        self.book.record(account).map(|a| a.last_sync)
    }

    pub fn total_principal(&self) -> u128 {
        self.base.total_supply()
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.base.allowance(owner, spender)
    }

    /// Give the base ledger back, e.g. to hand it to another owner.
    pub fn into_base(self) -> B {
        self.base
    }
}

impl<B: BaseLedger> LedgerContext<B> {
    /// Persist accrual records and the rate registry.
    ///
    /// Principal is owned by the base ledger and is not written here.
    pub fn save_to_store(&self, store: &dyn AccrualStore) -> Result<(), AccrualError> {
        store.put_meta(META_REGISTRY, &encode(&self.registry)?)?;
        for (account, accrual) in self.book.iter() {
            store.put_account_state(account, &encode(accrual)?)?;
        }
        tracing::debug!(accounts = self.book.len(), "accrual state saved");
        Ok(())
    }

    /// Restore accrual records and the rate registry on top of `base`.
    ///
    /// An empty store yields the default registry. Account records without
    /// a registry are rejected as corrupt.
    pub fn load_from_store(base: B, store: &dyn AccrualStore) -> Result<Self, AccrualError> {
        let mut book = AccrualBook::new();
        for (account, bytes) in store.iter_account_states()? {
            let accrual: AccountAccrual = decode(&bytes)?;
            book.insert(account, accrual);
        }

        let registry = match store.get_meta(META_REGISTRY)? {
            Some(bytes) => decode(&bytes)?,
            None if book.is_empty() => RateRegistry::default(),
            None => {
                return Err(StoreError::Corruption(format!(
                    "{} account records present but rate registry missing",
                    book.len()
                ))
                .into())
            }
        };
        tracing::debug!(accounts = book.len(), "accrual state loaded");
        Ok(Self::from_parts(base, book, registry))
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
