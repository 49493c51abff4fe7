//! Nullable store: thread-safe in-memory storage for testing.

use drip_store::{AccrualStore, StoreError};
use drip_types::AccountId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// An in-memory accrual store for testing.
pub struct NullAccrualStore {
    accounts: Mutex<HashMap<AccountId, Vec<u8>>>,
    meta: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

fn guard<T>(lock: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    lock.lock()
        .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
}

impl NullAccrualStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }

    /// Number of persisted account records.
    pub fn account_count(&self) -> usize {
        guard(&self.accounts).map(|a| a.len()).unwrap_or(0)
    }
}

impl Default for NullAccrualStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccrualStore for NullAccrualStore {
    fn put_account_state(&self, account: &AccountId, state: &[u8]) -> Result<(), StoreError> {
        guard(&self.accounts)?.insert(account.clone(), state.to_vec());
        Ok(())
    }

    fn iter_account_states(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError> {
        Ok(guard(&self.accounts)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(guard(&self.meta)?.get(key).cloned())
    }

    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        guard(&self.meta)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
