use crate::StoreError;
use drip_types::AccountId;

/// Store trait for persisting accrual bookkeeping to durable storage.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the `drip-accrual` crate
/// (which would create a circular dependency). The accrual engine serializes and
/// deserializes its own types.
pub trait AccrualStore {
    fn put_account_state(&self, account: &AccountId, state: &[u8]) -> Result<(), StoreError>;
    fn iter_account_states(&self) -> Result<Vec<(AccountId, Vec<u8>)>, StoreError>;

    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}
