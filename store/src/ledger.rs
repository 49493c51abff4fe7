use crate::LedgerError;
use drip_types::AccountId;

/// Raw token bookkeeping consumed by the accrual core.
///
/// Balances here are *principal only*: they never include interest that has
/// not yet been settled. Every debit beyond the current principal must fail
/// with [`LedgerError::InsufficientBalance`] and leave state unchanged.
pub trait BaseLedger {
    /// Principal held by `account` (zero for unknown accounts).
    fn raw_balance_of(&self, account: &AccountId) -> u128;

    /// Sum of all principal.
    fn total_supply(&self) -> u128;

    /// Create `amount` new principal for `account`.
    fn credit_principal(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError>;

    /// Destroy `amount` principal held by `account`.
    fn debit_principal(&mut self, account: &AccountId, amount: u128) -> Result<(), LedgerError>;

    /// Move `amount` principal between two accounts without changing supply.
    fn move_principal(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// How much `spender` may still move out of `owner`'s balance.
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128;

    /// Set `spender`'s allowance over `owner`'s balance.
    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: u128)
        -> Result<(), LedgerError>;

    /// Consume `amount` of `spender`'s allowance over `owner`'s balance.
    fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Every account that currently holds a record, in a stable order.
    fn accounts(&self) -> Vec<AccountId>;
}
