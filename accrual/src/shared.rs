//! Thread-safe ledger handle for concurrent hosts.
//!
//! The coordinator assumes each operation runs alone. `SharedLedger` restores
//! that guarantee when many threads serve requests: one mutex guards the
//! context, and "now" is read from the clock while the lock is held so the
//! order of timestamps matches the order operations commit.
//!
//! Listeners registered through [`SharedLedger::subscribe`] run after the
//! lock is released, so they may call back into the same ledger. Listeners
//! subscribed on the coordinator before it was wrapped still run under the
//! lock and must not.

use std::sync::{Arc, Mutex};

use crate::access::Authorizer;
use crate::context::LedgerContext;
use crate::coordinator::TransferCoordinator;
use crate::engine::Settlement;
use crate::error::AccrualError;
use crate::event::LedgerEvent;
use drip_store::BaseLedger;
use drip_types::{AccountId, Clock, Rate, Timestamp, TransferAmount};

struct Inner<B: BaseLedger, A: Authorizer> {
    ctx: LedgerContext<B>,
    coordinator: TransferCoordinator<A>,
}

type Listener = Arc<dyn Fn(&LedgerEvent) + Send + Sync>;

pub struct SharedLedger<B: BaseLedger, A: Authorizer, C: Clock> {
    inner: Arc<Mutex<Inner<B, A>>>,
    clock: Arc<C>,
    pending: Arc<Mutex<Vec<LedgerEvent>>>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl<B: BaseLedger, A: Authorizer, C: Clock> Clone for SharedLedger<B, A, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
            pending: Arc::clone(&self.pending),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<B: BaseLedger, A: Authorizer, C: Clock> SharedLedger<B, A, C> {
    pub fn new(ctx: LedgerContext<B>, mut coordinator: TransferCoordinator<A>, clock: C) -> Self {
        let pending = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::clone(&pending);
        coordinator.subscribe(Box::new(move |e: &LedgerEvent| {
            if let Ok(mut queue) = queue.lock() {
                queue.push(e.clone());
            }
        }));
        Self {
            inner: Arc::new(Mutex::new(Inner { ctx, coordinator })),
            clock: Arc::new(clock),
            pending,
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a listener for committed events, called outside the ledger lock.
    pub fn subscribe(&self, listener: impl Fn(&LedgerEvent) + Send + Sync + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Arc::new(listener));
        }
    }

    /// Run `op` with exclusive access to the ledger at the current clock time.
    pub fn with<R, F>(&self, op: F) -> Result<R, AccrualError>
    where
        F: FnOnce(&mut LedgerContext<B>, &TransferCoordinator<A>, Timestamp) -> Result<R, AccrualError>,
    {
        let (result, events) = {
            let mut guard = self
                .inner
                .lock()
                .map_err(|_| AccrualError::InvariantViolation("ledger lock poisoned".into()))?;
            let now = self.clock.now();
            let Inner { ctx, coordinator } = &mut *guard;
            let result = op(ctx, coordinator, now);
            let events = self
                .pending
                .lock()
                .map(|mut queue| std::mem::take(&mut *queue))
                .unwrap_or_default();
            (result, events)
        };
        self.deliver(&events);
        result
    }

    fn deliver(&self, events: &[LedgerEvent]) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = self.listeners.lock().map(|l| l.clone()).unwrap_or_default();
        for event in events {
            for listener in &listeners {
                listener(event);
            }
        }
    }

    pub fn set_global_rate(&self, caller: &AccountId, new_rate: Rate) -> Result<(), AccrualError> {
        self.with(|ctx, c, now| c.set_global_rate(ctx, caller, new_rate, now))
    }

    pub fn mint(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
        rate: Rate,
    ) -> Result<(), AccrualError> {
        self.with(|ctx, c, now| c.mint(ctx, caller, to, amount, rate, now))
    }

    /// Mint at whatever the global rate is when the lock is taken.
    pub fn mint_at_global_rate(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<Rate, AccrualError> {
        self.with(|ctx, c, now| {
            let rate = ctx.global_rate();
            c.mint(ctx, caller, to, amount, rate, now)?;
            Ok(rate)
        })
    }

    pub fn burn(
        &self,
        caller: &AccountId,
        from: &AccountId,
        amount: TransferAmount,
    ) -> Result<u128, AccrualError> {
        self.with(|ctx, c, now| c.burn(ctx, caller, from, amount, now))
    }

    pub fn transfer(
        &self,
        sender: &AccountId,
        recipient: &AccountId,
        amount: TransferAmount,
    ) -> Result<u128, AccrualError> {
        self.with(|ctx, c, now| c.transfer(ctx, sender, recipient, amount, now))
    }

    pub fn transfer_from(
        &self,
        caller: &AccountId,
        sender: &AccountId,
        recipient: &AccountId,
        amount: TransferAmount,
    ) -> Result<u128, AccrualError> {
        self.with(|ctx, c, now| c.transfer_from(ctx, caller, sender, recipient, amount, now))
    }

    pub fn approve(
        &self,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), AccrualError> {
        self.with(|ctx, c, _| c.approve(ctx, owner, spender, amount))
    }

    pub fn settle(&self, account: &AccountId) -> Result<Settlement, AccrualError> {
        self.with(|ctx, c, now| c.settle(ctx, account, now))
    }

    pub fn effective_balance_of(&self, account: &AccountId) -> Result<u128, AccrualError> {
        self.with(|ctx, _, now| ctx.effective_balance_of(account, now))
    }

    pub fn principal_balance_of(&self, account: &AccountId) -> Result<u128, AccrualError> {
        self.with(|ctx, _, _| Ok(ctx.principal_balance_of(account)))
    }

    pub fn account_rate(&self, account: &AccountId) -> Result<Rate, AccrualError> {
        self.with(|ctx, _, _| Ok(ctx.account_rate(account)))
    }

    pub fn global_rate(&self) -> Result<Rate, AccrualError> {
        self.with(|ctx, _, _| Ok(ctx.global_rate()))
    }
}
