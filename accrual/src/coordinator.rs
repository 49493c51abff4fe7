//! Transfer coordination: settlement ordering around every principal move.
//!
//! Each mutating operation follows the same shape:
//! 1. authorize (no state touched yet),
//! 2. plan settlements for every account whose principal moves,
//! 3. resolve and validate the amount against settled balances,
//! 4. apply base-ledger steps through the undo journal,
//! 5. commit accrual-book updates, then emit events.
//!
//! A failure at any step leaves the context exactly as it was.

use crate::access::{Authorizer, Role};
use crate::context::LedgerContext;
use crate::engine::{AccrualEngine, Settlement};
use crate::error::AccrualError;
use crate::event::{EventBus, LedgerEvent};
use crate::journal::Journal;
use crate::state::AccountAccrual;
use drip_store::BaseLedger;
use drip_types::{AccountId, Rate, Timestamp, TransferAmount};

pub struct TransferCoordinator<A: Authorizer> {
    engine: AccrualEngine,
    authorizer: A,
    events: EventBus,
}

impl<A: Authorizer> TransferCoordinator<A> {
    pub fn new(authorizer: A) -> Self {
        Self {
            engine: AccrualEngine,
            authorizer,
            events: EventBus::new(),
        }
    }

    pub fn authorizer(&self) -> &A {
        &self.authorizer
    }

    /// Mutable access for role administration (grants, ownership transfer).
    pub fn authorizer_mut(&mut self) -> &mut A {
        &mut self.authorizer
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    /// Lower the global rate. Owner only; the new rate must be strictly lower.
    pub fn set_global_rate<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        caller: &AccountId,
        new_rate: Rate,
        now: Timestamp,
    ) -> Result<(), AccrualError> {
        self.authorizer.require_owner(caller)?;
        match ctx.registry.set_global_rate(new_rate, now) {
            Ok(previous) => {
                tracing::info!(%previous, rate = %new_rate, at = %now, "global rate lowered");
                self.events
                    .emit(&LedgerEvent::GlobalRateChanged { rate: new_rate });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(attempted = %new_rate, error = %e, "global rate change rejected");
                Err(e)
            }
        }
    }

    /// Create `amount` principal for `to`, snapshotting `rate` as its accrual rate.
    pub fn mint<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        caller: &AccountId,
        to: &AccountId,
        amount: u128,
        rate: Rate,
        now: Timestamp,
    ) -> Result<(), AccrualError> {
        self.authorizer.require_role(caller, Role::MintBurn)?;
        let settlement = self.engine.plan_settlement(ctx, to, now)?;

        Journal::atomically(&mut ctx.base, |j| {
            j.credit(to, settlement.increase)?;
            j.credit(to, amount)
        })?;
        ctx.book.insert(to.clone(), AccountAccrual::new(rate, now));

        tracing::info!(%to, amount, %rate, at = %now, "minted");
        let mut events = settled_events(&[&settlement]);
        events.push(LedgerEvent::Minted {
            to: to.clone(),
            amount,
            rate,
        });
        self.events.emit_all(&events);
        Ok(())
    }

    /// Destroy principal held by `from`. Returns the amount burned.
    ///
    /// [`TransferAmount::All`] burns the full balance after interest is realized.
    pub fn burn<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        caller: &AccountId,
        from: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        self.authorizer.require_role(caller, Role::MintBurn)?;
        let settlement = self.engine.plan_settlement(ctx, from, now)?;
        let burned = resolve_within(amount, settlement.settled_principal)?;

        Journal::atomically(&mut ctx.base, |j| {
            j.credit(from, settlement.increase)?;
            j.debit(from, burned)
        })?;
        self.engine.stamp(&mut ctx.book, &settlement);

        tracing::info!(%from, amount = burned, at = %now, "burned");
        let mut events = settled_events(&[&settlement]);
        events.push(LedgerEvent::Burned {
            from: from.clone(),
            amount: burned,
        });
        self.events.emit_all(&events);
        Ok(burned)
    }

    /// Move principal from `sender` to `recipient`. Returns the amount moved.
    pub fn transfer<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        sender: &AccountId,
        recipient: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        self.move_settled(ctx, None, sender, recipient, amount, now)
    }

    /// Move principal on behalf of `sender`, spending `caller`'s allowance.
    pub fn transfer_from<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        caller: &AccountId,
        sender: &AccountId,
        recipient: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        self.move_settled(ctx, Some(caller), sender, recipient, amount, now)
    }

    /// Let `spender` move up to `amount` of `owner`'s balance.
    pub fn approve<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        owner: &AccountId,
        spender: &AccountId,
        amount: u128,
    ) -> Result<(), AccrualError> {
        ctx.base.approve(owner, spender, amount)?;
        self.events.emit(&LedgerEvent::Approved {
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        });
        Ok(())
    }

    /// Realize interest for `account` now. Anyone may call this; it never
    /// changes the account's effective balance.
    pub fn settle<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<Settlement, AccrualError> {
        let settlement = self.engine.settle(ctx, account, now)?;
        self.events.emit_all(&settled_events(&[&settlement]));
        Ok(settlement)
    }

    fn move_settled<B: BaseLedger>(
        &self,
        ctx: &mut LedgerContext<B>,
        spender: Option<&AccountId>,
        sender: &AccountId,
        recipient: &AccountId,
        amount: TransferAmount,
        now: Timestamp,
    ) -> Result<u128, AccrualError> {
        let self_transfer = sender == recipient;
        let sender_settlement = self.engine.plan_settlement(ctx, sender, now)?;
        let recipient_settlement = if self_transfer {
            None
        } else {
            Some(self.engine.plan_settlement(ctx, recipient, now)?)
        };

        let moved = resolve_within(amount, sender_settlement.settled_principal)?;

        // A recipient that is empty after settlement takes the funder's rate.
        let sender_rate = ctx.book.get(sender).rate;
        let inherits_rate = recipient_settlement
            .as_ref()
            .is_some_and(|s| s.settled_principal == 0 && moved > 0);

        Journal::atomically(&mut ctx.base, |j| {
            j.credit(sender, sender_settlement.increase)?;
            if let Some(s) = &recipient_settlement {
                j.credit(recipient, s.increase)?;
            }
            if let Some(spender) = spender {
                j.spend_allowance(sender, spender, moved)?;
            }
            j.move_principal(sender, recipient, moved)
        })?;

        self.engine.stamp(&mut ctx.book, &sender_settlement);
        if let Some(s) = &recipient_settlement {
            self.engine.stamp(&mut ctx.book, s);
        }
        if inherits_rate {
            ctx.book
                .insert(recipient.clone(), AccountAccrual::new(sender_rate, now));
            tracing::debug!(%recipient, rate = %sender_rate, "recipient adopted funder rate");
        }

        tracing::info!(from = %sender, to = %recipient, amount = moved, at = %now, "transferred");
        let settled: Vec<&Settlement> = std::iter::once(&sender_settlement)
            .chain(recipient_settlement.as_ref())
            .collect();
        let mut events = settled_events(&settled);
        events.push(LedgerEvent::Transferred {
            from: sender.clone(),
            to: recipient.clone(),
            amount: moved,
        });
        self.events.emit_all(&events);
        Ok(moved)
    }
}

/// Resolve `amount` against a settled balance and reject overdrafts up front.
fn resolve_within(amount: TransferAmount, settled: u128) -> Result<u128, AccrualError> {
    let resolved = amount.resolve(settled);
    if resolved > settled {
        return Err(AccrualError::InsufficientBalance {
            needed: resolved,
            available: settled,
        });
    }
    Ok(resolved)
}

fn settled_events(settlements: &[&Settlement]) -> Vec<LedgerEvent> {
    settlements
        .iter()
        .filter(|s| s.increase > 0)
        .map(|s| LedgerEvent::Settled {
            account: s.account.clone(),
            increase: s.increase,
            at: s.at,
        })
        .collect()
}
